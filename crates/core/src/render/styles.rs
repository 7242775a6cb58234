use crate::exercise::{AnimationType, Phase};

use super::{AnimationRenderer, Frame, Rgba};

const EMERALD: Rgba = Rgba::new(5, 150, 105, 0.6);
const GOLD: Rgba = Rgba::new(250, 204, 21, 0.7);
const VIOLET: Rgba = Rgba::new(139, 92, 246, 0.8);
const SKY: Rgba = Rgba::new(59, 130, 246, 0.6);
const TEAL: Rgba = Rgba::new(20, 184, 166, 0.3);

/// Lung fullness in `[0, 1]`: rising on inhale, falling on exhale, held at the
/// top and resting at the bottom.
fn breath_level(phase: Phase, progress: f32) -> f32 {
    match phase {
        Phase::Inhale => progress,
        Phase::Exhale => 1.0 - progress,
        Phase::Hold => 1.0,
        Phase::Rest => 0.0,
    }
}

/// Ball that swells to 1.8x on inhale and shrinks back on exhale.
#[derive(Debug, Default, Clone, Copy)]
pub struct FluidBallRenderer;

impl AnimationRenderer for FluidBallRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::FluidBall
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let alpha = match phase {
            Phase::Hold => 0.8,
            Phase::Rest => 0.4,
            Phase::Inhale | Phase::Exhale => 0.6,
        };
        let level = breath_level(phase, progress);

        let mut frame = Frame::new(self.style(), phase, EMERALD.with_alpha(alpha));
        frame.scale = 1.0 + 0.8 * level;
        frame.fill = level;
        frame
    }
}

/// Five-pointed star that doubles in size and brightens on inhale.
#[derive(Debug, Default, Clone, Copy)]
pub struct CosmicStarRenderer;

impl AnimationRenderer for CosmicStarRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::CosmicStar
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let level = breath_level(phase, progress);
        let opacity = match phase {
            Phase::Inhale => 0.5 + 0.4 * progress,
            Phase::Exhale => 0.9 - 0.4 * progress,
            Phase::Hold => 0.9,
            Phase::Rest => 0.5,
        };

        let mut frame = Frame::new(self.style(), phase, GOLD.with_alpha(opacity));
        frame.scale = 1.0 + level;
        frame.fill = level;
        frame.push_param("points", 5.0);
        frame
    }
}

/// Sky that brightens to day while breathing in and darkens to night while
/// breathing out.
#[derive(Debug, Default, Clone, Copy)]
pub struct DayNightRenderer;

impl AnimationRenderer for DayNightRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::DayNightCycle
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let brightness = match phase {
            Phase::Inhale => 150.0 + 105.0 * progress,
            Phase::Exhale => 255.0 - 205.0 * progress,
            Phase::Hold => 255.0,
            Phase::Rest => 150.0,
        };
        let shade = brightness.round().clamp(0.0, 255.0) as u8;

        let mut frame = Frame::new(self.style(), phase, Rgba::new(shade, shade, shade, 1.0));
        frame.fill = brightness / 255.0;
        frame.label = Some(match phase {
            Phase::Inhale | Phase::Hold => "sun".to_string(),
            Phase::Exhale | Phase::Rest => "moon".to_string(),
        });
        frame.push_param("brightness", brightness);
        frame
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpiralRenderer;

impl AnimationRenderer for SpiralRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::Spiral
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let (radius, rotations, line_width) = match phase {
            Phase::Inhale => (0.5 + 0.5 * progress, 1.0 + 2.0 * progress, 3.0 + 6.0 * progress),
            Phase::Exhale => (1.0 - 0.3 * progress, 3.0 - 1.5 * progress, 9.0 - 5.0 * progress),
            Phase::Hold => (1.0, 3.0, 9.0),
            Phase::Rest => (0.7, 1.5, 5.0),
        };

        let mut frame = Frame::new(self.style(), phase, VIOLET);
        frame.scale = radius;
        frame.fill = radius;
        frame.push_param("rotations", rotations);
        frame.push_param("line_width", line_width);
        frame
    }
}

/// Circle filling with water on inhale and draining on exhale.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaterCircleRenderer;

impl AnimationRenderer for WaterCircleRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::WaterCircle
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let mut frame = Frame::new(self.style(), phase, SKY);
        frame.fill = breath_level(phase, progress);
        frame
    }
}

/// Concentric waves; the exhale carries a hum, so waves start wide and settle.
#[derive(Debug, Default, Clone, Copy)]
pub struct VocalWaveRenderer;

impl AnimationRenderer for VocalWaveRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::VocalWave
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let (amplitude, frequency, opacity) = match phase {
            Phase::Inhale => (2.0 + 3.0 * progress, 0.05, 0.3 + 0.4 * progress),
            Phase::Exhale => (20.0 - 18.0 * progress, 0.1 - 0.05 * progress, 0.8 - 0.4 * progress),
            Phase::Hold => (5.0, 0.05, 0.7),
            Phase::Rest => (2.0, 0.05, 0.3),
        };

        let mut frame = Frame::new(self.style(), phase, TEAL.with_alpha(opacity));
        if phase == Phase::Exhale {
            frame.scale = 1.2 + 0.8 * progress;
        }
        frame.fill = amplitude / 20.0;
        frame.push_param("amplitude", amplitude);
        frame.push_param("frequency", frequency);
        frame
    }
}

/// Clock face whose arc sweeps once per step, coloured by phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerRenderer;

impl AnimationRenderer for TimerRenderer {
    fn style(&self) -> AnimationType {
        AnimationType::Timer
    }

    fn render(&self, phase: Phase, progress: f32) -> Frame {
        let color = match phase {
            Phase::Inhale => SKY,
            Phase::Hold => VIOLET.with_alpha(0.6),
            Phase::Exhale => Rgba::new(52, 211, 153, 0.6),
            Phase::Rest => Rgba::new(156, 163, 175, 0.6),
        };

        let mut frame = Frame::new(self.style(), phase, color);
        frame.fill = progress;
        frame.label = Some(phase.title().to_string());
        frame.push_param("percent", (progress * 100.0).round());
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn fluid_ball_tracks_the_breath() {
        let ball = FluidBallRenderer;
        assert_eq!(ball.render(Phase::Inhale, 0.0).scale, 1.0);
        assert!(approx(ball.render(Phase::Inhale, 1.0).scale, 1.8));
        assert!(approx(ball.render(Phase::Hold, 0.3).scale, 1.8));
        assert_eq!(ball.render(Phase::Exhale, 1.0).scale, 1.0);
        assert_eq!(ball.render(Phase::Rest, 0.7).color.a, 0.4);
    }

    #[test]
    fn water_level_matches_phase() {
        let water = WaterCircleRenderer;
        assert_eq!(water.render(Phase::Inhale, 0.25).fill, 0.25);
        assert_eq!(water.render(Phase::Exhale, 0.25).fill, 0.75);
        assert_eq!(water.render(Phase::Hold, 0.0).fill, 1.0);
        assert_eq!(water.render(Phase::Rest, 1.0).fill, 0.0);
    }

    #[test]
    fn day_night_switches_between_sun_and_moon() {
        let sky = DayNightRenderer;
        let dawn = sky.render(Phase::Inhale, 1.0);
        assert_eq!(dawn.color.r, 255);
        assert_eq!(dawn.label.as_deref(), Some("sun"));

        let dusk = sky.render(Phase::Exhale, 1.0);
        assert_eq!(dusk.color.r, 50);
        assert_eq!(dusk.label.as_deref(), Some("moon"));
    }

    #[test]
    fn spiral_winds_up_on_inhale() {
        let spiral = SpiralRenderer;
        let start = spiral.render(Phase::Inhale, 0.0);
        let end = spiral.render(Phase::Inhale, 1.0);
        assert_eq!(start.param("rotations"), Some(1.0));
        assert_eq!(end.param("rotations"), Some(3.0));
        assert_eq!(end.param("line_width"), Some(9.0));
    }

    #[test]
    fn timer_labels_phase_and_percent() {
        let frame = TimerRenderer.render(Phase::Hold, 0.426);
        assert_eq!(frame.label.as_deref(), Some("Hold"));
        assert_eq!(frame.param("percent"), Some(43.0));
        assert_eq!(frame.fill, 0.426);
    }

    #[test]
    fn vocal_wave_hum_settles() {
        let wave = VocalWaveRenderer;
        assert_eq!(wave.render(Phase::Exhale, 0.0).param("amplitude"), Some(20.0));
        assert_eq!(wave.render(Phase::Exhale, 1.0).param("amplitude"), Some(2.0));
        assert_eq!(wave.render(Phase::Hold, 0.5).scale, 1.0);
    }
}
