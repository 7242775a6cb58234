//! Animation renderers: stateless mappings from the current breathing phase
//! and step progress to a [`Frame`] describing what to draw.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::exercise::{AnimationType, Phase};

mod styles;

pub use styles::{
    CosmicStarRenderer, DayNightRenderer, FluidBallRenderer, SpiralRenderer, TimerRenderer,
    VocalWaveRenderer, WaterCircleRenderer,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Extra style specific value such as spiral rotations or wave amplitude.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FrameParam {
    pub name: &'static str,
    pub value: f32,
}

/// Backend-neutral description of one animation frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Frame {
    pub style: AnimationType,
    pub phase: Phase,
    /// Size of the main figure relative to its resting size.
    pub scale: f32,
    pub opacity: f32,
    /// Filled fraction of the figure, in `[0, 1]`.
    pub fill: f32,
    pub color: Rgba,
    pub label: Option<String>,
    pub params: Vec<FrameParam>,
}

impl Frame {
    pub fn new(style: AnimationType, phase: Phase, color: Rgba) -> Self {
        Self {
            style,
            phase,
            scale: 1.0,
            opacity: color.a,
            fill: 0.0,
            color,
            label: None,
            params: Vec::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<f32> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.value)
    }

    pub(crate) fn push_param(&mut self, name: &'static str, value: f32) {
        self.params.push(FrameParam { name, value });
    }
}

/// A visual style. Implementations must be deterministic in
/// `(phase, progress)` and keep no state between calls.
pub trait AnimationRenderer {
    fn style(&self) -> AnimationType;

    fn render(&self, phase: Phase, progress: f32) -> Frame;
}

/// Lookup table from [`AnimationType`] to the renderer that draws it.
pub struct RendererRegistry {
    renderers: HashMap<AnimationType, Box<dyn AnimationRenderer>>,
    fallback: Box<dyn AnimationRenderer>,
}

impl RendererRegistry {
    /// Empty registry: every lookup resolves to the fluid ball.
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Box::new(FluidBallRenderer),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FluidBallRenderer));
        registry.register(Box::new(CosmicStarRenderer));
        registry.register(Box::new(DayNightRenderer));
        registry.register(Box::new(SpiralRenderer));
        registry.register(Box::new(WaterCircleRenderer));
        registry.register(Box::new(VocalWaveRenderer));
        registry.register(Box::new(TimerRenderer));
        registry
    }

    pub fn register(&mut self, renderer: Box<dyn AnimationRenderer>) {
        self.renderers.insert(renderer.style(), renderer);
    }

    pub fn renderer_for(&self, style: AnimationType) -> &dyn AnimationRenderer {
        self.renderers
            .get(&style)
            .map(|renderer| renderer.as_ref())
            .unwrap_or_else(|| self.fallback.as_ref())
    }

    /// Renders with the renderer bound to `style`, clamping `progress` first.
    pub fn render(&self, style: AnimationType, phase: Phase, progress: f32) -> Frame {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.renderer_for(style).render(phase, progress)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("styles", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}
