use std::time::Duration;

use crate::{
    audio::CuePlayer,
    exercise::Exercise,
    playback::{PlaybackEngine, PlaybackEvent, PlaybackSnapshot},
    presentation::StatusView,
    render::{Frame, RendererRegistry},
    Result,
};

/// Everything the shell needs to draw one tick.
#[derive(Debug, Clone)]
pub struct SessionFrame {
    pub snapshot: PlaybackSnapshot,
    pub status: StatusView,
    pub frame: Frame,
    /// Boundary crossed on this tick, if any.
    pub event: Option<PlaybackEvent>,
}

/// Wires the playback engine to the cue player and the renderer bound to the
/// exercise's animation type.
#[derive(Debug)]
pub struct BreathingSession {
    engine: PlaybackEngine,
    cues: CuePlayer,
    renderers: RendererRegistry,
}

impl BreathingSession {
    pub fn new(cues: CuePlayer, renderers: RendererRegistry) -> Self {
        Self {
            engine: PlaybackEngine::new(),
            cues,
            renderers,
        }
    }

    pub fn start(&mut self, exercise: Exercise, now: Duration) -> Result<SessionFrame> {
        let event = self.engine.start(exercise, now)?;
        self.cues.handle_event(&event);
        self.compose(Some(event))
            .ok_or_else(|| "session did not start".into())
    }

    /// Advances playback. Returns `None` once the session is no longer
    /// running; the tick that completes the routine still yields a frame.
    pub fn tick(&mut self, now: Duration) -> Option<SessionFrame> {
        if !self.engine.is_running() {
            return None;
        }

        let event = self.engine.tick(now);
        if let Some(event) = &event {
            self.cues.handle_event(event);
        }
        self.compose(event)
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Flips mute on the engine and mirrors it onto the cue player.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.engine.toggle_mute();
        self.cues.set_muted(muted);
        muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.engine.is_muted() != muted {
            self.toggle_mute();
        }
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn cues(&self) -> &CuePlayer {
        &self.cues
    }

    fn compose(&self, event: Option<PlaybackEvent>) -> Option<SessionFrame> {
        let exercise = self.engine.exercise()?;
        let snapshot = self.engine.snapshot()?;
        let frame = self.renderers.render(
            exercise.animation_type,
            snapshot.phase,
            snapshot.progress_in_step,
        );

        Some(SessionFrame {
            status: StatusView::from_snapshot(exercise, &snapshot),
            snapshot,
            frame,
            event,
        })
    }
}
