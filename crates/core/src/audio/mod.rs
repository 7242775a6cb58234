use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{exercise::Phase, playback::PlaybackEvent, Result};

/// Identifier of a short sound played at the start of a step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CueId {
    Inhale,
    Exhale,
    Hold,
}

impl CueId {
    /// Rest steps are silent.
    pub fn for_phase(phase: Phase) -> Option<Self> {
        match phase {
            Phase::Inhale => Some(CueId::Inhale),
            Phase::Exhale => Some(CueId::Exhale),
            Phase::Hold => Some(CueId::Hold),
            Phase::Rest => None,
        }
    }
}

/// Host-side sound output. Implementations resolve a [`CueId`] to a loaded
/// asset.
pub trait CueOutput {
    /// Plays `cue` from its beginning, cutting off any in-flight playback of
    /// the same cue. Must not block until playback finishes.
    fn play_from_start(&mut self, cue: CueId) -> Result<()>;

    /// Mirrors the mute flag onto the output. Already started sounds are left
    /// alone.
    fn set_muted(&mut self, _muted: bool) {}
}

/// Output that discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

impl CueOutput for SilentOutput {
    fn play_from_start(&mut self, _cue: CueId) -> Result<()> {
        Ok(())
    }
}

/// Best-effort audio cue player. Output failures are logged and dropped so the
/// exercise keeps running without sound.
pub struct CuePlayer {
    output: Box<dyn CueOutput>,
    muted: bool,
    played: HashMap<CueId, u64>,
}

impl CuePlayer {
    pub fn new(output: Box<dyn CueOutput>) -> Self {
        Self {
            output,
            muted: false,
            played: HashMap::new(),
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentOutput))
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Affects future cues only; nothing missed while muted is replayed.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.output.set_muted(muted);
    }

    /// Plays the cue for `phase`, if there is one and the player is not muted.
    pub fn play_cue(&mut self, phase: Phase) {
        if self.muted {
            return;
        }
        let Some(cue) = CueId::for_phase(phase) else {
            return;
        };

        match self.output.play_from_start(cue) {
            Ok(()) => {
                *self.played.entry(cue).or_default() += 1;
                tracing::debug!(%cue, "played cue");
            }
            Err(error) => tracing::debug!(%cue, %error, "cue playback failed, ignoring"),
        }
    }

    /// Reacts to engine events: every new step gets its cue.
    pub fn handle_event(&mut self, event: &PlaybackEvent) {
        if let PlaybackEvent::StepStarted { phase, .. } = *event {
            self.play_cue(phase);
        }
    }

    /// How many times `cue` has been handed to the output successfully.
    pub fn play_count(&self, cue: CueId) -> u64 {
        self.played.get(&cue).copied().unwrap_or(0)
    }
}

impl std::fmt::Debug for CuePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuePlayer")
            .field("muted", &self.muted)
            .field("played", &self.played)
            .finish()
    }
}
