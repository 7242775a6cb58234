//! Core library for the Kenko guided breathing exercises.
//!
//! The crate is split by responsibility: the exercise data model and catalog,
//! the playback engine that sequences steps and cycles, the clocks and ticker
//! that drive it, the audio cue player and animation renderers that react to
//! it, and the session that wires them together for a presentation shell.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod exercise;
pub mod playback;
pub mod presentation;
pub mod render;
pub mod session;
pub mod timeline;

pub use audio::{CueId, CueOutput, CuePlayer, SilentOutput};
pub use catalog::ExerciseCatalog;
pub use config::{AppConfig, AudioConfig, CueAssets, PlaybackConfig};
pub use error::{KenkoError, Result};
pub use exercise::{AnimationType, CycleCount, Exercise, ExerciseCategory, ExerciseStep, Phase};
pub use playback::{PlaybackEngine, PlaybackEvent, PlaybackSnapshot};
pub use presentation::{catalog_listing, ExerciseSummary, Selection, StatusView};
pub use render::{AnimationRenderer, Frame, FrameParam, RendererRegistry, Rgba};
pub use session::{BreathingSession, SessionFrame};
pub use timeline::{Clock, PlaybackClock, StopHandle, SystemClock, Ticker};
