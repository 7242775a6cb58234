use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{KenkoError, Result};

/// The kind of breathing a step asks for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

impl Phase {
    /// Capitalised name used in headings.
    pub fn title(self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::Hold => "Hold",
            Phase::Exhale => "Exhale",
            Phase::Rest => "Rest",
        }
    }
}

/// One timed phase of a breathing cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStep {
    #[serde(rename = "type")]
    pub phase: Phase,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl ExerciseStep {
    pub fn new(phase: Phase, duration_seconds: f64) -> Self {
        Self {
            phase,
            duration_seconds,
            instruction: None,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }
}

/// How many times the step list is repeated.
///
/// `Unbounded` is a tag, not a number: callers ask [`CycleCount::allows_after`]
/// instead of comparing against a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCycleCount", into = "RawCycleCount")]
pub enum CycleCount {
    Finite(NonZeroU32),
    Unbounded,
}

impl CycleCount {
    /// Returns `None` for zero, which is not a valid cycle count.
    pub fn finite(count: u32) -> Option<Self> {
        NonZeroU32::new(count).map(Self::Finite)
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, CycleCount::Unbounded)
    }

    pub fn get(self) -> Option<u32> {
        match self {
            CycleCount::Finite(count) => Some(count.get()),
            CycleCount::Unbounded => None,
        }
    }

    /// Whether another cycle may begin once `completed` cycles are done.
    pub fn allows_after(self, completed: u32) -> bool {
        match self {
            CycleCount::Unbounded => true,
            CycleCount::Finite(count) => completed < count.get(),
        }
    }
}

impl fmt::Display for CycleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleCount::Finite(count) => write!(f, "{count}"),
            CycleCount::Unbounded => f.write_str("∞"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCycleCount {
    Count(u32),
    Keyword(String),
}

impl TryFrom<RawCycleCount> for CycleCount {
    type Error = String;

    fn try_from(raw: RawCycleCount) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawCycleCount::Count(count) => {
                CycleCount::finite(count).ok_or_else(|| "cycle count must be positive".to_string())
            }
            RawCycleCount::Keyword(word) => match word.trim().to_ascii_lowercase().as_str() {
                "unbounded" | "infinite" | "infinity" | "∞" => Ok(CycleCount::Unbounded),
                other => Err(format!("`{other}` is not a cycle count")),
            },
        }
    }
}

impl From<CycleCount> for RawCycleCount {
    fn from(count: CycleCount) -> Self {
        match count {
            CycleCount::Finite(count) => RawCycleCount::Count(count.get()),
            CycleCount::Unbounded => RawCycleCount::Keyword("unbounded".to_string()),
        }
    }
}

/// Visual style used while an exercise plays.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "camelCase")]
pub enum AnimationType {
    #[default]
    FluidBall,
    CosmicStar,
    DayNightCycle,
    Spiral,
    WaterCircle,
    VocalWave,
    Timer,
}

impl AnimationType {
    /// Resolves a tag from catalog data, falling back to the default style
    /// when the tag is not recognised.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            let fallback = Self::default();
            tracing::warn!(tag, %fallback, "unknown animation type, using fallback");
            fallback
        })
    }
}

impl From<String> for AnimationType {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<AnimationType> for String {
    fn from(value: AnimationType) -> Self {
        value.to_string()
    }
}

/// Time of day or condition an exercise targets. Used for grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExerciseCategory {
    Morning,
    Afternoon,
    Night,
    Hypertension,
    Stress,
    Anxiety,
    Timer,
}

/// A named, ordered breathing routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub animation_type: AnimationType,
    #[serde(rename = "type")]
    pub category: ExerciseCategory,
    pub cycles: CycleCount,
    pub steps: Vec<ExerciseStep>,
}

impl Exercise {
    /// Builds an exercise with placeholder presentational text.
    pub fn new(id: impl Into<String>, cycles: CycleCount, steps: Vec<ExerciseStep>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            info: String::new(),
            instructions: String::new(),
            animation_type: AnimationType::default(),
            category: ExerciseCategory::Timer,
            cycles,
            steps,
        }
    }

    /// Checks the invariants playback relies on: at least one step and a
    /// strictly positive, finite duration for every step.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(KenkoError::InvalidInput("exercise id must not be empty"));
        }

        if self.steps.is_empty() {
            return Err(KenkoError::invalid_exercise(&self.id, "has no steps"));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if !step.duration_seconds.is_finite() || step.duration_seconds <= 0.0 {
                return Err(KenkoError::invalid_exercise(
                    &self.id,
                    format!(
                        "step {} has non-positive duration {}",
                        index + 1,
                        step.duration_seconds
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Length of one pass through the step list.
    pub fn cycle_duration_seconds(&self) -> f64 {
        self.steps.iter().map(|step| step.duration_seconds).sum()
    }

    /// Length of the whole routine, or `None` when it repeats forever.
    pub fn total_duration_seconds(&self) -> Option<f64> {
        self.cycles
            .get()
            .map(|cycles| self.cycle_duration_seconds() * f64::from(cycles))
    }
}
