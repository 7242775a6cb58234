use std::{collections::HashMap, num::NonZeroU32, path::Path};

use crate::{
    exercise::{AnimationType, CycleCount, Exercise, ExerciseCategory, ExerciseStep, Phase},
    KenkoError, Result,
};

/// Read-only registry of the exercises a user can pick from.
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    by_id: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Validates every exercise and indexes them by id. Duplicate ids are
    /// rejected so lookups stay unambiguous.
    pub fn new(exercises: Vec<Exercise>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(exercises.len());
        for (index, exercise) in exercises.iter().enumerate() {
            exercise.validate()?;
            if by_id.insert(exercise.id.clone(), index).is_some() {
                return Err(KenkoError::invalid_exercise(
                    &exercise.id,
                    "id appears more than once in the catalog",
                ));
            }
        }

        Ok(Self { exercises, by_id })
    }

    /// Parses a JSON array of exercises.
    pub fn from_json(json: &str) -> Result<Self> {
        let exercises: Vec<Exercise> = serde_json::from_str(json)?;
        Self::new(exercises)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.by_id.get(id).map(|&index| &self.exercises[index])
    }

    pub fn lookup(&self, id: &str) -> Result<&Exercise> {
        self.get(id)
            .ok_or_else(|| KenkoError::UnknownExercise(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// The exercises shipped with the application.
    pub fn builtin() -> Self {
        let exercises = builtin_exercises();
        let by_id = exercises
            .iter()
            .enumerate()
            .map(|(index, exercise)| (exercise.id.clone(), index))
            .collect();
        Self { exercises, by_id }
    }
}

impl Default for ExerciseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Evaluated in const context, so a zero count fails the build.
const fn cycles(count: u32) -> CycleCount {
    match NonZeroU32::new(count) {
        Some(count) => CycleCount::Finite(count),
        None => panic!("built-in exercises need at least one cycle"),
    }
}

const THREE_CYCLES: CycleCount = cycles(3);

fn step(phase: Phase, seconds: f64) -> ExerciseStep {
    ExerciseStep::new(phase, seconds)
}

#[allow(clippy::too_many_arguments)]
fn exercise(
    id: &str,
    title: &str,
    info: &str,
    instructions: &str,
    animation_type: AnimationType,
    category: ExerciseCategory,
    cycles: CycleCount,
    steps: Vec<ExerciseStep>,
) -> Exercise {
    Exercise {
        id: id.to_string(),
        title: title.to_string(),
        info: info.to_string(),
        instructions: instructions.to_string(),
        animation_type,
        category,
        cycles,
        steps,
    }
}

fn builtin_exercises() -> Vec<Exercise> {
    use Phase::*;

    vec![
        exercise(
            "morning",
            "Morning Breathing",
            "Helps reset circadian rhythm.",
            "Think of a soothing place (e.g., a beautiful park). Take 5 fast, long breaths, \
             followed by 5 normal breaths. Repeat the cycle, gradually increasing to 10 long \
             breaths. Do this 3 times.",
            AnimationType::FluidBall,
            ExerciseCategory::Morning,
            THREE_CYCLES,
            vec![step(Inhale, 4.0), step(Exhale, 4.0)],
        ),
        exercise(
            "afternoon",
            "Afternoon Energy",
            "Mid-day energy boost!",
            "Sit comfortably with your spine straight and feet flat. Take two short inhales \
             through your nose, then exhale slowly through pursed lips. This helps bring fresh \
             oxygen to the brain and boosts energy levels. Repeat 3 times.",
            AnimationType::CosmicStar,
            ExerciseCategory::Afternoon,
            THREE_CYCLES,
            vec![
                step(Inhale, 2.0).with_instruction("Short inhale"),
                step(Inhale, 2.0).with_instruction("Short inhale again"),
                step(Exhale, 4.0).with_instruction("Slow exhale"),
            ],
        ),
        exercise(
            "night",
            "Night Relaxation",
            "Helps you fall asleep easily.",
            "Lay comfortably on your back, arms by your sides with palms open. Breathe in for \
             4 seconds, hold for 4, and exhale for 4. This helps calm the mind. Repeat 3 times.",
            AnimationType::DayNightCycle,
            ExerciseCategory::Night,
            THREE_CYCLES,
            vec![step(Inhale, 4.0), step(Hold, 4.0), step(Exhale, 4.0)],
        ),
        exercise(
            "hypertension",
            "Hypertension Relief",
            "Lower your blood pressure in 3 minutes!",
            "Stand up straight with your legs slightly apart. Slowly swing your arms and hips, \
             gradually increasing speed. When you feel slightly tired, stop and rest for 5 \
             seconds. Repeat 3 times.",
            AnimationType::Spiral,
            ExerciseCategory::Hypertension,
            THREE_CYCLES,
            vec![
                step(Inhale, 3.0),
                step(Exhale, 3.0),
                step(Rest, 5.0).with_instruction("Rest briefly"),
            ],
        ),
        exercise(
            "stress",
            "Stress Relief",
            "Relieve stress easily.",
            "Inhale for 4 seconds, hold for 7 seconds, exhale for 8 seconds. Repeat this cycle \
             3 times.",
            AnimationType::WaterCircle,
            ExerciseCategory::Stress,
            THREE_CYCLES,
            vec![step(Inhale, 4.0), step(Hold, 7.0), step(Exhale, 8.0)],
        ),
        exercise(
            "anxiety",
            "Anxiety Reducer",
            "Reduce anxiety.",
            "Take a full inhale, then exhale with a vocal sigh or hum (HMMMMMMM).",
            AnimationType::VocalWave,
            ExerciseCategory::Anxiety,
            THREE_CYCLES,
            vec![
                step(Inhale, 4.0),
                step(Exhale, 6.0).with_instruction("Exhale with a humming sound"),
            ],
        ),
        exercise(
            "timer",
            "Breathing Timer",
            "Breathing Timer.",
            "Inhale for 4 seconds, hold for 7 seconds, exhale for 8 seconds. Repeat infinitely.",
            AnimationType::Timer,
            ExerciseCategory::Timer,
            CycleCount::Unbounded,
            vec![step(Inhale, 4.0), step(Hold, 7.0), step(Exhale, 8.0)],
        ),
    ]
}
