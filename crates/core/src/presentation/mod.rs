//! Text the presentation shell shows around the animation.

use std::fmt;

use serde::Serialize;

use crate::{catalog::ExerciseCatalog, exercise::Exercise, playback::PlaybackSnapshot};

/// Per-tick status derived from a [`PlaybackSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    /// Phase name, followed by the step instruction when there is one.
    pub heading: String,
    /// Whole seconds left in the step, rounded up.
    pub countdown_seconds: u64,
    /// Progress bar fill in `[0, 1]`.
    pub progress: f32,
    pub cycle_label: String,
    pub step_label: String,
}

impl StatusView {
    pub fn from_snapshot(exercise: &Exercise, snapshot: &PlaybackSnapshot) -> Self {
        let phase = snapshot.phase.title();
        let heading = match exercise
            .steps
            .get(snapshot.current_step_index)
            .and_then(|step| step.instruction.as_deref())
        {
            Some(instruction) => format!("{phase}: {instruction}"),
            None => phase.to_string(),
        };

        Self {
            heading,
            countdown_seconds: snapshot.remaining_seconds.max(0.0).ceil() as u64,
            progress: snapshot.progress_in_step.clamp(0.0, 1.0),
            cycle_label: format!(
                "Cycle {} of {}",
                snapshot.current_cycle, snapshot.cycle_count
            ),
            step_label: format!(
                "Step {} of {}",
                snapshot.current_step_index + 1,
                snapshot.step_count
            ),
        }
    }

    /// Fixed-width text progress bar.
    pub fn progress_bar(&self, width: usize) -> String {
        let filled = ((self.progress * width as f32).round() as usize).min(width);
        format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<32} {:>3} seconds [{}] {} | {}",
            self.heading,
            self.countdown_seconds,
            self.progress_bar(20),
            self.cycle_label,
            self.step_label
        )
    }
}

/// Catalog card and instructions screen for one exercise.
#[derive(Debug, Clone, Copy)]
pub struct ExerciseSummary<'a> {
    exercise: &'a Exercise,
}

impl<'a> ExerciseSummary<'a> {
    pub fn new(exercise: &'a Exercise) -> Self {
        Self { exercise }
    }

    pub fn duration_line(&self) -> String {
        format!(
            "Duration: {} seconds per cycle",
            self.exercise.cycle_duration_seconds()
        )
    }

    pub fn cycles_line(&self) -> String {
        format!("Cycles: {}", self.exercise.cycles)
    }

    /// One line per exercise, for the catalog listing.
    pub fn card(&self) -> String {
        format!(
            "{:<14} {:<22} {:<9} {}",
            self.exercise.id,
            self.exercise.title,
            self.exercise.category.to_string(),
            self.exercise.info
        )
    }

    /// Full instructions screen shown before an exercise starts.
    pub fn instructions(&self) -> String {
        let exercise = self.exercise;
        let mut text = format!("{}\n{}\n\n", exercise.title, exercise.info);
        if !exercise.instructions.is_empty() {
            text.push_str(&exercise.instructions);
            text.push_str("\n\n");
        }
        for (index, step) in exercise.steps.iter().enumerate() {
            text.push_str(&format!(
                "  {}. {} for {}s",
                index + 1,
                step.phase.title(),
                step.duration_seconds
            ));
            if let Some(instruction) = &step.instruction {
                text.push_str(&format!(" ({instruction})"));
            }
            text.push('\n');
        }
        text.push_str(&format!("\n{}\n{}", self.duration_line(), self.cycles_line()));
        text
    }
}

/// What the shell shows for a requested exercise id.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Exercise(&'a Exercise),
    /// The id was not in the catalog; the listing stands in for it.
    Catalog { requested: String, listing: String },
}

impl<'a> Selection<'a> {
    /// Resolves `id`, redirecting unknown ids to the catalog listing.
    pub fn resolve(catalog: &'a ExerciseCatalog, id: &str) -> Self {
        match catalog.get(id) {
            Some(exercise) => Selection::Exercise(exercise),
            None => {
                tracing::warn!(id, "exercise not found, showing catalog");
                Selection::Catalog {
                    requested: id.to_string(),
                    listing: catalog_listing(catalog),
                }
            }
        }
    }

    pub fn exercise(&self) -> Option<&'a Exercise> {
        match self {
            Selection::Exercise(exercise) => Some(*exercise),
            Selection::Catalog { .. } => None,
        }
    }
}

impl fmt::Display for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Exercise(exercise) => {
                f.write_str(&ExerciseSummary::new(exercise).instructions())
            }
            Selection::Catalog { requested, listing } => {
                write!(f, "No exercise called `{requested}`. Available exercises:\n\n{listing}")
            }
        }
    }
}

/// Two lines per exercise: the card, then its duration and cycle count.
pub fn catalog_listing(catalog: &ExerciseCatalog) -> String {
    let mut text = String::new();
    for exercise in catalog.iter() {
        let summary = ExerciseSummary::new(exercise);
        text.push_str(&summary.card());
        text.push('\n');
        text.push_str(&format!(
            "{:<14} {} | {}\n",
            "",
            summary.duration_line(),
            summary.cycles_line()
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exercise::{CycleCount, ExerciseStep, Phase},
        ExerciseCatalog,
    };

    fn snapshot(exercise: &Exercise, step: usize, remaining: f64, progress: f32) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_running: true,
            current_cycle: 2,
            cycle_count: exercise.cycles,
            current_step_index: step,
            step_count: exercise.steps.len(),
            phase: exercise.steps[step].phase,
            remaining_seconds: remaining,
            progress_in_step: progress,
        }
    }

    #[test]
    fn formats_counters_and_countdown() {
        let catalog = ExerciseCatalog::builtin();
        let night = catalog.lookup("night").unwrap();
        let view = StatusView::from_snapshot(night, &snapshot(night, 1, 2.3, 0.425));

        assert_eq!(view.heading, "Hold");
        assert_eq!(view.countdown_seconds, 3);
        assert_eq!(view.cycle_label, "Cycle 2 of 3");
        assert_eq!(view.step_label, "Step 2 of 3");
    }

    #[test]
    fn unbounded_cycles_render_as_infinity() {
        let catalog = ExerciseCatalog::builtin();
        let timer = catalog.lookup("timer").unwrap();
        let view = StatusView::from_snapshot(timer, &snapshot(timer, 0, 4.0, 0.0));
        assert_eq!(view.cycle_label, "Cycle 2 of ∞");
        assert_eq!(view.countdown_seconds, 4);
    }

    #[test]
    fn heading_includes_step_instruction() {
        let exercise = Exercise::new(
            "hum",
            CycleCount::Unbounded,
            vec![ExerciseStep::new(Phase::Exhale, 6.0).with_instruction("Hum")],
        );
        let view = StatusView::from_snapshot(&exercise, &snapshot(&exercise, 0, 6.0, 0.0));
        assert_eq!(view.heading, "Exhale: Hum");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let catalog = ExerciseCatalog::builtin();
        let morning = catalog.lookup("morning").unwrap();
        let view = StatusView::from_snapshot(morning, &snapshot(morning, 0, 2.0, 0.5));
        assert_eq!(view.progress_bar(10), "#####-----");
        assert!(view.to_string().contains("Cycle 2 of 3"));
    }

    #[test]
    fn summary_lists_duration_and_cycles() {
        let catalog = ExerciseCatalog::builtin();
        let stress = ExerciseSummary::new(catalog.lookup("stress").unwrap());
        assert_eq!(stress.duration_line(), "Duration: 19 seconds per cycle");
        assert_eq!(stress.cycles_line(), "Cycles: 3");
        assert!(stress.instructions().contains("2. Hold for 7s"));
        assert!(stress.card().starts_with("stress"));

        let timer = ExerciseSummary::new(catalog.lookup("timer").unwrap());
        assert_eq!(timer.cycles_line(), "Cycles: ∞");
    }

    #[test]
    fn unknown_id_redirects_to_catalog_listing() {
        let catalog = ExerciseCatalog::builtin();
        let selection = Selection::resolve(&catalog, "sunrise");

        assert!(selection.exercise().is_none());
        let Selection::Catalog { requested, listing } = &selection else {
            panic!("expected the catalog listing, got {selection:?}");
        };
        assert_eq!(requested, "sunrise");
        assert_eq!(listing.lines().count(), 2 * catalog.len());
        for exercise in catalog.iter() {
            assert!(listing.contains(&exercise.title));
        }
        assert!(selection.to_string().starts_with("No exercise called `sunrise`"));
    }

    #[test]
    fn known_id_selects_the_exercise() {
        let catalog = ExerciseCatalog::builtin();
        let selection = Selection::resolve(&catalog, "night");
        assert_eq!(selection.exercise().map(|e| e.id.as_str()), Some("night"));
        assert!(selection.to_string().starts_with("Night Relaxation"));
    }
}
