//! Step and cycle sequencing for an active exercise.
//!
//! [`PlaybackEngine::tick`] is a pure function of the engine state and the
//! `now` it is handed, so it can be driven by a real timer, a render loop or a
//! test loop with simulated time. Side effects such as audio cues hang off the
//! [`PlaybackEvent`]s it returns.

use std::time::Duration;

use crate::{
    exercise::{CycleCount, Exercise, ExerciseStep, Phase},
    Result,
};

/// Emitted when playback crosses a step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A new step began. Cycles are 1-indexed, steps 0-indexed.
    StepStarted {
        cycle: u32,
        step_index: usize,
        phase: Phase,
    },
    /// The last step of the last cycle ran out.
    Completed { cycles: u32 },
}

/// Observable playback state handed to the presentation layer each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub is_running: bool,
    pub current_cycle: u32,
    pub cycle_count: CycleCount,
    pub current_step_index: usize,
    pub step_count: usize,
    pub phase: Phase,
    pub remaining_seconds: f64,
    pub progress_in_step: f32,
}

#[derive(Debug, Clone)]
struct PlaybackState {
    is_running: bool,
    current_cycle: u32,
    current_step_index: usize,
    step_started_at: Duration,
    /// Elapsed time seen by the latest tick, clamped to the step duration.
    elapsed_in_step: f64,
}

#[derive(Debug, Clone)]
struct ActiveExercise {
    exercise: Exercise,
    state: PlaybackState,
}

impl ActiveExercise {
    fn current_step(&self) -> &ExerciseStep {
        &self.exercise.steps[self.state.current_step_index]
    }

    fn begin_step(&mut self, index: usize, now: Duration) -> PlaybackEvent {
        self.state.current_step_index = index;
        self.state.step_started_at = now;
        self.state.elapsed_in_step = 0.0;
        PlaybackEvent::StepStarted {
            cycle: self.state.current_cycle,
            step_index: index,
            phase: self.current_step().phase,
        }
    }

    fn advance(&mut self, now: Duration) -> PlaybackEvent {
        let next = self.state.current_step_index + 1;
        if next < self.exercise.steps.len() {
            return self.begin_step(next, now);
        }

        if self.exercise.cycles.allows_after(self.state.current_cycle) {
            self.state.current_cycle = self.state.current_cycle.saturating_add(1);
            return self.begin_step(0, now);
        }

        self.state.is_running = false;
        tracing::info!(
            exercise = %self.exercise.id,
            cycles = self.state.current_cycle,
            "exercise complete"
        );
        PlaybackEvent::Completed {
            cycles: self.state.current_cycle,
        }
    }
}

/// Drives a single exercise session through its steps and cycles.
#[derive(Debug, Default)]
pub struct PlaybackEngine {
    active: Option<ActiveExercise>,
    muted: bool,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `exercise` from cycle 1, step 0 at instant `now`, replacing any
    /// previous session. Returns the event for the first step.
    ///
    /// Fails without touching the current session when the exercise is
    /// malformed.
    pub fn start(&mut self, exercise: Exercise, now: Duration) -> Result<PlaybackEvent> {
        exercise.validate()?;
        tracing::info!(exercise = %exercise.id, cycles = %exercise.cycles, "starting exercise");

        let mut active = ActiveExercise {
            exercise,
            state: PlaybackState {
                is_running: true,
                current_cycle: 1,
                current_step_index: 0,
                step_started_at: now,
                elapsed_in_step: 0.0,
            },
        };
        let event = active.begin_step(0, now);
        self.active = Some(active);
        Ok(event)
    }

    /// Recomputes timing for the current step and performs at most one step
    /// transition. Overshoot past the boundary is dropped: the next step is
    /// timed from `now`, not from the exact instant the previous one ran out.
    pub fn tick(&mut self, now: Duration) -> Option<PlaybackEvent> {
        let active = self.active.as_mut().filter(|active| active.state.is_running)?;

        let duration = active.current_step().duration_seconds;
        let elapsed = now.saturating_sub(active.state.step_started_at).as_secs_f64();
        active.state.elapsed_in_step = elapsed.min(duration);

        (elapsed >= duration).then(|| active.advance(now))
    }

    /// Halts playback. Further ticks do nothing. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if active.state.is_running {
                tracing::info!(exercise = %active.exercise.id, "exercise stopped");
            }
            active.state.is_running = false;
        }
    }

    /// Flips the mute flag and returns the new value. Timing is unaffected.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.state.is_running)
    }

    pub fn exercise(&self) -> Option<&Exercise> {
        self.active.as_ref().map(|active| &active.exercise)
    }

    pub fn current_step(&self) -> Option<&ExerciseStep> {
        self.active.as_ref().map(ActiveExercise::current_step)
    }

    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        let active = self.active.as_ref()?;
        let step = active.current_step();
        let elapsed = active.state.elapsed_in_step;

        Some(PlaybackSnapshot {
            is_running: active.state.is_running,
            current_cycle: active.state.current_cycle,
            cycle_count: active.exercise.cycles,
            current_step_index: active.state.current_step_index,
            step_count: active.exercise.steps.len(),
            phase: step.phase,
            remaining_seconds: (step.duration_seconds - elapsed).max(0.0),
            progress_in_step: (elapsed / step.duration_seconds).clamp(0.0, 1.0) as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{exercise::ExerciseStep, KenkoError};

    const TICK: Duration = Duration::from_millis(50);

    fn secs(seconds: f64) -> Duration {
        Duration::from_secs_f64(seconds)
    }

    fn exercise(cycles: CycleCount, steps: &[(Phase, f64)]) -> Exercise {
        Exercise::new(
            "test",
            cycles,
            steps
                .iter()
                .map(|&(phase, seconds)| ExerciseStep::new(phase, seconds))
                .collect(),
        )
    }

    fn started(exercise: Exercise) -> PlaybackEngine {
        let mut engine = PlaybackEngine::new();
        engine.start(exercise, Duration::ZERO).unwrap();
        engine
    }

    #[test]
    fn start_announces_first_step() {
        let mut engine = PlaybackEngine::new();
        let event = engine
            .start(
                exercise(CycleCount::Unbounded, &[(Phase::Hold, 2.0), (Phase::Exhale, 2.0)]),
                secs(5.0),
            )
            .unwrap();

        assert_eq!(
            event,
            PlaybackEvent::StepStarted {
                cycle: 1,
                step_index: 0,
                phase: Phase::Hold
            }
        );
        let snapshot = engine.snapshot().unwrap();
        assert!(snapshot.is_running);
        assert_eq!(snapshot.current_cycle, 1);
        assert_eq!(snapshot.remaining_seconds, 2.0);
        assert_eq!(snapshot.progress_in_step, 0.0);
    }

    #[test]
    fn start_rejects_malformed_exercises() {
        let mut engine = PlaybackEngine::new();
        let err = engine
            .start(exercise(CycleCount::Unbounded, &[]), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, KenkoError::InvalidExercise { .. }));
        assert!(engine.snapshot().is_none());
        assert!(engine.tick(secs(1.0)).is_none());

        let zero = exercise(CycleCount::Unbounded, &[(Phase::Inhale, 0.0)]);
        assert!(engine.start(zero, Duration::ZERO).is_err());
    }

    #[test]
    fn single_cycle_inhale_exhale_completes() {
        let mut engine = started(exercise(
            CycleCount::finite(1).unwrap(),
            &[(Phase::Inhale, 4.0), (Phase::Exhale, 4.0)],
        ));

        assert_eq!(engine.tick(secs(2.0)), None);
        assert_eq!(engine.snapshot().unwrap().progress_in_step, 0.5);

        assert_eq!(
            engine.tick(secs(4.0)),
            Some(PlaybackEvent::StepStarted {
                cycle: 1,
                step_index: 1,
                phase: Phase::Exhale
            })
        );
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Exhale);
        assert_eq!(snapshot.progress_in_step, 0.0);

        assert_eq!(
            engine.tick(secs(8.0)),
            Some(PlaybackEvent::Completed { cycles: 1 })
        );
        assert!(!engine.is_running());
        assert!(!engine.snapshot().unwrap().is_running);
        assert_eq!(engine.tick(secs(20.0)), None);
    }

    #[test]
    fn unbounded_routine_wraps_to_next_cycle() {
        let mut engine = started(exercise(
            CycleCount::Unbounded,
            &[(Phase::Inhale, 4.0), (Phase::Hold, 7.0), (Phase::Exhale, 8.0)],
        ));

        let mut now = Duration::ZERO;
        let mut events = Vec::new();
        while now < secs(19.0) {
            now += TICK;
            events.extend(engine.tick(now));
        }

        assert_eq!(events.len(), 3);
        assert_eq!(
            events.last(),
            Some(&PlaybackEvent::StepStarted {
                cycle: 2,
                step_index: 0,
                phase: Phase::Inhale
            })
        );
        assert!(engine.is_running());
        assert_eq!(engine.snapshot().unwrap().current_cycle, 2);
    }

    #[test]
    fn exact_boundary_counts_as_exhausted() {
        let mut engine = started(exercise(
            CycleCount::Unbounded,
            &[(Phase::Inhale, 0.5), (Phase::Exhale, 0.5)],
        ));
        assert!(engine.tick(secs(0.499)).is_none());
        assert!(engine.tick(secs(0.5)).is_some());
    }

    #[test]
    fn long_gap_crosses_only_one_boundary() {
        let mut engine = started(exercise(
            CycleCount::finite(1).unwrap(),
            &[(Phase::Inhale, 1.0), (Phase::Hold, 1.0), (Phase::Exhale, 1.0)],
        ));

        let event = engine.tick(secs(10.0));
        assert_eq!(
            event,
            Some(PlaybackEvent::StepStarted {
                cycle: 1,
                step_index: 1,
                phase: Phase::Hold
            })
        );
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.progress_in_step, 0.0);
        assert_eq!(snapshot.remaining_seconds, 1.0);

        // The hold step is timed from the late tick, not from t=1s.
        assert!(engine.tick(secs(10.5)).is_none());
        assert!(engine.tick(secs(11.0)).is_some());
    }

    #[test]
    fn stop_halts_unbounded_playback() {
        let mut engine = started(exercise(CycleCount::Unbounded, &[(Phase::Inhale, 1.0)]));
        assert!(engine.tick(secs(1.0)).is_some());

        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
        assert!(engine.tick(secs(2.0)).is_none());
        assert!(engine.tick(secs(50.0)).is_none());
    }

    #[test]
    fn clock_running_backwards_keeps_progress_at_zero() {
        let mut engine = PlaybackEngine::new();
        engine
            .start(exercise(CycleCount::Unbounded, &[(Phase::Inhale, 4.0)]), secs(10.0))
            .unwrap();
        assert!(engine.tick(secs(9.0)).is_none());
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.progress_in_step, 0.0);
        assert_eq!(snapshot.remaining_seconds, 4.0);
    }

    #[test]
    fn muting_does_not_change_timing() {
        let mut engine = started(exercise(CycleCount::Unbounded, &[(Phase::Inhale, 1.0)]));
        assert!(engine.toggle_mute());
        assert!(engine.is_muted());
        assert!(engine.tick(secs(1.0)).is_some());
        assert!(!engine.toggle_mute());
    }

    #[test]
    fn stop_before_start_is_harmless() {
        let mut engine = PlaybackEngine::new();
        engine.stop();
        assert!(!engine.is_running());
        assert!(engine.current_step().is_none());
        assert!(engine.exercise().is_none());
    }

    fn step_strategy() -> impl Strategy<Value = Vec<(Phase, f64)>> {
        let phase = prop_oneof![
            Just(Phase::Inhale),
            Just(Phase::Hold),
            Just(Phase::Exhale),
            Just(Phase::Rest),
        ];
        prop::collection::vec(
            (phase, 50u64..3_000).prop_map(|(phase, millis)| (phase, millis as f64 / 1000.0)),
            1..5,
        )
    }

    proptest! {
        #[test]
        fn finite_routines_cross_every_boundary_then_stop(
            steps in step_strategy(),
            cycles in 1u32..4,
        ) {
            let mut engine = started(exercise(CycleCount::finite(cycles).unwrap(), &steps));
            let boundaries = cycles as usize * steps.len();

            let total: f64 = steps.iter().map(|(_, seconds)| seconds).sum::<f64>() * cycles as f64;
            let max_ticks = (total / TICK.as_secs_f64()) as usize + 2 * boundaries + 2;

            let mut now = Duration::ZERO;
            let mut crossed = 0;
            let mut completed = 0;
            for _ in 0..max_ticks {
                now += TICK;
                match engine.tick(now) {
                    Some(PlaybackEvent::StepStarted { .. }) => crossed += 1,
                    Some(PlaybackEvent::Completed { cycles: done }) => {
                        prop_assert_eq!(done, cycles);
                        crossed += 1;
                        completed += 1;
                    }
                    None => {}
                }
                let progress = engine.snapshot().unwrap().progress_in_step;
                prop_assert!((0.0..=1.0).contains(&progress));
            }

            prop_assert_eq!(crossed, boundaries);
            prop_assert_eq!(completed, 1);
            prop_assert!(!engine.is_running());
        }

        #[test]
        fn unbounded_routines_never_stop_on_their_own(
            steps in step_strategy(),
            ticks in 1usize..2_000,
        ) {
            let mut engine = started(exercise(CycleCount::Unbounded, &steps));
            let mut now = Duration::ZERO;
            for _ in 0..ticks {
                now += TICK;
                let completed = matches!(engine.tick(now), Some(PlaybackEvent::Completed { .. }));
                prop_assert!(!completed);
            }
            prop_assert!(engine.is_running());

            engine.stop();
            prop_assert!(engine.tick(now + TICK).is_none());
        }
    }
}
