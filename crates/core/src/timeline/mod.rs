use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crate::{KenkoError, Result};

/// Source of monotonically increasing instants, measured from an arbitrary
/// origin fixed when the clock is created.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock used for simulation and tests.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    time: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.time = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) {
        self.time = self.time.saturating_add(delta);
    }
}

impl Clock for PlaybackClock {
    fn now(&self) -> Duration {
        self.time
    }
}

/// Shared flag that asks a running [`Ticker`] to return.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Fixed-cadence periodic callback. Callbacks run one at a time on the
/// calling thread; returning from [`Ticker::run`] deregisters the callback.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval: Duration,
}

impl Ticker {
    /// Cadence used when nothing else is configured.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(KenkoError::InvalidInput("tick interval must be positive"));
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Calls `on_tick` with the current instant every interval until it
    /// breaks or `stop` is raised. Returns the number of callbacks made.
    pub fn run<C, F>(&self, clock: &C, stop: &StopHandle, mut on_tick: F) -> usize
    where
        C: Clock + ?Sized,
        F: FnMut(Duration) -> ControlFlow<()>,
    {
        let mut ticks = 0;
        let mut deadline = clock.now();

        while !stop.is_stopped() {
            deadline += self.interval;
            let now = clock.now();
            if let Some(wait) = deadline.checked_sub(now) {
                std::thread::sleep(wait);
            } else {
                // Fell behind; resynchronise instead of bursting.
                deadline = now;
            }

            if stop.is_stopped() {
                break;
            }

            ticks += 1;
            if on_tick(clock.now()).is_break() {
                break;
            }
        }

        tracing::debug!(ticks, "ticker stopped");
        ticks
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_clock_advances_and_resets() {
        let mut clock = PlaybackClock::new();
        clock.advance(Duration::from_millis(1500));
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_secs(2));

        clock.reset();
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(Ticker::new(Duration::ZERO).is_err());
        assert_eq!(Ticker::default().interval(), Duration::from_millis(50));
    }

    #[test]
    fn runs_until_callback_breaks() {
        let ticker = Ticker::new(Duration::from_millis(1)).unwrap();
        let clock = SystemClock::new();
        let mut seen = Vec::new();

        let ticks = ticker.run(&clock, &StopHandle::new(), |now| {
            seen.push(now);
            if seen.len() == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(ticks, 5);
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn stop_handle_deregisters_callback() {
        let ticker = Ticker::new(Duration::from_millis(1)).unwrap();
        let stop = StopHandle::new();
        let remote = stop.clone();
        let mut calls = 0;

        let ticks = ticker.run(&SystemClock::new(), &stop, |_| {
            calls += 1;
            if calls == 3 {
                remote.stop();
            }
            ControlFlow::Continue(())
        });

        assert_eq!(ticks, 3);
        assert_eq!(calls, 3);
    }
}
