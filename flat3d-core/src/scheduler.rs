/// Frame scheduling: "run once per tick with a timestamp"
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

/// Source of display ticks for [`crate::Viewport::play`].
pub trait Scheduler {
    /// Wait for the next display tick and return its timestamp in
    /// milliseconds, or `None` when no further frames will come.
    fn next_frame(&mut self) -> Option<f64>;

    /// Extra delay requested between frames (the FPS cap).
    fn delay(&mut self, delay: Duration);
}

/// Wall-clock scheduler ticking at a fixed refresh rate.
#[derive(Debug, Clone)]
pub struct RealtimeScheduler {
    origin: Instant,
    refresh: Duration,
    last_tick: Option<Instant>,
}

impl RealtimeScheduler {
    pub fn new(refresh_rate: f64) -> Self {
        Self {
            origin: Instant::now(),
            refresh: Duration::from_secs_f64(1.0 / refresh_rate.max(1.0)),
            last_tick: None,
        }
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl Scheduler for RealtimeScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if let Some(last) = self.last_tick {
            let elapsed = last.elapsed();
            if elapsed < self.refresh {
                thread::sleep(self.refresh - elapsed);
            }
        }
        let now = Instant::now();
        self.last_tick = Some(now);
        Some((now - self.origin).as_secs_f64() * 1000.0)
    }

    fn delay(&mut self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// Scheduler fed with synthetic timestamps, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    ticks: VecDeque<f64>,
    delays: Vec<Duration>,
}

impl ManualScheduler {
    pub fn new(ticks: impl IntoIterator<Item = f64>) -> Self {
        Self {
            ticks: ticks.into_iter().collect(),
            delays: Vec::new(),
        }
    }

    /// `frames` ticks spaced `interval_ms` apart, starting at zero.
    pub fn fixed(frames: usize, interval_ms: f64) -> Self {
        Self::new((0..frames).map(|i| i as f64 * interval_ms))
    }

    pub fn push(&mut self, timestamp: f64) {
        self.ticks.push_back(timestamp);
    }

    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }

    /// Delays requested so far, in call order.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

impl Scheduler for ManualScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        self.ticks.pop_front()
    }

    fn delay(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}
