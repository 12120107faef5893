/// Optional per-stage timing of the render pipeline
///
/// A *marker* spans one `start`/`stop` pair (one camera pass, one frame).
/// Each `log` call inside it charges the time since the previous log to a
/// named *timer*, so timers break a marker down into stages.
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Sink for pipeline timings. Chosen once when the viewport is built.
pub trait Instrumentation {
    fn start(&mut self, marker: &str);

    fn log(&mut self, marker: &str, timer: &str);

    fn stop(&mut self, marker: &str);

    /// How many times a marker was stopped, or a timer logged.
    fn count(&self, _marker: &str, _timer: Option<&str>) -> u64 {
        0
    }

    /// Emit collected timings.
    fn report(&self) {}

    fn reset(&mut self) {}
}

/// Instrumentation that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrumentation;

impl Instrumentation for NoopInstrumentation {
    #[inline]
    fn start(&mut self, _marker: &str) {}

    #[inline]
    fn log(&mut self, _marker: &str, _timer: &str) {}

    #[inline]
    fn stop(&mut self, _marker: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    pub count: u64,
    pub time: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct Marker {
    pub count: u64,
    pub time: Duration,
    /// Timers in first-logged order.
    timers: Vec<(String, Timer)>,
    started: Option<Instant>,
    last_log: Option<Instant>,
}

impl Marker {
    fn start(&mut self) {
        let now = Instant::now();
        self.started = Some(now);
        self.last_log = Some(now);
    }

    fn log(&mut self, name: &str) {
        let (Some(_), Some(last)) = (self.started, self.last_log) else {
            return;
        };
        let now = Instant::now();
        let index = match self.timers.iter().position(|(n, _)| n == name) {
            Some(i) => i,
            None => {
                self.timers.push((name.to_string(), Timer::default()));
                self.timers.len() - 1
            }
        };
        let timer = &mut self.timers[index].1;
        timer.count += 1;
        timer.time += now - last;
        self.last_log = Some(now);
    }

    fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.count += 1;
            self.time += started.elapsed();
        }
        self.last_log = None;
    }

    pub fn timers(&self) -> impl Iterator<Item = (&str, &Timer)> {
        self.timers.iter().map(|(name, timer)| (name.as_str(), timer))
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timers.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// One row of a marker report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub iterations: u64,
    pub total_ms: f64,
    pub ms_per_iteration: f64,
    /// Share of the marker's total time, in percent.
    pub percent: f64,
}

/// Collecting instrumentation keyed by marker name.
#[derive(Debug, Default, Clone)]
pub struct Markers {
    markers: BTreeMap<String, Marker>,
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers.get(name)
    }

    /// Report rows for a marker: an `ALL` row, then one per timer.
    pub fn table(&self, name: &str) -> Option<Vec<ReportRow>> {
        let marker = self.markers.get(name)?;
        let total = marker.time.as_secs_f64() * 1000.0;
        let row = |name: &str, iterations: u64, time: Duration| {
            let ms = time.as_secs_f64() * 1000.0;
            ReportRow {
                name: name.to_string(),
                iterations,
                total_ms: ms,
                ms_per_iteration: if iterations > 0 { ms / iterations as f64 } else { 0.0 },
                percent: if total > 0.0 { ms * 100.0 / total } else { 0.0 },
            }
        };

        let mut rows = vec![row("ALL", marker.count, marker.time)];
        rows.extend(marker.timers().map(|(n, t)| row(n, t.count, t.time)));
        Some(rows)
    }
}

impl Instrumentation for Markers {
    fn start(&mut self, marker: &str) {
        self.markers.entry(marker.to_string()).or_default().start();
    }

    fn log(&mut self, marker: &str, timer: &str) {
        if let Some(m) = self.markers.get_mut(marker) {
            m.log(timer);
        }
    }

    fn stop(&mut self, marker: &str) {
        if let Some(m) = self.markers.get_mut(marker) {
            m.stop();
        }
    }

    fn count(&self, marker: &str, timer: Option<&str>) -> u64 {
        let Some(m) = self.markers.get(marker) else {
            return 0;
        };
        match timer {
            Some(name) => m.timer(name).map_or(0, |t| t.count),
            None => m.count,
        }
    }

    fn report(&self) {
        for name in self.markers.keys() {
            for row in self.table(name).unwrap_or_default() {
                tracing::info!(
                    marker = %name,
                    stage = %row.name,
                    iterations = row.iterations,
                    ms = row.total_ms,
                    ms_per_iteration = row.ms_per_iteration,
                    percent = row.percent,
                    "timing"
                );
            }
        }
    }

    fn reset(&mut self) {
        self.markers.clear();
    }
}
