//! System Health Monitor
//!
//! A bounded random walk. Each tick moves health by `(r - 0.45) * 2` for a
//! uniform `r` in `[0, 1)`, giving a slight upward drift, and clamps the
//! result to `[70, 100]`.
//!
//! Threshold events are edge-triggered: one [`HealthEvent::Critical`] when
//! health drops from above the threshold to at or below it, one
//! [`HealthEvent::Restored`] on the way back up. Staying on one side emits
//! nothing.

/// Lowest reachable health value
pub const HEALTH_FLOOR: f64 = 70.0;

/// Highest reachable health value
pub const HEALTH_CEILING: f64 = 100.0;

/// Threshold crossing observed on a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    /// Health fell to or below the threshold
    Critical(f64),
    /// Health rose back above the threshold
    Restored(f64),
}

#[derive(Debug, Clone)]
pub struct HealthMonitor {
    value: f64,
    threshold: f64,
}

impl HealthMonitor {
    pub fn new(initial: f64, threshold: f64) -> Self {
        Self {
            value: initial.clamp(HEALTH_FLOOR, HEALTH_CEILING),
            threshold,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Advance the walk with a caller-supplied `r` in `[0, 1)`
    pub fn step(&mut self, r: f64) -> Option<HealthEvent> {
        let previous = self.value;
        let next = (previous + (r - 0.45) * 2.0).clamp(HEALTH_FLOOR, HEALTH_CEILING);
        self.value = next;

        if previous > self.threshold && next <= self.threshold {
            Some(HealthEvent::Critical(next))
        } else if previous <= self.threshold && next > self.threshold {
            Some(HealthEvent::Restored(next))
        } else {
            None
        }
    }
}
