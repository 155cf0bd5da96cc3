use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;

use super::sim_error::SimError;

/// Shared acceleration factor.
///
/// The console writes it from its own thread and the clock reads it once per
/// tick. The value is an `f64` stored as bits in a single atomic, so no lock is
/// involved.
#[derive(Debug, Clone)]
pub struct AccelerationControl {
    bits: Arc<AtomicU64>,
}

impl AccelerationControl {
    pub fn new(factor: f64) -> Result<Self, SimError> {
        validate_factor(factor)?;
        Ok(AccelerationControl {
            bits: Arc::new(AtomicU64::new(factor.to_bits())),
        })
    }

    /// Stores a new factor. Non-positive or non-finite values are rejected and
    /// the previous factor is kept.
    pub fn set(&self, factor: f64) -> Result<(), SimError> {
        validate_factor(factor)?;
        self.bits.store(factor.to_bits(), Ordering::SeqCst);
        Ok(())
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

fn validate_factor(factor: f64) -> Result<(), SimError> {
    if factor > 0.0 && factor.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidAcceleration(factor))
    }
}

/// Turns real elapsed time into simulation seconds.
///
/// Every [`advance`](SimulationClock::advance) scales the real time elapsed
/// since the previous read by the factor current at that read. Time already
/// simulated is never rescaled when the factor changes.
#[derive(Debug)]
pub struct SimulationClock {
    started_at: Instant,
    last_read: Instant,
    sim_time: f64,
    acceleration: AccelerationControl,
    paused: bool,
}

impl SimulationClock {
    pub fn new(started_at: Instant, acceleration: AccelerationControl) -> Self {
        SimulationClock {
            started_at,
            last_read: started_at,
            sim_time: 0.0,
            acceleration,
            paused: false,
        }
    }

    /// Accumulates the time elapsed since the last read and returns the new
    /// simulation time. An instant earlier than the last read adds nothing.
    pub fn advance(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_read);
        if now > self.last_read {
            self.last_read = now;
        }

        if !self.paused {
            self.sim_time += elapsed.as_secs_f64() * self.acceleration.get();
        }
        self.sim_time
    }

    /// Banks the time elapsed up to `now` at the current factor, then switches
    /// to `factor`.
    pub fn set_acceleration(&mut self, factor: f64, now: Instant) -> Result<(), SimError> {
        validate_factor(factor)?;
        self.advance(now);
        self.acceleration.set(factor)
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration.get()
    }

    /// Handle for external controls; writes through it apply from the next read.
    pub fn acceleration_control(&self) -> AccelerationControl {
        self.acceleration.clone()
    }

    /// Stops simulation time at `now`. Real time keeps flowing.
    pub fn pause(&mut self, now: Instant) {
        if !self.paused {
            self.advance(now);
            self.paused = true;
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.paused {
            self.advance(now);
            self.paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn clock(factor: f64) -> (SimulationClock, Instant) {
        let start = Instant::now();
        let control = AccelerationControl::new(factor).unwrap();
        (SimulationClock::new(start, control), start)
    }

    #[test]
    fn test_scales_elapsed_time() {
        let (mut clock, start) = clock(60.0);
        let sim_time = clock.advance(start + Duration::from_secs(2));
        assert!((sim_time - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let (mut clock, start) = clock(10.0);

        for factor in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                clock.set_acceleration(factor, start),
                Err(SimError::InvalidAcceleration(_))
            ));
        }
        assert_eq!(clock.acceleration(), 10.0);
        assert!(AccelerationControl::new(0.0).is_err());
    }

    #[test]
    fn test_change_applies_going_forward() {
        let (mut clock, start) = clock(10.0);

        clock
            .set_acceleration(100.0, start + Duration::from_secs(3))
            .unwrap();
        let sim_time = clock.advance(start + Duration::from_secs(5));

        assert!((sim_time - (3.0 * 10.0 + 2.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_control_write_scales_time_since_last_read() {
        let (mut clock, start) = clock(10.0);
        let control = clock.acceleration_control();

        clock.advance(start + Duration::from_secs(1));
        control.set(2.0).unwrap();
        let sim_time = clock.advance(start + Duration::from_secs(4));

        assert!((sim_time - (10.0 + 3.0 * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_earlier_instant_does_not_rewind() {
        let (mut clock, start) = clock(1.0);

        let later = clock.advance(start + Duration::from_secs(5));
        let again = clock.advance(start + Duration::from_secs(2));

        assert_eq!(later, again);
    }

    #[test]
    fn test_pause_freezes_simulation_time() {
        let (mut clock, start) = clock(1.0);

        clock.pause(start + Duration::from_secs(1));
        clock.advance(start + Duration::from_secs(10));
        clock.resume(start + Duration::from_secs(20));
        let sim_time = clock.advance(start + Duration::from_secs(22));

        assert!((sim_time - 3.0).abs() < 1e-9);
        assert!(!clock.is_paused());
    }
}
