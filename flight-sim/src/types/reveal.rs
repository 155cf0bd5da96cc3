use std::ops::Range;

use glam::DVec3;

use super::flight::{Flight, FlightId};
use super::flight_status::FlightStatus;

/// Per-flight state machine that exposes path segments as the flight advances.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    status: FlightStatus,
    revealed_segments: usize,
    segment_count: usize,
}

/// What a single reveal update changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevealStep {
    pub became_visible: bool,
    /// Segment indices exposed by this update, `start..end`.
    pub newly_revealed: Range<usize>,
    pub completed: bool,
}

impl RevealTracker {
    pub fn new(segment_count: usize) -> Self {
        RevealTracker {
            status: FlightStatus::Scheduled,
            revealed_segments: 0,
            segment_count,
        }
    }

    pub fn status(&self) -> FlightStatus {
        self.status
    }

    pub fn revealed_segments(&self) -> usize {
        self.revealed_segments
    }

    /// Advances the tracker.
    ///
    /// `started` tells whether the clock has reached the departure offset and
    /// `t` is the clamped progress fraction. The revealed count never goes
    /// down: a `t` lower than a previous one is ignored.
    pub fn update(&mut self, started: bool, t: f64) -> RevealStep {
        let mut step = RevealStep::default();

        match self.status {
            FlightStatus::Complete => return step,
            FlightStatus::Scheduled => {
                if !started {
                    return step;
                }
                self.status = FlightStatus::Revealing;
                step.became_visible = true;
            }
            FlightStatus::Revealing => {}
        }

        let target = ((t * self.segment_count as f64).floor() as usize).min(self.segment_count);
        if target > self.revealed_segments {
            step.newly_revealed = self.revealed_segments..target;
            self.revealed_segments = target;
        }

        if t >= 1.0 {
            self.status = FlightStatus::Complete;
            step.completed = true;
        }

        step
    }
}

/// A path segment ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec3,
    pub end: DVec3,
}

/// Renderable part of one flight's path.
#[derive(Debug, Clone, Default)]
pub struct RevealedPath {
    pub visible: bool,
    pub complete: bool,
    pub segments: Vec<Segment>,
}

/// Segments exposed so far for every flight, indexed by [`FlightId`].
/// Segments are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct RevealedPaths {
    paths: Vec<RevealedPath>,
}

impl RevealedPaths {
    pub fn new(flight_count: usize) -> Self {
        RevealedPaths {
            paths: vec![RevealedPath::default(); flight_count],
        }
    }

    pub fn get(&self, id: FlightId) -> Option<&RevealedPath> {
        self.paths.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlightId, &RevealedPath)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(index, path)| (FlightId(index), path))
    }

    pub fn total_segments(&self) -> usize {
        self.paths.iter().map(|path| path.segments.len()).sum()
    }

    fn apply(&mut self, id: FlightId, waypoints: &[DVec3], step: &RevealStep) {
        let Some(path) = self.paths.get_mut(id.index()) else {
            return;
        };

        if step.became_visible {
            path.visible = true;
        }
        for index in step.newly_revealed.clone() {
            if let (Some(start), Some(end)) = (waypoints.get(index), waypoints.get(index + 1)) {
                path.segments.push(Segment {
                    start: *start,
                    end: *end,
                });
            }
        }
        if step.completed {
            path.complete = true;
        }
    }
}

/// Runs the reveal state machine of `flight` at `sim_time` and materializes
/// whatever it exposed into `paths`.
pub fn advance(flight: &mut Flight, sim_time: f64, paths: &mut RevealedPaths) -> RevealStep {
    let started = sim_time >= flight.start_offset;
    let t = flight.progress(sim_time);
    let step = flight.reveal.update(started, t);

    paths.apply(flight.id, flight.path(), &step);
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::SimConfig;
    use crate::types::flight::FlightMetadata;
    use crate::types::geo::GeoPoint;

    #[test]
    fn test_scheduled_until_start() {
        let mut tracker = RevealTracker::new(10);
        let step = tracker.update(false, 0.0);

        assert_eq!(step, RevealStep::default());
        assert_eq!(tracker.status(), FlightStatus::Scheduled);
    }

    #[test]
    fn test_reveals_all_segments_up_to_target() {
        let mut tracker = RevealTracker::new(10);

        let first = tracker.update(true, 0.0);
        assert!(first.became_visible);
        assert!(first.newly_revealed.is_empty());

        let skipped = tracker.update(true, 0.47);
        assert_eq!(skipped.newly_revealed, 0..4);
        assert_eq!(tracker.revealed_segments(), 4);
        assert_eq!(tracker.status(), FlightStatus::Revealing);
    }

    #[test]
    fn test_lower_progress_is_a_no_op() {
        let mut tracker = RevealTracker::new(10);
        tracker.update(true, 0.8);

        let step = tracker.update(true, 0.2);
        assert!(step.newly_revealed.is_empty());
        assert_eq!(tracker.revealed_segments(), 8);

        // Clock moved back before the start offset.
        tracker.update(false, 0.0);
        assert_eq!(tracker.revealed_segments(), 8);
        assert_eq!(tracker.status(), FlightStatus::Revealing);
    }

    #[test]
    fn test_completes_once() {
        let mut tracker = RevealTracker::new(4);

        let step = tracker.update(true, 1.0);
        assert!(step.became_visible);
        assert!(step.completed);
        assert_eq!(step.newly_revealed, 0..4);

        let after = tracker.update(true, 1.0);
        assert_eq!(after, RevealStep::default());
        assert_eq!(tracker.status(), FlightStatus::Complete);
    }

    #[test]
    fn test_advance_materializes_segments() {
        let config = SimConfig {
            segment_count: 4,
            ..SimConfig::default()
        };
        let mut flight = Flight::new(
            FlightId(0),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 40.0),
            10.0,
            FlightMetadata::default(),
            &config,
        );
        let mut paths = RevealedPaths::new(1);

        advance(&mut flight, 5.0, &mut paths);
        assert!(!paths.get(FlightId(0)).unwrap().visible);

        let past_half = flight.start_offset + flight.duration() * 0.6;
        advance(&mut flight, past_half, &mut paths);

        let path = paths.get(FlightId(0)).unwrap();
        assert!(path.visible);
        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.segments[0].start, flight.path()[0]);
        assert_eq!(path.segments[1].end, flight.path()[2]);
        assert!(!path.complete);
    }
}
