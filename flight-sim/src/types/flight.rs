use glam::DVec3;

use super::config::SimConfig;
use super::flight_status::FlightStatus;
use super::geo::{
    angular_separation, haversine_distance_km, initial_bearing, interpolate_direction, GeoPoint,
    DEGENERATE_SEPARATION_RAD,
};
use super::path;
use super::reveal::RevealTracker;

/// Stable handle of a flight, assigned once by the engine after the dataset is
/// sorted by departure. The engine never reorders, inserts or removes flights
/// afterwards, so the handle can address the flight's slot in the transform
/// and revealed-path buffers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightId(pub usize);

impl FlightId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Display data carried along with a flight. The engine never reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightMetadata {
    pub flight_number: String,
    pub origin_label: String,
    pub destination_label: String,
    pub departure_label: String,
}

/// A flight between two points on the globe, with its precomputed path and
/// the one-way state driven by the simulation clock.
#[derive(Debug, Clone)]
pub struct Flight {
    pub id: FlightId,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// Simulation seconds from epoch 0 at which the flight departs.
    pub start_offset: f64,
    pub metadata: FlightMetadata,
    duration: f64,
    path: Vec<DVec3>,
    pub(crate) reveal: RevealTracker,
    pub(crate) departed: bool,
    pub(crate) arrived: bool,
}

impl Flight {
    /// Creates a flight, deriving its duration and path from the configuration.
    pub fn new(
        id: FlightId,
        origin: GeoPoint,
        destination: GeoPoint,
        start_offset: f64,
        metadata: FlightMetadata,
        config: &SimConfig,
    ) -> Self {
        let separation = angular_separation(&origin, &destination);
        let duration = if separation < DEGENERATE_SEPARATION_RAD {
            0.0
        } else {
            separation / config.angular_speed
        };

        let path = path::generate(
            &origin,
            &destination,
            config.segment_count,
            config.path_altitude,
        );
        let segment_count = path.len() - 1;

        Flight {
            id,
            origin,
            destination,
            start_offset,
            metadata,
            duration,
            path,
            reveal: RevealTracker::new(segment_count),
            departed: false,
            arrived: false,
        }
    }

    /// Flight time in simulation seconds. Zero for coincident endpoints.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn arrival_offset(&self) -> f64 {
        self.start_offset + self.duration
    }

    pub fn path(&self) -> &[DVec3] {
        &self.path
    }

    pub fn segment_count(&self) -> usize {
        self.path.len() - 1
    }

    pub fn revealed_segments(&self) -> usize {
        self.reveal.revealed_segments()
    }

    pub fn status(&self) -> FlightStatus {
        self.reveal.status()
    }

    pub fn departed(&self) -> bool {
        self.departed
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    /// Unclamped progress fraction at `sim_time`: negative before departure,
    /// above one after arrival.
    ///
    /// A zero-duration flight jumps from `-inf` to exactly `1.0` at its start
    /// offset and to `+inf` right after, so it is en route for one instant.
    pub fn raw_progress(&self, sim_time: f64) -> f64 {
        let elapsed = sim_time - self.start_offset;
        if self.duration > 0.0 {
            elapsed / self.duration
        } else if elapsed < 0.0 {
            f64::NEG_INFINITY
        } else if elapsed == 0.0 {
            1.0
        } else {
            f64::INFINITY
        }
    }

    /// Progress fraction clamped to [0, 1].
    pub fn progress(&self, sim_time: f64) -> f64 {
        self.raw_progress(sim_time).clamp(0.0, 1.0)
    }

    pub fn is_en_route(&self, sim_time: f64) -> bool {
        (0.0..=1.0).contains(&self.raw_progress(sim_time))
    }

    /// Position along the flight at progress `t`, at `altitude` from the globe
    /// centre. Uses the same approximation as the path itself.
    pub fn position_at(&self, t: f64, altitude: f64) -> DVec3 {
        interpolate_direction(self.origin.direction(), self.destination.direction(), t) * altitude
    }

    /// Initial heading in degrees clockwise from north.
    pub fn heading(&self) -> f64 {
        initial_bearing(&self.origin, &self.destination)
    }

    pub fn distance_km(&self) -> f64 {
        haversine_distance_km(&self.origin, &self.destination)
    }
}
