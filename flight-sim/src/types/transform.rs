use glam::{DMat3, DQuat, DVec3};

use super::flight::{Flight, FlightId};

const MIN_AXIS_LENGTH: f64 = 1e-12;

/// Render-facing state of one flight.
///
/// The model's local `-Z` axis is the direction of travel and local `+Y` points
/// away from the globe centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: DVec3,
    pub forward: DVec3,
    pub orientation: DQuat,
    /// Whether the flight was en route at the last update.
    pub active: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: DVec3::ZERO,
            forward: DVec3::NEG_Z,
            orientation: DQuat::IDENTITY,
            active: false,
        }
    }
}

impl Transform {
    /// Moves the slot to `position` facing `ahead`. When `ahead` does not give
    /// a usable direction the previous orientation is kept.
    fn look_at(&mut self, position: DVec3, ahead: DVec3) {
        self.position = position;

        let up = position.normalize_or_zero();
        let heading = ahead - position;
        if heading.length() < MIN_AXIS_LENGTH {
            return;
        }
        let forward = heading.normalize();

        let right = forward.cross(up);
        if right.length() < MIN_AXIS_LENGTH {
            return;
        }
        let right = right.normalize();
        let up = right.cross(forward);

        self.forward = forward;
        self.orientation = DQuat::from_mat3(&DMat3::from_cols(right, up, -forward));
    }
}

/// One transform slot per flight, indexed by [`FlightId`].
#[derive(Debug, Clone)]
pub struct TransformBuffer {
    slots: Vec<Transform>,
    altitude: f64,
    lookahead: f64,
}

impl TransformBuffer {
    pub fn new(flight_count: usize, altitude: f64, lookahead: f64) -> Self {
        TransformBuffer {
            slots: vec![Transform::default(); flight_count],
            altitude,
            lookahead,
        }
    }

    /// Refreshes the slots of every flight en route at `sim_time` and returns
    /// how many there are.
    ///
    /// Slots of flights that are not en route are only marked inactive; their
    /// position and orientation stay as last written.
    pub fn update(&mut self, flights: &[Flight], sim_time: f64) -> usize {
        let mut active = 0;

        for flight in flights {
            let Some(slot) = self.slots.get_mut(flight.id.index()) else {
                continue;
            };

            let t = flight.raw_progress(sim_time);
            if !(0.0..=1.0).contains(&t) {
                slot.active = false;
                continue;
            }

            let position = flight.position_at(t, self.altitude);
            let ahead = flight.position_at((t + self.lookahead).min(1.0), self.altitude);
            slot.look_at(position, ahead);
            slot.active = true;
            active += 1;
        }

        active
    }

    pub fn slots(&self) -> &[Transform] {
        &self.slots
    }

    pub fn get(&self, id: FlightId) -> Option<&Transform> {
        self.slots.get(id.index())
    }

    pub fn active(&self) -> impl Iterator<Item = (FlightId, &Transform)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (FlightId(index), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
