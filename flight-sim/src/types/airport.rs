use std::collections::HashMap;

use glam::DVec3;

use super::geo::GeoPoint;
use super::sim_error::SimError;

/// Stable handle of an airport, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirportId(pub usize);

impl AirportId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An airport node: a fixed point on the globe with a running count of the
/// flights currently on the ground there.
#[derive(Clone, Debug)]
pub struct Airport {
    pub id: AirportId,
    pub iata_code: String,
    pub country: String,
    pub name: String,
    pub location: GeoPoint,
    occupancy: i64,
}

impl Airport {
    pub fn new(
        id: AirportId,
        iata_code: String,
        country: String,
        name: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Airport {
            id,
            iata_code,
            country,
            name,
            location: GeoPoint::new(latitude, longitude),
            occupancy: 0,
        }
    }

    /// Number of flights on the ground. Not floored at zero.
    pub fn occupancy(&self) -> i64 {
        self.occupancy
    }

    /// Where the airport marker sits for a globe of the given radius.
    pub fn marker_position(&self, altitude: f64) -> DVec3 {
        self.location.position(altitude)
    }
}

/// Exact-equality key for a coordinate pair. `-0.0` and `0.0` map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LocationKey(u64, u64);

impl From<&GeoPoint> for LocationKey {
    fn from(point: &GeoPoint) -> Self {
        LocationKey(
            (point.latitude + 0.0).to_bits(),
            (point.longitude + 0.0).to_bits(),
        )
    }
}

/// All airports of a simulation, indexed by id and by exact location.
#[derive(Debug, Default)]
pub struct AirportRegistry {
    airports: Vec<Airport>,
    by_location: HashMap<LocationKey, AirportId>,
}

impl AirportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an airport, or returns the id of the one already at the same
    /// coordinates. No tolerance is applied: points that differ in the last
    /// bit are different airports.
    pub fn insert(
        &mut self,
        iata_code: &str,
        country: &str,
        name: &str,
        location: GeoPoint,
    ) -> AirportId {
        let key = LocationKey::from(&location);
        if let Some(id) = self.by_location.get(&key) {
            return *id;
        }

        let id = AirportId(self.airports.len());
        self.airports.push(Airport::new(
            id,
            iata_code.to_string(),
            country.to_string(),
            name.to_string(),
            location.latitude,
            location.longitude,
        ));
        self.by_location.insert(key, id);
        id
    }

    pub fn find(&self, location: &GeoPoint) -> Option<AirportId> {
        self.by_location.get(&LocationKey::from(location)).copied()
    }

    pub fn get(&self, id: AirportId) -> Result<&Airport, SimError> {
        self.airports
            .get(id.index())
            .ok_or(SimError::AirportNotFound(id.index()))
    }

    /// Adds `delta` to an airport's occupancy and returns the new count.
    pub(crate) fn adjust_occupancy(&mut self, id: AirportId, delta: i64) -> Option<i64> {
        let airport = self.airports.get_mut(id.index())?;
        airport.occupancy += delta;
        Some(airport.occupancy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.airports.iter()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_location_returns_existing_airport() {
        let mut registry = AirportRegistry::new();
        let aep = registry.insert("AEP", "ARG", "Aeroparque", GeoPoint::new(-34.553, -58.413));
        let again = registry.insert("", "", "", GeoPoint::new(-34.553, -58.413));

        assert_eq!(aep, again);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(aep).unwrap().iata_code, "AEP");
    }

    #[test]
    fn test_no_tolerance_merging() {
        let mut registry = AirportRegistry::new();
        registry.insert("AEP", "ARG", "Aeroparque", GeoPoint::new(-34.553, -58.413));

        assert!(registry
            .find(&GeoPoint::new(-34.553_000_000_1, -58.413))
            .is_none());
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let mut registry = AirportRegistry::new();
        let id = registry.insert("NUL", "", "Null Island", GeoPoint::new(0.0, 0.0));
        assert_eq!(registry.find(&GeoPoint::new(-0.0, -0.0)), Some(id));
    }

    #[test]
    fn test_occupancy_can_go_negative() {
        let mut registry = AirportRegistry::new();
        let id = registry.insert("EZE", "ARG", "Ezeiza", GeoPoint::new(-34.822, -58.535));

        assert_eq!(registry.adjust_occupancy(id, -1), Some(-1));
        assert_eq!(registry.get(id).unwrap().occupancy(), -1);
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let registry = AirportRegistry::new();
        assert!(matches!(
            registry.get(AirportId(3)),
            Err(SimError::AirportNotFound(3))
        ));
    }
}
