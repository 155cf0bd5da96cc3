use super::airport::{AirportId, AirportRegistry};
use super::flight::{Flight, FlightId};

/// A departure or arrival fired by the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OccupancyEvent {
    /// `airport` is `None` when no airport sits exactly at the origin.
    Departure {
        flight: FlightId,
        airport: Option<AirportId>,
    },
    Arrival {
        flight: FlightId,
        airport: Option<AirportId>,
    },
}

/// Moves flights out of their origin airport and into their destination,
/// each exactly once.
///
/// Both transitions are gated by the flight's flags rather than by hitting an
/// exact progress value, so skipped frames or repeated ticks at the same
/// simulation time cannot fire them twice or miss them.
#[derive(Debug, Clone)]
pub struct OccupancyLedger {
    epsilon: f64,
}

impl OccupancyLedger {
    pub fn new(epsilon: f64) -> Self {
        OccupancyLedger { epsilon }
    }

    /// Applies the transitions due for `flight` at progress `t` and appends the
    /// fired events to `events`. Both may fire in the same call.
    pub fn update(
        &self,
        flight: &mut Flight,
        t: f64,
        airports: &mut AirportRegistry,
        events: &mut Vec<OccupancyEvent>,
    ) {
        if t > self.epsilon && !flight.departed {
            flight.departed = true;
            let airport = airports.find(&flight.origin);
            if let Some(id) = airport {
                airports.adjust_occupancy(id, -1);
            }
            events.push(OccupancyEvent::Departure {
                flight: flight.id,
                airport,
            });
        }

        if t > 1.0 - self.epsilon && !flight.arrived {
            flight.arrived = true;
            let airport = airports.find(&flight.destination);
            if let Some(id) = airport {
                airports.adjust_occupancy(id, 1);
            }
            events.push(OccupancyEvent::Arrival {
                flight: flight.id,
                airport,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::SimConfig;
    use crate::types::flight::FlightMetadata;
    use crate::types::geo::GeoPoint;

    fn setup() -> (AirportRegistry, AirportId, AirportId, Flight) {
        let mut airports = AirportRegistry::new();
        let aep = GeoPoint::new(-34.553, -58.413);
        let mdz = GeoPoint::new(-32.883, -68.845);
        let origin = airports.insert("AEP", "ARG", "Aeroparque", aep);
        let destination = airports.insert("MDZ", "ARG", "El Plumerillo", mdz);

        let flight = Flight::new(
            FlightId(0),
            aep,
            mdz,
            0.0,
            FlightMetadata::default(),
            &SimConfig::default(),
        );
        (airports, origin, destination, flight)
    }

    #[test]
    fn test_nothing_fires_before_epsilon() {
        let (mut airports, origin, _, mut flight) = setup();
        let ledger = OccupancyLedger::new(1e-3);
        let mut events = Vec::new();

        ledger.update(&mut flight, 0.0, &mut airports, &mut events);
        ledger.update(&mut flight, 1e-3, &mut airports, &mut events);

        assert!(events.is_empty());
        assert!(!flight.departed());
        assert_eq!(airports.get(origin).unwrap().occupancy(), 0);
    }

    #[test]
    fn test_departure_and_arrival_fire_once() {
        let (mut airports, origin, destination, mut flight) = setup();
        let ledger = OccupancyLedger::new(1e-3);
        let mut events = Vec::new();

        for t in [0.2, 0.2, 0.5, 1.0, 1.0, 0.3] {
            ledger.update(&mut flight, t, &mut airports, &mut events);
        }

        assert_eq!(
            events,
            vec![
                OccupancyEvent::Departure {
                    flight: FlightId(0),
                    airport: Some(origin)
                },
                OccupancyEvent::Arrival {
                    flight: FlightId(0),
                    airport: Some(destination)
                },
            ]
        );
        assert_eq!(airports.get(origin).unwrap().occupancy(), -1);
        assert_eq!(airports.get(destination).unwrap().occupancy(), 1);
    }

    #[test]
    fn test_jump_to_end_fires_both() {
        let (mut airports, _, _, mut flight) = setup();
        let ledger = OccupancyLedger::new(1e-3);
        let mut events = Vec::new();

        ledger.update(&mut flight, 1.0, &mut airports, &mut events);

        assert_eq!(events.len(), 2);
        assert!(flight.departed() && flight.arrived());
    }

    #[test]
    fn test_unmatched_airport_is_skipped() {
        let mut airports = AirportRegistry::new();
        let ledger = OccupancyLedger::new(1e-3);
        let mut flight = Flight::new(
            FlightId(3),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(20.0, 20.0),
            0.0,
            FlightMetadata::default(),
            &SimConfig::default(),
        );
        let mut events = Vec::new();

        ledger.update(&mut flight, 1.0, &mut airports, &mut events);

        assert_eq!(
            events[0],
            OccupancyEvent::Departure {
                flight: FlightId(3),
                airport: None
            }
        );
        assert!(flight.departed() && flight.arrived());
    }
}
