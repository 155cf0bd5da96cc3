use std::time::Instant;

use logger::{Color, Logger};

use super::airport::{Airport, AirportId, AirportRegistry};
use super::clock::{AccelerationControl, SimulationClock};
use super::config::SimConfig;
use super::dataset::Dataset;
use super::flight::{Flight, FlightId};
use super::flight_status::FlightStatus;
use super::geo::GeoPoint;
use super::occupancy::{OccupancyEvent, OccupancyLedger};
use super::pick::{PickHit, PickIndex, PickTarget, Ray};
use super::reveal::{self, RevealedPaths};
use super::sim_error::SimError;
use super::transform::{Transform, TransformBuffer};

/// What changed during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: usize,
    pub sim_time: f64,
    /// Flights whose path became visible this tick.
    pub newly_visible: Vec<FlightId>,
    pub segments_revealed: usize,
    /// Flights whose path finished revealing this tick.
    pub completed: Vec<FlightId>,
    pub occupancy: Vec<OccupancyEvent>,
    /// Flights en route after the tick.
    pub active: usize,
}

/// Descriptive fields of whatever a pick query hit.
#[derive(Debug, Clone, PartialEq)]
pub enum PickInfo {
    Flight {
        id: FlightId,
        flight_number: String,
        origin: GeoPoint,
        destination: GeoPoint,
        origin_label: String,
        destination_label: String,
        departure_label: String,
        start_offset: f64,
        duration: f64,
        arrival_offset: f64,
        progress: f64,
        status: FlightStatus,
        heading: f64,
        distance_km: f64,
    },
    Airport {
        id: AirportId,
        iata_code: String,
        name: String,
        country: String,
        location: GeoPoint,
        occupancy: i64,
    },
}

/// Owns the whole simulation: clock, flights, airports and the buffers the
/// renderer reads.
///
/// The render loop calls [`Engine::tick`] once per frame. Within a tick the
/// clock is read first, then every flight's reveal tracker and occupancy
/// transitions run, and the transform buffer is refreshed last.
pub struct Engine {
    clock: SimulationClock,
    flights: Vec<Flight>,
    airports: AirportRegistry,
    revealed: RevealedPaths,
    ledger: OccupancyLedger,
    transforms: TransformBuffer,
    pick_index: PickIndex,
    sim_time: f64,
    tick_count: usize,
    logger: Option<Logger>,
}

impl Engine {
    /// Builds every flight and airport from `dataset`.
    ///
    /// Airports come from the dataset's airport list plus any flight endpoint
    /// not already there. Each airport starts with one aircraft on the ground
    /// per flight departing from it.
    pub fn new(dataset: Dataset, config: SimConfig, started_at: Instant) -> Result<Self, SimError> {
        config.validate()?;
        if dataset.flights.is_empty() {
            return Err(SimError::EmptyDataset);
        }

        let mut airports = AirportRegistry::new();
        for record in &dataset.airports {
            airports.insert(
                &record.iata_code,
                &record.country,
                &record.name,
                record.location,
            );
        }

        let flights: Vec<Flight> = dataset
            .flights
            .into_iter()
            .enumerate()
            .map(|(index, plan)| {
                Flight::new(
                    FlightId(index),
                    plan.origin,
                    plan.destination,
                    plan.start_offset,
                    plan.metadata,
                    &config,
                )
            })
            .collect();

        for flight in &flights {
            let origin = airports.insert(
                &flight.metadata.origin_label,
                "",
                &flight.metadata.origin_label,
                flight.origin,
            );
            airports.insert(
                &flight.metadata.destination_label,
                "",
                &flight.metadata.destination_label,
                flight.destination,
            );
            airports.adjust_occupancy(origin, 1);
        }

        let acceleration = AccelerationControl::new(config.initial_acceleration)?;
        let flight_count = flights.len();

        Ok(Engine {
            clock: SimulationClock::new(started_at, acceleration),
            revealed: RevealedPaths::new(flight_count),
            ledger: OccupancyLedger::new(config.departure_epsilon),
            transforms: TransformBuffer::new(
                flight_count,
                config.path_altitude,
                config.lookahead_epsilon,
            ),
            pick_index: PickIndex {
                near: config.pick_near,
                far: config.pick_far,
                flight_radius: config.flight_bounding_radius,
                airport_radius: config.airport_marker_radius,
                airport_altitude: config.airport_altitude,
            },
            flights,
            airports,
            sim_time: 0.0,
            tick_count: 0,
            logger: None,
        })
    }

    /// Attaches a logger for simulation events.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        let _ = logger.info(
            &format!(
                "Engine ready: {} flights, {} airports, acceleration x{}",
                self.flights.len(),
                self.airports.len(),
                self.clock.acceleration()
            ),
            Color::Cyan,
            false,
        );
        self.logger = Some(logger);
        self
    }

    /// Advances the simulation to the real instant `now`.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let sim_time = self.clock.advance(now);
        self.sim_time = sim_time;
        self.tick_count += 1;

        let mut report = TickReport {
            tick: self.tick_count,
            sim_time,
            ..TickReport::default()
        };

        for flight in self.flights.iter_mut() {
            let step = reveal::advance(flight, sim_time, &mut self.revealed);
            if step.became_visible {
                report.newly_visible.push(flight.id);
            }
            report.segments_revealed += step.newly_revealed.len();
            if step.completed {
                report.completed.push(flight.id);
            }

            let t = flight.progress(sim_time);
            self.ledger
                .update(flight, t, &mut self.airports, &mut report.occupancy);
        }

        report.active = self.transforms.update(&self.flights, sim_time);

        self.log_tick(&report);
        report
    }

    /// Changes the acceleration factor, banking the time elapsed up to `now`
    /// at the old factor. Invalid factors leave the clock untouched.
    pub fn set_acceleration(&mut self, factor: f64, now: Instant) -> Result<(), SimError> {
        match self.clock.set_acceleration(factor, now) {
            Ok(()) => {
                self.log_info(&format!("Acceleration set to x{}", factor));
                Ok(())
            }
            Err(e) => {
                self.log_warn(&format!("Rejected acceleration {}", factor));
                Err(e)
            }
        }
    }

    pub fn acceleration(&self) -> f64 {
        self.clock.acceleration()
    }

    /// Handle for controls living outside the tick loop.
    pub fn acceleration_control(&self) -> AccelerationControl {
        self.clock.acceleration_control()
    }

    pub fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
        self.log_info("Simulation paused");
    }

    pub fn resume(&mut self, now: Instant) {
        self.clock.resume(now);
        self.log_info("Simulation resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Simulation time reached by the last tick.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    /// Transform slots indexed by [`FlightId`].
    pub fn current_transforms(&self) -> &[Transform] {
        self.transforms.slots()
    }

    pub fn transforms(&self) -> &TransformBuffer {
        &self.transforms
    }

    pub fn revealed_paths(&self) -> &RevealedPaths {
        &self.revealed
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn flight(&self, id: FlightId) -> Result<&Flight, SimError> {
        self.flights
            .get(id.index())
            .ok_or(SimError::FlightNotFound(id.index()))
    }

    pub fn airports(&self) -> &AirportRegistry {
        &self.airports
    }

    pub fn airport(&self, id: AirportId) -> Result<&Airport, SimError> {
        self.airports.get(id)
    }

    /// Closest airport marker or en-route flight along `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        self.pick_index.pick(ray, &self.transforms, &self.airports)
    }

    /// Descriptive fields of a pick hit, as of the last tick.
    pub fn describe(&self, hit: &PickHit) -> Result<PickInfo, SimError> {
        match hit.target {
            PickTarget::Flight(id) => {
                let flight = self.flight(id)?;
                Ok(PickInfo::Flight {
                    id,
                    flight_number: flight.metadata.flight_number.clone(),
                    origin: flight.origin,
                    destination: flight.destination,
                    origin_label: flight.metadata.origin_label.clone(),
                    destination_label: flight.metadata.destination_label.clone(),
                    departure_label: flight.metadata.departure_label.clone(),
                    start_offset: flight.start_offset,
                    duration: flight.duration(),
                    arrival_offset: flight.arrival_offset(),
                    progress: flight.progress(self.sim_time),
                    status: flight.status(),
                    heading: flight.heading(),
                    distance_km: flight.distance_km(),
                })
            }
            PickTarget::Airport(id) => {
                let airport = self.airport(id)?;
                Ok(PickInfo::Airport {
                    id,
                    iata_code: airport.iata_code.clone(),
                    name: airport.name.clone(),
                    country: airport.country.clone(),
                    location: airport.location,
                    occupancy: airport.occupancy(),
                })
            }
        }
    }

    /// Pick followed by describe.
    pub fn pick_info(&self, ray: &Ray) -> Option<PickInfo> {
        self.pick(ray).and_then(|hit| self.describe(&hit).ok())
    }

    fn log_tick(&self, report: &TickReport) {
        let Some(logger) = &self.logger else {
            return;
        };

        for event in &report.occupancy {
            let (verb, flight, airport) = match event {
                OccupancyEvent::Departure { flight, airport } => ("departed from", flight, airport),
                OccupancyEvent::Arrival { flight, airport } => ("arrived at", flight, airport),
            };
            let number = self
                .flights
                .get(flight.index())
                .map(|f| f.metadata.flight_number.as_str())
                .unwrap_or_default();

            match airport.and_then(|id| self.airports.get(id).ok()) {
                Some(airport) => {
                    let _ = logger.debug(&format!(
                        "[t={:.0}] Flight #{} {} {} {} (occupancy {})",
                        report.sim_time,
                        flight.index(),
                        number,
                        verb,
                        airport.iata_code,
                        airport.occupancy()
                    ));
                }
                None => {
                    let _ = logger.warn(
                        &format!(
                            "[t={:.0}] Flight #{} {} {} an unknown airport, occupancy not updated",
                            report.sim_time,
                            flight.index(),
                            number,
                            verb
                        ),
                        false,
                    );
                }
            }
        }

        if !report.completed.is_empty() {
            let _ = logger.debug(&format!(
                "[t={:.0}] {} path(s) fully revealed",
                report.sim_time,
                report.completed.len()
            ));
        }
    }

    fn log_info(&self, message: &str) {
        if let Some(logger) = &self.logger {
            let _ = logger.info(message, Color::Cyan, false);
        }
    }

    fn log_warn(&self, message: &str) {
        if let Some(logger) = &self.logger {
            let _ = logger.warn(message, false);
        }
    }
}
