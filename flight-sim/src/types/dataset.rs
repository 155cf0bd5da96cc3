use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveTime, Timelike};
use serde::Deserialize;

use super::flight::FlightMetadata;
use super::geo::GeoPoint;
use super::sim_error::SimError;

/// One row of the flights file.
#[derive(Debug, Deserialize)]
struct FlightRow {
    #[serde(default)]
    flight_number: String,
    #[serde(default)]
    origin: String,
    #[serde(default)]
    destination: String,
    origin_lat: f64,
    origin_lon: f64,
    dest_lat: f64,
    dest_lon: f64,
    #[serde(default)]
    departure_time: Option<String>,
}

/// One row of the optional airports file.
#[derive(Debug, Deserialize)]
struct AirportRow {
    iata: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

/// A flight as read from the dataset, before the engine derives its path.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub start_offset: f64,
    pub metadata: FlightMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub iata_code: String,
    pub name: String,
    pub country: String,
    pub location: GeoPoint,
}

/// Everything the engine is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub flights: Vec<FlightPlan>,
    pub airports: Vec<AirportRecord>,
}

impl Dataset {
    /// Builds a dataset with flights ordered by departure. Flights departing
    /// at the same time keep their input order.
    pub fn new(mut flights: Vec<FlightPlan>, airports: Vec<AirportRecord>) -> Self {
        flights.sort_by(|a, b| a.start_offset.total_cmp(&b.start_offset));
        Dataset { flights, airports }
    }

    /// Reads the flights file and, if given, the airports file.
    pub fn load(flights_path: &Path, airports_path: Option<&Path>) -> Result<Self, SimError> {
        let flights_file = File::open(flights_path).map_err(|e| {
            SimError::Dataset(format!("failed to open {}: {}", flights_path.display(), e))
        })?;

        let airports_file = match airports_path {
            Some(path) => Some(File::open(path).map_err(|e| {
                SimError::Dataset(format!("failed to open {}: {}", path.display(), e))
            })?),
            None => None,
        };

        Self::from_readers(flights_file, airports_file)
    }

    /// Parses CSV data with a header row. Any malformed row fails the whole
    /// load; an empty flight list is an error too.
    pub fn from_readers<F: Read, A: Read>(
        flights: F,
        airports: Option<A>,
    ) -> Result<Self, SimError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(flights);
        let mut plans = Vec::new();
        for row in reader.deserialize() {
            let row: FlightRow = row?;
            plans.push(FlightPlan::from(row));
        }
        if plans.is_empty() {
            return Err(SimError::EmptyDataset);
        }

        let mut records = Vec::new();
        if let Some(airports) = airports {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(airports);
            for row in reader.deserialize() {
                let row: AirportRow = row?;
                records.push(AirportRecord {
                    iata_code: row.iata,
                    name: row.name,
                    country: row.country,
                    location: GeoPoint::new(row.lat, row.lon),
                });
            }
        }

        Ok(Dataset::new(plans, records))
    }
}

impl From<FlightRow> for FlightPlan {
    fn from(row: FlightRow) -> Self {
        let departure_label = row.departure_time.unwrap_or_default();
        FlightPlan {
            origin: GeoPoint::new(row.origin_lat, row.origin_lon),
            destination: GeoPoint::new(row.dest_lat, row.dest_lon),
            start_offset: parse_schedule(&departure_label),
            metadata: FlightMetadata {
                flight_number: row.flight_number,
                origin_label: row.origin,
                destination_label: row.destination,
                departure_label,
            },
        }
    }
}

/// Parses an `HH:MM` departure time into seconds from midnight. Anything that
/// does not parse counts as midnight.
pub fn parse_schedule(time: &str) -> f64 {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map(|time| time.num_seconds_from_midnight() as f64)
        .unwrap_or(0.0)
}
