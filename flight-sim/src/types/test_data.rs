use rand::Rng;

use super::dataset::{AirportRecord, Dataset, FlightPlan};
use super::flight::FlightMetadata;
use super::geo::GeoPoint;

/// Airports used to build random datasets.
const AIRPORTS: &[(&str, &str, &str, f64, f64)] = &[
    ("AEP", "ARG", "Aeroparque Jorge Newbery", -34.553, -58.413),
    ("EZE", "ARG", "Aeropuerto Internacional Ministro Pistarini", -34.822, -58.535),
    ("COR", "ARG", "Aeropuerto Internacional Ingeniero Aeronáutico Ambrosio Taravella", -31.321, -64.213),
    ("ROS", "ARG", "Aeropuerto Internacional Rosario", -32.948, -60.787),
    ("MDZ", "ARG", "Aeropuerto Internacional El Plumerillo", -32.883, -68.845),
    ("BRC", "ARG", "Aeropuerto Internacional Teniente Luis Candelaria", -41.151, -71.158),
    ("USH", "ARG", "Aeropuerto Internacional Malvinas Argentinas", -54.843, -68.295),
    ("FTE", "ARG", "Aeropuerto Internacional Comandante Armando Tola", -50.280, -72.053),
    ("NQN", "ARG", "Aeropuerto Presidente Perón", -38.949, -68.156),
    ("SLA", "ARG", "Aeropuerto Internacional Martín Miguel de Güemes", -24.854, -65.486),
    ("TUC", "ARG", "Aeropuerto Internacional Teniente Benjamín Matienzo", -26.842, -65.104),
    ("GRU", "BRA", "Aeroporto Internacional de São Paulo-Guarulhos", -23.435, -46.473),
    ("SCL", "CHL", "Aeropuerto Internacional Arturo Merino Benítez", -33.393, -70.786),
    ("LIM", "PER", "Aeropuerto Internacional Jorge Chávez", -12.022, -77.114),
    ("BOG", "COL", "Aeropuerto Internacional El Dorado", 4.702, -74.147),
    ("MAD", "ESP", "Aeropuerto Adolfo Suárez Madrid-Barajas", 40.472, -3.561),
];

/// Builds a random dataset over the fixed airport list: between one and three
/// flights per airport, each to a different airport, departing at a random
/// minute of the day.
pub fn random_dataset<R: Rng>(rng: &mut R) -> Dataset {
    let airports: Vec<AirportRecord> = AIRPORTS
        .iter()
        .map(|(iata, country, name, lat, lon)| AirportRecord {
            iata_code: iata.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            location: GeoPoint::new(*lat, *lon),
        })
        .collect();

    let mut flights = Vec::new();
    for origin in &airports {
        let flight_count = rng.gen_range(1..=3);
        for _ in 0..flight_count {
            let destination = &airports[rng.gen_range(0..airports.len())];
            if destination.iata_code == origin.iata_code {
                continue;
            }

            let departure = format!("{:02}:{:02}", rng.gen_range(0..24), rng.gen_range(0..60));
            flights.push(FlightPlan {
                origin: origin.location,
                destination: destination.location,
                start_offset: super::dataset::parse_schedule(&departure),
                metadata: FlightMetadata {
                    flight_number: format!("{}{:04}", origin.iata_code, rng.gen_range(1000..9999)),
                    origin_label: origin.iata_code.clone(),
                    destination_label: destination.iata_code.clone(),
                    departure_label: departure,
                },
            });
        }
    }

    Dataset::new(flights, airports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_random_dataset_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let dataset = random_dataset(&mut rng);

        assert_eq!(dataset.airports.len(), AIRPORTS.len());
        assert!(dataset.flights.len() <= AIRPORTS.len() * 3);
        for flight in &dataset.flights {
            assert_ne!(flight.metadata.origin_label, flight.metadata.destination_label);
            assert!(flight.start_offset >= 0.0 && flight.start_offset < 86_400.0);
        }
        assert!(dataset
            .flights
            .windows(2)
            .all(|pair| pair[0].start_offset <= pair[1].start_offset));
    }
}
