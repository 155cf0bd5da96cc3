use chrono::{NaiveTime, Utc};
use flight_sim::types::{
    clock::AccelerationControl,
    config::{SimConfig, MAX_ACCELERATION, MIN_ACCELERATION},
    dataset::Dataset,
    engine::{Engine, PickInfo},
    flight::FlightId,
    geo::{vec_to_geo, GeoPoint},
    pick::{PickHit, PickTarget, Ray},
    sim_error::SimError,
    test_data::random_dataset,
    timer::FrameTimer,
    view_state::ViewState,
};
use logger::{Color, Logger};
use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    sync::{mpsc, Arc, Mutex, MutexGuard},
    thread,
    time::{Duration, Instant},
};
use threadpool::ThreadPool;

/// Distance from the globe centre of the camera used by `pick`.
const CAMERA_DISTANCE: f64 = 3.0;

const DISPLAY_REFRESH_MILLIS: u64 = 1000;

enum DatasetSource {
    Files {
        flights: PathBuf,
        airports: Option<PathBuf>,
    },
    Random,
}

impl DatasetSource {
    fn load(self) -> Result<Dataset, SimError> {
        match self {
            DatasetSource::Files { flights, airports } => {
                Dataset::load(&flights, airports.as_deref())
            }
            DatasetSource::Random => Ok(random_dataset(&mut rand::thread_rng())),
        }
    }
}

fn clean_scr() {
    print!("\x1B[2J\x1B[1;1H");
    io::stdout().flush().ok();
}

/// Parses `<flights.csv> [airports.csv] [config]` or `--test-data [config]`.
fn parse_args(args: &[String]) -> Result<(DatasetSource, Option<PathBuf>), String> {
    let usage = "Usage: flight-sim <flights.csv> [airports.csv] [config] | flight-sim --test-data [config]";

    match args.get(1).map(String::as_str) {
        None => Err(usage.to_string()),
        Some("--test-data") => {
            if args.len() > 3 {
                return Err(usage.to_string());
            }
            Ok((DatasetSource::Random, args.get(2).map(PathBuf::from)))
        }
        Some(flights) => {
            if args.len() > 4 {
                return Err(usage.to_string());
            }
            Ok((
                DatasetSource::Files {
                    flights: PathBuf::from(flights),
                    airports: args.get(2).map(PathBuf::from),
                },
                args.get(3).map(PathBuf::from),
            ))
        }
    }
}

/// Loads the dataset on a worker thread and waits for it. The frame loop must
/// not start before this returns.
fn load_dataset(source: DatasetSource) -> Result<Dataset, SimError> {
    let pool = ThreadPool::new(1);
    let (tx, rx) = mpsc::channel();

    pool.execute(move || {
        tx.send(source.load()).ok();
    });

    let result = rx
        .recv()
        .map_err(|_| SimError::Dataset("the loader thread exited without a result".to_string()))?;
    pool.join();
    result
}

fn main() -> Result<(), SimError> {
    let args: Vec<String> = env::args().collect();
    let (source, config_path) = parse_args(&args).map_err(SimError::Other)?;

    let config = match config_path {
        Some(path) => SimConfig::from_file(&path)?,
        None => SimConfig::default(),
    }
    .with_env_overrides()?;

    let session = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let logger = Logger::new(&config.log_dir, &session)?;

    let dataset = match load_dataset(source) {
        Ok(dataset) => dataset,
        Err(e) => {
            let _ = logger.error(&format!("Failed to load dataset: {}", e), true);
            return Err(e);
        }
    };
    logger.info(
        &format!(
            "Dataset loaded: {} flights, {} airports listed",
            dataset.flights.len(),
            dataset.airports.len()
        ),
        Color::Green,
        true,
    )?;

    let frame_millis = config.frame_millis;
    let engine = Engine::new(dataset, config, Instant::now())?.with_logger(logger.clone());
    let acceleration = engine.acceleration_control();
    let engine = Arc::new(Mutex::new(engine));

    let timer = FrameTimer::new(frame_millis);
    let frame_engine = Arc::clone(&engine);
    let frame_logger = logger.clone();
    let frame_thread = Arc::clone(&timer).start(move |now, _frame| match frame_engine.lock() {
        Ok(mut engine) => {
            engine.tick(now);
        }
        Err(_) => {
            let _ = frame_logger.error("Failed to lock engine. Skipping frame.", false);
        }
    })?;

    let mut view = ViewState::default();

    loop {
        println!("Enter command (type '-h' or '--help' for options): ");
        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }

        let args: Vec<&str> = command.split_whitespace().collect();
        if args.is_empty() {
            continue;
        }

        match args[0] {
            "time-rate" => {
                clean_scr();
                match set_time_rate(&acceleration, args.get(1).copied()) {
                    Ok(factor) => {
                        let _ = logger.info(
                            &format!("Acceleration set to x{}", factor),
                            Color::Green,
                            true,
                        );
                    }
                    Err(e) => println!("{}", e),
                }
            }

            "pause" => {
                lock_engine(&engine)?.pause(Instant::now());
                println!("Simulation paused");
            }

            "resume" => {
                lock_engine(&engine)?.resume(Instant::now());
                println!("Simulation resumed");
            }

            "list-flights" => {
                let enter = wait_for_enter();
                if let Err(e) = display_flights(&engine, &view, &enter) {
                    let _ = logger.error(&format!("{}. Press Enter to continue.", e), true);
                    enter.recv().ok();
                }
            }

            "list-airports" => {
                let engine = lock_engine(&engine)?;
                list_airports(&engine);
            }

            "toggle-completed" => {
                let shown = view.toggle_completed();
                println!("Completed paths {}", if shown { "shown" } else { "hidden" });
            }

            "toggle-in-progress" => {
                let shown = view.toggle_in_progress();
                println!("In-progress paths {}", if shown { "shown" } else { "hidden" });
            }

            "pick" => {
                clean_scr();
                match parse_point(&args[1..]) {
                    Some(point) => {
                        let engine = lock_engine(&engine)?;
                        match engine.pick_info(&Ray::looking_down_at(&point, CAMERA_DISTANCE)) {
                            Some(info) => print_info(&info),
                            None => println!("Nothing under ({}, {})", point.latitude, point.longitude),
                        }
                    }
                    None => println!("{}", SimError::InvalidInput),
                }
            }

            "info" => {
                clean_scr();
                let id = match args.get(1).and_then(|id| id.parse::<usize>().ok()) {
                    Some(id) => id,
                    None => {
                        println!("{}", SimError::InvalidInput);
                        continue;
                    }
                };
                let engine = lock_engine(&engine)?;
                let hit = PickHit {
                    target: PickTarget::Flight(FlightId(id)),
                    distance: 0.0,
                };
                match engine.describe(&hit) {
                    Ok(info) => print_info(&info),
                    Err(e) => println!("{}", e),
                }
            }

            "-h" | "--help" | "help" => print_help(),

            "exit" => break,

            _ => eprintln!("Invalid command. Use -h for help."),
        }
    }

    timer.stop();
    frame_thread
        .join()
        .map_err(|_| SimError::Other("The frame thread panicked".to_string()))?;
    let _ = logger.info("Simulation stopped", Color::Cyan, true);
    Ok(())
}

fn lock_engine(engine: &Arc<Mutex<Engine>>) -> Result<MutexGuard<'_, Engine>, SimError> {
    engine
        .lock()
        .map_err(|_| SimError::EngineLockError("Failed to lock the engine.".to_string()))
}

fn set_time_rate(acceleration: &AccelerationControl, input: Option<&str>) -> Result<f64, SimError> {
    let input = match input {
        Some(value) => value.to_string(),
        None => prompt_input(&format!(
            "Enter the acceleration factor ({}-{}): ",
            MIN_ACCELERATION, MAX_ACCELERATION
        )),
    };
    let factor: f64 = input.parse().map_err(|_| SimError::InvalidInput)?;

    if !(MIN_ACCELERATION..=MAX_ACCELERATION).contains(&factor) {
        return Err(SimError::InvalidAcceleration(factor));
    }
    acceleration.set(factor)?;
    Ok(factor)
}

fn parse_point(args: &[&str]) -> Option<GeoPoint> {
    let latitude = args.first()?.parse().ok()?;
    let longitude = args.get(1)?.parse().ok()?;
    Some(GeoPoint::new(latitude, longitude))
}

fn format_sim_time(sim_time: f64) -> String {
    let day = (sim_time / 86_400.0).floor() as i64 + 1;
    let seconds = sim_time.rem_euclid(86_400.0) as u32;
    let clock = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_default();
    format!("day {} {}", day, clock)
}

/// Reads one line from stdin on its own thread and signals when it arrives.
fn wait_for_enter() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut buffer = String::new();
        if io::stdin().read_line(&mut buffer).is_ok() {
            tx.send(()).ok();
        }
    });

    rx
}

/// Shows the flights whose path is visible under `view`, refreshed until
/// `enter` fires. Stops at the first failed engine lock; the caller still owns
/// the pending stdin line in that case.
fn display_flights(
    engine: &Arc<Mutex<Engine>>,
    view: &ViewState,
    enter: &mpsc::Receiver<()>,
) -> Result<(), SimError> {
    loop {
        {
            let engine = lock_engine(engine)?;
            clean_scr();
            println!(
                "Simulation time: {}   acceleration: x{}{}   segments drawn: {}",
                format_sim_time(engine.sim_time()),
                engine.acceleration(),
                if engine.is_paused() { "   [paused]" } else { "" },
                engine.revealed_paths().total_segments()
            );
            println!(
                "\n{:<5} {:<10} {:<10} {:<8} {:<8} {:<9} {:<10} {:<10}",
                "Id", "Flight", "Status", "Origin", "Dest", "Progress", "Latitude", "Longitude"
            );

            let mut shown = 0;
            for (flight, (_, path)) in engine.flights().iter().zip(engine.revealed_paths().iter()) {
                if !view.path_visible(path) {
                    continue;
                }
                shown += 1;

                let position = engine
                    .current_transforms()
                    .get(flight.id.index())
                    .filter(|slot| slot.active)
                    .map(|slot| vec_to_geo(slot.position));
                let (latitude, longitude) = match position {
                    Some(point) => (
                        format!("{:.4}", point.latitude),
                        format!("{:.4}", point.longitude),
                    ),
                    None => ("-".to_string(), "-".to_string()),
                };

                println!(
                    "{:<5} {:<10} {:<10} {:<8} {:<8} {:<9} {:<10} {:<10}",
                    flight.id.index(),
                    flight.metadata.flight_number,
                    flight.status().as_str(),
                    flight.metadata.origin_label,
                    flight.metadata.destination_label,
                    format!("{:.1}%", flight.progress(engine.sim_time()) * 100.0),
                    latitude,
                    longitude
                );
            }
            if shown == 0 {
                println!("No flights to show.");
            }
            println!("\nPress Enter to exit list-flights mode");
        }

        if enter.try_recv().is_ok() {
            break;
        }
        thread::sleep(Duration::from_millis(DISPLAY_REFRESH_MILLIS));
    }
    Ok(())
}

fn list_airports(engine: &Engine) {
    if engine.airports().is_empty() {
        println!("No airports available.");
        return;
    }

    println!("\n{:<5} {:<10} {:<50} {:<10}", "Id", "IATA Code", "Airport Name", "On ground");
    for airport in engine.airports().iter() {
        println!(
            "{:<5} {:<10} {:<50} {:<10}",
            airport.id.index(),
            airport.iata_code,
            airport.name,
            airport.occupancy()
        );
    }
}

fn print_info(info: &PickInfo) {
    match info {
        PickInfo::Flight {
            id,
            flight_number,
            origin,
            destination,
            origin_label,
            destination_label,
            departure_label,
            start_offset,
            duration,
            arrival_offset,
            progress,
            status,
            heading,
            distance_km,
        } => {
            println!("Flight #{} {}", id.index(), flight_number);
            println!(
                "  From {} ({:.3}, {:.3}) to {} ({:.3}, {:.3})",
                origin_label,
                origin.latitude,
                origin.longitude,
                destination_label,
                destination.latitude,
                destination.longitude
            );
            println!(
                "  Departs {} ({}), flight time {:.0} min, lands {}",
                if departure_label.is_empty() { "00:00" } else { departure_label.as_str() },
                format_sim_time(*start_offset),
                duration / 60.0,
                format_sim_time(*arrival_offset)
            );
            println!(
                "  Status {}, {:.1}% done, heading {:.0} deg, {:.0} km",
                status.as_str(),
                progress * 100.0,
                heading,
                distance_km
            );
        }
        PickInfo::Airport {
            id,
            iata_code,
            name,
            country,
            location,
            occupancy,
        } => {
            println!("Airport #{} {} - {} ({})", id.index(), iata_code, name, country);
            println!(
                "  Location ({:.3}, {:.3}), {} aircraft on the ground",
                location.latitude, location.longitude, occupancy
            );
        }
    }
}

fn prompt_input(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_string()
}

fn print_help() {
    clean_scr();
    println!("Available commands:");
    println!("  time-rate [factor]");
    println!(
        "    Sets the simulation acceleration ({}-{} simulated seconds per real second).",
        MIN_ACCELERATION, MAX_ACCELERATION
    );
    println!("  pause");
    println!("    Pauses the simulation clock.");
    println!("  resume");
    println!("    Resumes the simulation clock.");
    println!("  list-flights");
    println!("    Show the flights whose path is currently drawn.");
    println!("  list-airports");
    println!("    Show the airports and how many aircraft are on the ground.");
    println!("  toggle-completed");
    println!("    Show or hide completed paths.");
    println!("  toggle-in-progress");
    println!("    Show or hide paths still being revealed.");
    println!("  pick <lat> <lon>");
    println!("    Describe the flight or airport under that point of the globe.");
    println!("  info <flight id>");
    println!("    Describe a flight.");
    println!("  exit");
    println!("    Closes this application.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_sim::types::{dataset::FlightPlan, flight::FlightMetadata};

    fn shared_engine() -> Arc<Mutex<Engine>> {
        let dataset = Dataset::new(
            vec![FlightPlan {
                origin: GeoPoint::new(-34.553, -58.413),
                destination: GeoPoint::new(-32.883, -68.845),
                start_offset: 0.0,
                metadata: FlightMetadata::default(),
            }],
            Vec::new(),
        );
        let engine = Engine::new(dataset, SimConfig::default(), Instant::now()).unwrap();
        Arc::new(Mutex::new(engine))
    }

    #[test]
    fn test_display_flights_stops_on_enter() {
        let engine = shared_engine();
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();

        assert!(display_flights(&engine, &ViewState::default(), &rx).is_ok());
    }

    #[test]
    fn test_display_flights_stops_on_poisoned_engine() {
        let engine = shared_engine();
        let poisoner = Arc::clone(&engine);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("frame thread died holding the engine");
        })
        .join();

        // Nothing is ever sent: the loop must leave on its own.
        let (_tx, rx) = mpsc::channel::<()>();
        let result = display_flights(&engine, &ViewState::default(), &rx);
        assert!(matches!(result, Err(SimError::EngineLockError(_))));
    }

    #[test]
    fn test_list_airports_accepts_a_locked_engine() {
        let engine = shared_engine();
        let guard = lock_engine(&engine).unwrap();
        list_airports(&guard);
        assert_eq!(guard.airports().len(), 2);
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_args_files() {
        let (source, config) =
            parse_args(&args(&["flight-sim", "flights.csv", "airports.csv", "sim.conf"])).unwrap();

        match source {
            DatasetSource::Files { flights, airports } => {
                assert_eq!(flights, PathBuf::from("flights.csv"));
                assert_eq!(airports, Some(PathBuf::from("airports.csv")));
            }
            DatasetSource::Random => panic!("Expected a file source"),
        }
        assert_eq!(config, Some(PathBuf::from("sim.conf")));
    }

    #[test]
    fn test_parse_args_requires_a_source() {
        assert!(parse_args(&args(&["flight-sim"])).is_err());
        assert!(parse_args(&args(&["flight-sim", "--test-data", "a", "b"])).is_err());
    }

    #[test]
    fn test_load_dataset_reports_missing_file() {
        let source = DatasetSource::Files {
            flights: PathBuf::from("/nonexistent/flights.csv"),
            airports: None,
        };
        assert!(matches!(load_dataset(source), Err(SimError::Dataset(_))));
    }

    #[test]
    fn test_set_time_rate_respects_range() {
        let control = AccelerationControl::new(60.0).unwrap();

        assert_eq!(set_time_rate(&control, Some("120")).unwrap(), 120.0);
        assert_eq!(control.get(), 120.0);

        assert!(set_time_rate(&control, Some("0")).is_err());
        assert!(set_time_rate(&control, Some("20000")).is_err());
        assert!(set_time_rate(&control, Some("fast")).is_err());
        assert_eq!(control.get(), 120.0);
    }

    #[test]
    fn test_format_sim_time() {
        assert_eq!(format_sim_time(0.0), "day 1 00:00:00");
        assert_eq!(format_sim_time(86_400.0 + 3_725.0), "day 2 01:02:05");
    }
}
