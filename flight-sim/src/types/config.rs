use std::env;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use super::geo::EARTH_RADIUS_KM;
use super::sim_error::SimError;

/// Cruise speed every flight is simulated at.
pub const CRUISE_SPEED_KMH: f64 = 900.0;

/// Bounds of the acceleration control exposed to the user.
pub const MIN_ACCELERATION: f64 = 1.0;
pub const MAX_ACCELERATION: f64 = 10_000.0;

/// Environment variable that overrides `initial_acceleration`.
pub const ACCELERATION_ENV: &str = "SIM_ACCELERATION";

/// Tunables for the engine and the console driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of segments every flight path is split into.
    pub segment_count: usize,
    /// Radius at which paths and flights are drawn (globe radius is 1).
    pub path_altitude: f64,
    /// Radius at which airport markers sit.
    pub airport_altitude: f64,
    /// Radians of arc covered per simulation second.
    pub angular_speed: f64,
    pub departure_epsilon: f64,
    pub lookahead_epsilon: f64,
    pub flight_bounding_radius: f64,
    pub airport_marker_radius: f64,
    pub pick_near: f64,
    pub pick_far: f64,
    pub initial_acceleration: f64,
    pub frame_millis: u64,
    pub log_dir: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            segment_count: 64,
            path_altitude: 1.02,
            airport_altitude: 1.0,
            angular_speed: CRUISE_SPEED_KMH / EARTH_RADIUS_KM / 3600.0,
            departure_epsilon: 1e-3,
            lookahead_epsilon: 0.01,
            flight_bounding_radius: 0.02,
            airport_marker_radius: 0.01,
            pick_near: 0.0,
            pick_far: 100.0,
            initial_acceleration: 60.0,
            frame_millis: 33,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl SimConfig {
    /// Reads a `key = value` configuration file on top of the defaults.
    ///
    /// Blank lines and lines starting with `#` are ignored. Unknown keys and
    /// unparsable values are rejected.
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let file = File::open(path).map_err(|_| {
            SimError::InvalidConfig(format!("failed to open {}", path.display()))
        })?;
        let reader = io::BufReader::new(file);

        let mut config = SimConfig::default();
        for line in reader.lines() {
            let line = line?;
            config.apply_line(&line)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Same as [`SimConfig::from_file`] but from an in-memory string.
    pub fn parse(contents: &str) -> Result<Self, SimError> {
        let mut config = SimConfig::default();
        for line in contents.lines() {
            config.apply_line(line)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Applies the `SIM_ACCELERATION` override, if set.
    pub fn with_env_overrides(mut self) -> Result<Self, SimError> {
        if let Ok(value) = env::var(ACCELERATION_ENV) {
            self.initial_acceleration = parse_value(ACCELERATION_ENV, &value)?;
            self.validate()?;
        }
        Ok(self)
    }

    fn apply_line(&mut self, line: &str) -> Result<(), SimError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| SimError::InvalidConfig(format!("expected key = value: {}", line)))?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "segment_count" => self.segment_count = parse_value(key, value)?,
            "path_altitude" => self.path_altitude = parse_value(key, value)?,
            "airport_altitude" => self.airport_altitude = parse_value(key, value)?,
            "angular_speed" => self.angular_speed = parse_value(key, value)?,
            "departure_epsilon" => self.departure_epsilon = parse_value(key, value)?,
            "lookahead_epsilon" => self.lookahead_epsilon = parse_value(key, value)?,
            "flight_bounding_radius" => self.flight_bounding_radius = parse_value(key, value)?,
            "airport_marker_radius" => self.airport_marker_radius = parse_value(key, value)?,
            "pick_near" => self.pick_near = parse_value(key, value)?,
            "pick_far" => self.pick_far = parse_value(key, value)?,
            "initial_acceleration" => self.initial_acceleration = parse_value(key, value)?,
            "frame_millis" => self.frame_millis = parse_value(key, value)?,
            "log_dir" => self.log_dir = PathBuf::from(value),
            _ => return Err(SimError::InvalidConfig(format!("unknown key: {}", key))),
        }
        Ok(())
    }

    /// Checks the relations between values that the engine relies on.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.segment_count == 0 {
            return Err(SimError::InvalidConfig(
                "segment_count must be at least 1".to_string(),
            ));
        }
        if !(self.angular_speed > 0.0 && self.angular_speed.is_finite()) {
            return Err(SimError::InvalidConfig(
                "angular_speed must be positive".to_string(),
            ));
        }
        if !(self.departure_epsilon > 0.0 && self.departure_epsilon < 0.5) {
            return Err(SimError::InvalidConfig(
                "departure_epsilon must be in (0, 0.5)".to_string(),
            ));
        }
        if !(self.lookahead_epsilon > 0.0 && self.lookahead_epsilon <= 1.0) {
            return Err(SimError::InvalidConfig(
                "lookahead_epsilon must be in (0, 1]".to_string(),
            ));
        }
        if self.pick_near < 0.0 || self.pick_far <= self.pick_near {
            return Err(SimError::InvalidConfig(
                "pick window must satisfy 0 <= pick_near < pick_far".to_string(),
            ));
        }
        if !(MIN_ACCELERATION..=MAX_ACCELERATION).contains(&self.initial_acceleration) {
            return Err(SimError::InvalidAcceleration(self.initial_acceleration));
        }
        if self.frame_millis == 0 {
            return Err(SimError::InvalidConfig(
                "frame_millis must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SimError> {
    value
        .parse()
        .map_err(|_| SimError::InvalidConfig(format!("invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_overrides_and_comments() {
        let config = SimConfig::parse(
            "# globe settings\n\
             segment_count = 16\n\
             \n\
             path_altitude=1.05\n\
             log_dir = /tmp/sim-logs\n",
        )
        .unwrap();

        assert_eq!(config.segment_count, 16);
        assert_eq!(config.path_altitude, 1.05);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/sim-logs"));
        assert_eq!(config.frame_millis, SimConfig::default().frame_millis);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = SimConfig::parse("warp_drive = 9");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_value_is_rejected() {
        let result = SimConfig::parse("segment_count = many");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_segments_is_rejected() {
        let result = SimConfig::parse("segment_count = 0");
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_acceleration_outside_range_is_rejected() {
        let result = SimConfig::parse("initial_acceleration = 0");
        assert!(matches!(result, Err(SimError::InvalidAcceleration(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("flight_globe_config_test.txt");
        std::fs::write(&path, "frame_millis = 16\n").expect("Failed to write config");

        let config = SimConfig::from_file(&path).unwrap();
        assert_eq!(config.frame_millis, 16);

        std::fs::remove_file(&path).expect("Failed to remove config");
    }
}
