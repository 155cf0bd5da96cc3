/// Reveal state of a flight's path.
///
/// `Scheduled` until the simulation clock reaches the departure offset,
/// `Revealing` while segments are still being exposed, `Complete` once the
/// whole path is drawn. States only move forward.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FlightStatus {
    Scheduled,
    Revealing,
    Complete,
}

impl FlightStatus {
    /// Converts the `FlightStatus` variant to its corresponding string representation.
    pub fn as_str(&self) -> &str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Revealing => "revealing",
            FlightStatus::Complete => "complete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        assert_eq!(FlightStatus::Scheduled.as_str(), "scheduled");
        assert_eq!(FlightStatus::Revealing.as_str(), "revealing");
        assert_eq!(FlightStatus::Complete.as_str(), "complete");
    }
}
