pub mod airport;

pub mod clock;

pub mod config;

pub mod dataset;

pub mod engine;

pub mod flight;

pub mod flight_status;

pub mod geo;

pub mod occupancy;

pub mod path;

pub mod pick;

pub mod reveal;

pub mod sim_error;

pub mod test_data;

pub mod timer;

pub mod transform;

pub mod view_state;
