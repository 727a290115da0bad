//! Venue adapters.

mod simulated;

pub use simulated::{SimulatedNetwork, SimulatedVenue, SimulationConfig, SubmissionRecord};
