//! Boundary to the external media engine: the contract trait, the value
//! types that cross it, and the observation-handle bookkeeping.

pub mod contract;
pub mod models;
pub mod observation;

pub use contract::{EngineError, MediaEngineContract};
pub use models::*;
pub use observation::{ObservationHandle, ObservationTable};
