pub mod entities;
pub mod repositories;
pub mod services;

pub use entities::*;
pub use repositories::*;
pub use services::*;
pub use tracker_errors::{TrackerError, TrackerResult};
