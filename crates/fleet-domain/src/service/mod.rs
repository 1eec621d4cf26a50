//! Domain services

pub mod load;
pub mod stats;

pub use load::{check_can_add, unique_by_id, vehicle_loads, VehicleLoad};
pub use stats::{utilization_percent, FleetStats};
