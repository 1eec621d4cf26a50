//! Application Layer
//!
//! Orchestrates between the CLI and the store/domain layers:
//! - `fleet_service`: mutating use cases (capacity-guarded loading, package edits)
//! - `query_service`: read models for list, detail and dashboard views

pub mod fleet_service;
pub mod query_service;

pub use fleet_service::{load_package, unload_package, update_package_details};
pub use query_service::{
    fleet_stats, package_sections, vehicle_detail, vehicle_loads, PackageSections, VehicleDetail,
};
