//! Repository trait definitions for fleet persistence

use serde::Serialize;

use fleet_types::{AddressUpdate, Package, PackageFilter, Result, Vehicle, VehicleKind, VehicleRef};

/// All three collections read at once
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSnapshot {
    pub trucks: Vec<Vehicle>,
    pub vans: Vec<Vehicle>,
    pub packages: Vec<Package>,
}

/// Read/write access to vehicles and packages
///
/// Reads never fail; a missing collection reads as empty.
pub trait FleetRepository {
    /// All vehicles of a kind, in insertion order
    fn list_vehicles(&self, kind: VehicleKind) -> Vec<Vehicle>;

    /// Find a vehicle by id
    fn get_vehicle(&self, kind: VehicleKind, id: &str) -> Option<Vehicle>;

    /// Packages matching a filter, in insertion order
    fn list_packages(&self, filter: &PackageFilter) -> Vec<Package>;

    /// Find a package by id
    fn get_package(&self, id: &str) -> Option<Package>;

    /// Append a placeholder package to a vehicle (no capacity check)
    fn add_package(&self, vehicle: &VehicleRef) -> Result<Package>;

    /// Remove the most recently added package of a vehicle
    fn remove_package(&self, vehicle: &VehicleRef) -> Result<bool>;

    /// Replace a package's recipient name
    fn update_package_recipient(&self, id: &str, recipient_name: &str) -> Result<Package>;

    /// Merge address fields into a package
    fn update_package_address(&self, id: &str, address: &AddressUpdate) -> Result<Package>;

    /// Trucks, vans and packages in one read
    fn snapshot(&self) -> FleetSnapshot;
}
