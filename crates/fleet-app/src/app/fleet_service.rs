//! Fleet mutation use cases
//!
//! 1. Capacity-guarded loading of a placeholder package onto a vehicle
//! 2. Unloading the most recently added package
//! 3. Editing a package's recipient and delivery address in one step

use fleet_domain::repository::FleetRepository;
use fleet_domain::service::{check_can_add, VehicleLoad};
use fleet_types::{AddressUpdate, Error, Package, PackageFilter, Result, VehicleRef};
use tracing::{debug, info};

fn current_load<R: FleetRepository>(repo: &R, vehicle: &VehicleRef) -> Result<VehicleLoad> {
    let found = repo
        .get_vehicle(vehicle.kind, &vehicle.id)
        .ok_or_else(|| Error::NotFound(format!("{} not found", vehicle.kind.label())))?;
    let count = repo
        .list_packages(&PackageFilter::Vehicle(vehicle.clone()))
        .len();
    Ok(VehicleLoad::new(vehicle.kind, found, count))
}

/// Add a placeholder package unless the vehicle is full
pub fn load_package<R: FleetRepository>(repo: &R, vehicle: &VehicleRef) -> Result<Package> {
    let load = current_load(repo, vehicle)?;
    check_can_add(&load)?;

    let package = repo.add_package(vehicle)?;
    info!(
        vehicle = %vehicle.id,
        package = %package.id,
        count = load.package_count + 1,
        capacity = load.vehicle.capacity,
        "Package loaded"
    );
    Ok(package)
}

/// Remove the newest package of a vehicle; `false` if it held none
pub fn unload_package<R: FleetRepository>(repo: &R, vehicle: &VehicleRef) -> Result<bool> {
    let load = current_load(repo, vehicle)?;
    if load.package_count == 0 {
        debug!(vehicle = %vehicle.id, "Nothing to unload");
        return Ok(false);
    }
    repo.remove_package(vehicle)
}

/// Apply an optional recipient change and an address merge
pub fn update_package_details<R: FleetRepository>(
    repo: &R,
    id: &str,
    recipient_name: Option<&str>,
    address: &AddressUpdate,
) -> Result<Package> {
    let mut package = repo
        .get_package(id)
        .ok_or_else(|| Error::NotFound("Package not found".to_string()))?;

    if let Some(name) = recipient_name {
        package = repo.update_package_recipient(id, name)?;
    }
    if !address.is_empty() {
        package = repo.update_package_address(id, address)?;
    }
    Ok(package)
}
