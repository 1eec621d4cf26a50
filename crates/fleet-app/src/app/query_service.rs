//! Read models for list, detail and dashboard views

use fleet_domain::repository::FleetRepository;
use fleet_domain::service::{self, unique_by_id, FleetStats, VehicleLoad};
use fleet_types::{Package, PackageFilter, VehicleKind, VehicleRef};
use serde::Serialize;

/// One vehicle with the packages assigned to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub load: VehicleLoad,
    pub packages: Vec<Package>,
}

/// Packages grouped by the kind of vehicle carrying them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageSections {
    pub trucks: Vec<Package>,
    pub vans: Vec<Package>,
}

impl PackageSections {
    pub fn section(&self, kind: VehicleKind) -> &[Package] {
        match kind {
            VehicleKind::Truck => &self.trucks,
            VehicleKind::Van => &self.vans,
        }
    }
}

/// All vehicles of a kind with their package counts
pub fn vehicle_loads<R: FleetRepository>(repo: &R, kind: VehicleKind) -> Vec<VehicleLoad> {
    let vehicles = repo.list_vehicles(kind);
    let packages = repo.list_packages(&PackageFilter::Kind(kind));
    service::vehicle_loads(kind, &vehicles, &packages)
}

pub fn vehicle_detail<R: FleetRepository>(
    repo: &R,
    kind: VehicleKind,
    id: &str,
) -> Option<VehicleDetail> {
    let vehicle = repo.get_vehicle(kind, id)?;
    let packages = unique_by_id(repo.list_packages(&PackageFilter::Vehicle(VehicleRef::new(kind, id))));
    Some(VehicleDetail {
        load: VehicleLoad::new(kind, vehicle, packages.len()),
        packages,
    })
}

/// Dashboard totals across both fleets
pub fn fleet_stats<R: FleetRepository>(repo: &R) -> FleetStats {
    FleetStats::from_snapshot(&repo.snapshot())
}

pub fn package_sections<R: FleetRepository>(repo: &R) -> PackageSections {
    PackageSections {
        trucks: unique_by_id(repo.list_packages(&PackageFilter::Kind(VehicleKind::Truck))),
        vans: unique_by_id(repo.list_packages(&PackageFilter::Kind(VehicleKind::Van))),
    }
}
