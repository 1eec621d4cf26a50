//! Per-vehicle load and capacity rules

use std::collections::HashSet;

use serde::Serialize;

use fleet_types::{Error, Package, Result, Vehicle, VehicleKind};

use super::stats::utilization_percent;

/// A vehicle together with its derived package count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleLoad {
    pub kind: VehicleKind,
    pub vehicle: Vehicle,
    pub package_count: usize,
    pub utilization_percent: f64,
}

impl VehicleLoad {
    pub fn new(kind: VehicleKind, vehicle: Vehicle, package_count: usize) -> Self {
        let utilization_percent =
            utilization_percent(package_count as u64, u64::from(vehicle.capacity));
        Self {
            kind,
            vehicle,
            package_count,
            utilization_percent,
        }
    }

    pub fn is_full(&self) -> bool {
        self.package_count >= self.vehicle.capacity as usize
    }

    /// Packages that still fit
    pub fn remaining(&self) -> usize {
        (self.vehicle.capacity as usize).saturating_sub(self.package_count)
    }
}

/// Pair every vehicle with the number of packages assigned to it
pub fn vehicle_loads(kind: VehicleKind, vehicles: &[Vehicle], packages: &[Package]) -> Vec<VehicleLoad> {
    vehicles
        .iter()
        .map(|vehicle| {
            let count = packages
                .iter()
                .filter(|p| p.vehicle_id(kind) == Some(vehicle.id.as_str()))
                .count();
            VehicleLoad::new(kind, vehicle.clone(), count)
        })
        .collect()
}

/// Refuse to add a package to a full vehicle
pub fn check_can_add(load: &VehicleLoad) -> Result<()> {
    if load.is_full() {
        return Err(Error::CapacityReached(format!(
            "This {} is already full.",
            load.kind
        )));
    }
    Ok(())
}

/// Drop repeated package ids, keeping the first occurrence
pub fn unique_by_id(packages: Vec<Package>) -> Vec<Package> {
    let mut seen = HashSet::new();
    packages
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_types::{PackageStatus, VehicleRef};

    fn truck(id: &str, capacity: u32) -> Vehicle {
        Vehicle::with_id(id.to_string(), id.to_string(), capacity)
    }

    fn pkg(id: &str, vehicle: &VehicleRef) -> Package {
        Package::new(id.to_string(), vehicle, PackageStatus::Pending)
    }

    #[test]
    fn test_vehicle_loads_counts_per_vehicle() {
        let trucks = vec![truck("truck-1", 2), truck("truck-2", 4)];
        let packages = vec![
            pkg("a", &VehicleRef::truck("truck-1")),
            pkg("b", &VehicleRef::truck("truck-1")),
            pkg("c", &VehicleRef::truck("truck-2")),
            pkg("d", &VehicleRef::van("truck-2")),
        ];

        let loads = vehicle_loads(VehicleKind::Truck, &trucks, &packages);
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].package_count, 2);
        assert!(loads[0].is_full());
        assert_eq!(loads[1].package_count, 1);
        assert_eq!(loads[1].remaining(), 3);
        assert!((loads[1].utilization_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_check_can_add_full_vehicle() {
        let load = VehicleLoad::new(VehicleKind::Van, truck("van-1", 1), 1);
        let err = check_can_add(&load).unwrap_err();
        assert!(matches!(err, Error::CapacityReached(_)));
        assert_eq!(err.to_string(), "This van is already full.");
    }

    #[test]
    fn test_check_can_add_with_room() {
        let load = VehicleLoad::new(VehicleKind::Truck, truck("truck-1", 3), 2);
        assert!(check_can_add(&load).is_ok());
    }

    #[test]
    fn test_over_capacity_counts_as_full() {
        let load = VehicleLoad::new(VehicleKind::Truck, truck("truck-1", 1), 3);
        assert!(load.is_full());
        assert_eq!(load.remaining(), 0);
    }

    #[test]
    fn test_unique_by_id_keeps_first() {
        let vref = VehicleRef::truck("truck-1");
        let mut dup = pkg("a", &vref);
        dup.recipient_name = "second".to_string();
        let packages = vec![pkg("a", &vref), pkg("b", &vref), dup];

        let unique = unique_by_id(packages);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].recipient_name, "");
    }
}
