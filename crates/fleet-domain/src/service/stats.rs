//! Capacity and utilization rollups

use serde::{Deserialize, Serialize};

use fleet_types::{Package, Vehicle, VehicleKind};

use crate::repository::FleetSnapshot;

/// Percentage of `capacity` used by `packages`; 0 when capacity is 0
pub fn utilization_percent(packages: u64, capacity: u64) -> f64 {
    if capacity > 0 {
        (packages as f64 / capacity as f64) * 100.0
    } else {
        0.0
    }
}

/// Fleet-wide capacity and package counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub total_capacity: u64,
    pub total_packages: u64,
    pub truck_capacity: u64,
    pub truck_packages: u64,
    pub van_capacity: u64,
    pub van_packages: u64,
}

impl FleetStats {
    pub fn compute(trucks: &[Vehicle], vans: &[Vehicle], packages: &[Package]) -> Self {
        let capacity = |vehicles: &[Vehicle]| -> u64 {
            vehicles.iter().map(|v| u64::from(v.capacity)).sum()
        };
        let assigned = |kind: VehicleKind| -> u64 {
            packages
                .iter()
                .filter(|p| p.vehicle_id(kind).is_some())
                .count() as u64
        };

        let truck_capacity = capacity(trucks);
        let van_capacity = capacity(vans);
        let truck_packages = assigned(VehicleKind::Truck);
        let van_packages = assigned(VehicleKind::Van);

        Self {
            total_capacity: truck_capacity + van_capacity,
            total_packages: truck_packages + van_packages,
            truck_capacity,
            truck_packages,
            van_capacity,
            van_packages,
        }
    }

    pub fn from_snapshot(snapshot: &FleetSnapshot) -> Self {
        Self::compute(&snapshot.trucks, &snapshot.vans, &snapshot.packages)
    }

    pub fn capacity(&self, kind: VehicleKind) -> u64 {
        match kind {
            VehicleKind::Truck => self.truck_capacity,
            VehicleKind::Van => self.van_capacity,
        }
    }

    pub fn packages(&self, kind: VehicleKind) -> u64 {
        match kind {
            VehicleKind::Truck => self.truck_packages,
            VehicleKind::Van => self.van_packages,
        }
    }

    pub fn utilization(&self, kind: VehicleKind) -> f64 {
        utilization_percent(self.packages(kind), self.capacity(kind))
    }

    pub fn total_utilization(&self) -> f64 {
        utilization_percent(self.total_packages, self.total_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_types::{PackageStatus, VehicleRef};
    use proptest::prelude::*;

    fn vehicle(id: &str, capacity: u32) -> Vehicle {
        Vehicle::with_id(id.to_string(), id.to_string(), capacity)
    }

    fn package(n: usize, vehicle: &VehicleRef) -> Package {
        Package::new(format!("pkg-{}", n), vehicle, PackageStatus::Pending)
    }

    #[test]
    fn test_utilization_zero_capacity() {
        let pct = utilization_percent(0, 0);
        assert_eq!(pct, 0.0);
        assert!(!pct.is_nan());
        assert_eq!(utilization_percent(7, 0), 0.0);
    }

    #[test]
    fn test_utilization_percentage() {
        assert!((utilization_percent(24, 100) - 24.0).abs() < 1e-9);
        assert!((utilization_percent(1, 3) - 33.333).abs() < 0.001);
    }

    #[test]
    fn test_compute_seed_shape() {
        let trucks: Vec<_> = (1..=5).map(|n| vehicle(&format!("truck-{}", n), 100)).collect();
        let vans: Vec<_> = (1..=5).map(|n| vehicle(&format!("van-{}", n), 50)).collect();
        let mut packages = Vec::new();
        for truck in &trucks {
            let vref = VehicleRef::truck(truck.id.clone());
            packages.extend((0..24).map(|n| package(n, &vref)));
        }
        for van in &vans {
            let vref = VehicleRef::van(van.id.clone());
            packages.extend((0..20).map(|n| package(n, &vref)));
        }

        let stats = FleetStats::compute(&trucks, &vans, &packages);
        assert_eq!(stats.truck_capacity, 500);
        assert_eq!(stats.van_capacity, 250);
        assert_eq!(stats.total_capacity, 750);
        assert_eq!(stats.truck_packages, 120);
        assert_eq!(stats.van_packages, 100);
        assert_eq!(stats.total_packages, 220);
        assert!((stats.utilization(VehicleKind::Truck) - 24.0).abs() < 1e-9);
        assert!((stats.utilization(VehicleKind::Van) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_snapshot_matches_compute() {
        let trucks = vec![vehicle("truck-1", 10)];
        let vans = vec![vehicle("van-1", 5)];
        let packages = vec![
            package(1, &VehicleRef::truck("truck-1")),
            package(2, &VehicleRef::van("van-1")),
        ];
        let snapshot = FleetSnapshot {
            trucks: trucks.clone(),
            vans: vans.clone(),
            packages: packages.clone(),
        };

        let stats = FleetStats::from_snapshot(&snapshot);
        assert_eq!(stats, FleetStats::compute(&trucks, &vans, &packages));
        assert_eq!(stats.total_capacity, 15);
        assert_eq!(stats.total_packages, 2);
    }

    #[test]
    fn test_compute_empty_fleet() {
        let stats = FleetStats::compute(&[], &[], &[]);
        assert_eq!(stats, FleetStats::default());
        assert_eq!(stats.total_utilization(), 0.0);
    }

    #[test]
    fn test_orphan_packages_still_counted() {
        // Packages referencing vehicles that do not exist count by foreign key
        let packages = vec![package(1, &VehicleRef::van("van-gone"))];
        let stats = FleetStats::compute(&[], &[], &packages);
        assert_eq!(stats.van_packages, 1);
        assert_eq!(stats.total_utilization(), 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(FleetStats::default()).unwrap();
        assert!(json.get("totalCapacity").is_some());
        assert!(json.get("vanPackages").is_some());
    }

    proptest! {
        #[test]
        fn prop_totals_are_sums(
            truck_caps in proptest::collection::vec(0u32..500, 0..8),
            van_caps in proptest::collection::vec(0u32..500, 0..8),
            assignments in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let trucks: Vec<_> = truck_caps.iter().enumerate()
                .map(|(i, c)| vehicle(&format!("truck-{}", i), *c)).collect();
            let vans: Vec<_> = van_caps.iter().enumerate()
                .map(|(i, c)| vehicle(&format!("van-{}", i), *c)).collect();
            let packages: Vec<_> = assignments.iter().enumerate()
                .map(|(i, to_truck)| {
                    let vref = if *to_truck { VehicleRef::truck("t") } else { VehicleRef::van("v") };
                    package(i, &vref)
                })
                .collect();

            let stats = FleetStats::compute(&trucks, &vans, &packages);
            prop_assert_eq!(stats.total_packages, stats.truck_packages + stats.van_packages);
            prop_assert_eq!(stats.total_capacity, stats.truck_capacity + stats.van_capacity);
            prop_assert!(!stats.total_utilization().is_nan());
            prop_assert!(!stats.utilization(VehicleKind::Truck).is_nan());
            prop_assert!(!stats.utilization(VehicleKind::Van).is_nan());
        }
    }
}
