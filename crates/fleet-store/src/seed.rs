//! Starter data for empty storage

use rand::Rng;
use tracing::info;

use fleet_types::{
    AddressUpdate, Package, PackageStatus, Result, Vehicle, VehicleKind, VehicleRef,
};

use crate::entity::PACKAGES_KEY;
use crate::traits::StoragePort;

pub const VEHICLES_PER_KIND: usize = 5;
pub const TRUCK_CAPACITY: u32 = 100;
pub const VAN_CAPACITY: u32 = 50;
pub const PACKAGES_PER_TRUCK: usize = 24;
pub const PACKAGES_PER_VAN: usize = 20;

/// Generated starter collections
#[derive(Debug, Clone)]
pub struct SeedData {
    pub trucks: Vec<Vehicle>,
    pub vans: Vec<Vehicle>,
    pub packages: Vec<Package>,
}

fn seed_vehicles(kind: VehicleKind, capacity: u32) -> Vec<Vehicle> {
    (1..=VEHICLES_PER_KIND)
        .map(|n| {
            Vehicle::with_id(
                format!("{}-{}", kind.id_prefix(), n),
                format!("{} {}", kind.label(), n),
                capacity,
            )
        })
        .collect()
}

fn random_status<R: Rng + ?Sized>(rng: &mut R) -> PackageStatus {
    PackageStatus::ALL[rng.gen_range(0..PackageStatus::ALL.len())]
}

/// Build the starter fleet: 5 trucks with 24 packages each, then 5 vans
/// with 20 packages each. Package ids run `pkg-1` upward across both.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> SeedData {
    let trucks = seed_vehicles(VehicleKind::Truck, TRUCK_CAPACITY);
    let vans = seed_vehicles(VehicleKind::Van, VAN_CAPACITY);

    let mut packages = Vec::with_capacity(
        trucks.len() * PACKAGES_PER_TRUCK + vans.len() * PACKAGES_PER_VAN,
    );
    let mut next_id = 1;

    for truck in &trucks {
        let vehicle = VehicleRef::truck(truck.id.clone());
        for _ in 0..PACKAGES_PER_TRUCK {
            let address = AddressUpdate::default()
                .address_1(format!("{} Logistics Blvd", rng.gen_range(1..=999)))
                .address_2("")
                .city("Memphis")
                .state("TN")
                .zip("38120");
            let status = random_status(rng);
            packages.push(
                Package::new(format!("pkg-{}", next_id), &vehicle, status)
                    .with_recipient(format!("Recipient {}", next_id + 1))
                    .with_address(&address),
            );
            next_id += 1;
        }
    }

    for van in &vans {
        let vehicle = VehicleRef::van(van.id.clone());
        for _ in 0..PACKAGES_PER_VAN {
            let address = AddressUpdate::default()
                .address_1(format!("{} Delivery Ln", rng.gen_range(1..=999)))
                .address_2(format!("Apt {}", rng.gen_range(1..=20)))
                .city("Los Angeles")
                .state("CA")
                .zip("90001");
            let status = random_status(rng);
            packages.push(
                Package::new(format!("pkg-{}", next_id), &vehicle, status)
                    .with_recipient(format!("Recipient {}", next_id + 1))
                    .with_address(&address),
            );
            next_id += 1;
        }
    }

    SeedData {
        trucks,
        vans,
        packages,
    }
}

/// Whether any of the three collections has never been written.
/// A persisted empty list counts as written.
pub fn needs_seed<S: StoragePort + ?Sized>(storage: &S) -> Result<bool> {
    let keys = [
        VehicleKind::Truck.storage_key(),
        VehicleKind::Van.storage_key(),
        PACKAGES_KEY,
    ];
    for key in keys {
        if storage.get(key)?.is_none() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Write the starter fleet if any collection is missing.
///
/// All three collections are replaced together. Returns whether seeding ran.
pub fn initialize<S, R>(storage: &S, rng: &mut R) -> Result<bool>
where
    S: StoragePort + ?Sized,
    R: Rng + ?Sized,
{
    if !needs_seed(storage)? {
        return Ok(false);
    }

    let data = generate(rng);
    storage.set(
        VehicleKind::Truck.storage_key(),
        &serde_json::to_string(&data.trucks)?,
    )?;
    storage.set(
        VehicleKind::Van.storage_key(),
        &serde_json::to_string(&data.vans)?,
    )?;
    storage.set(PACKAGES_KEY, &serde_json::to_string(&data.packages)?)?;

    info!(
        trucks = data.trucks.len(),
        vans = data.vans.len(),
        packages = data.packages.len(),
        "seeded empty storage"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_shape() {
        let data = generate(&mut StdRng::seed_from_u64(7));
        assert_eq!(data.trucks.len(), 5);
        assert_eq!(data.vans.len(), 5);
        assert!(data.trucks.iter().all(|t| t.capacity == 100));
        assert!(data.vans.iter().all(|v| v.capacity == 50));
        assert_eq!(data.packages.len(), 220);
        assert_eq!(data.trucks[0].id, "truck-1");
        assert_eq!(data.vans[4].name, "Van 5");
    }

    #[test]
    fn test_generate_distributes_packages() {
        let data = generate(&mut StdRng::seed_from_u64(7));
        for truck in &data.trucks {
            let count = data
                .packages
                .iter()
                .filter(|p| p.truck_id.as_deref() == Some(truck.id.as_str()))
                .count();
            assert_eq!(count, 24);
        }
        for van in &data.vans {
            let count = data
                .packages
                .iter()
                .filter(|p| p.van_id.as_deref() == Some(van.id.as_str()))
                .count();
            assert_eq!(count, 20);
        }
        assert!(data
            .packages
            .iter()
            .all(|p| p.truck_id.is_some() != p.van_id.is_some()));
    }

    #[test]
    fn test_generate_package_fields() {
        let data = generate(&mut StdRng::seed_from_u64(1));
        let first = &data.packages[0];
        assert_eq!(first.id, "pkg-1");
        assert_eq!(first.recipient_name, "Recipient 2");
        assert_eq!(first.city, "Memphis");
        assert!(first.address_1.ends_with("Logistics Blvd"));
        assert_eq!(first.address_2, "");

        let last = &data.packages[219];
        assert_eq!(last.id, "pkg-220");
        assert_eq!(last.state, "CA");
        assert!(last.address_2.starts_with("Apt "));
    }

    #[test]
    fn test_generate_is_reproducible_with_seed() {
        let a = generate(&mut StdRng::seed_from_u64(42));
        let b = generate(&mut StdRng::seed_from_u64(42));
        let statuses = |d: &SeedData| d.packages.iter().map(|p| p.status).collect::<Vec<_>>();
        let streets = |d: &SeedData| d.packages.iter().map(|p| p.address_1.clone()).collect::<Vec<_>>();
        assert_eq!(statuses(&a), statuses(&b));
        assert_eq!(streets(&a), streets(&b));
    }

    #[test]
    fn test_initialize_skips_when_all_present() {
        let storage = MemoryStorage::new();
        storage.set("trucks", "[]").unwrap();
        storage.set("vans", "[]").unwrap();
        storage.set("packages", "[]").unwrap();

        assert!(!initialize(&storage, &mut StdRng::seed_from_u64(0)).unwrap());
        assert_eq!(storage.get("trucks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_initialize_reseeds_when_one_missing() {
        let storage = MemoryStorage::new();
        storage.set("trucks", "[]").unwrap();
        storage.set("vans", "[]").unwrap();

        assert!(initialize(&storage, &mut StdRng::seed_from_u64(0)).unwrap());
        let trucks: Vec<Vehicle> =
            serde_json::from_str(&storage.get("trucks").unwrap().unwrap()).unwrap();
        assert_eq!(trucks.len(), 5);
    }
}
