//! Entity store for vehicles and packages

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use fleet_types::{
    AddressUpdate, Error, NewVehicle, Package, PackageFilter, PackageStatus, Result, Vehicle,
    VehicleKind, VehicleRef,
};

use fleet_domain::repository::{FleetRepository, FleetSnapshot};

use crate::notifier::{ChangeNotifier, Channel, Subscription};
use crate::seed;
use crate::traits::StoragePort;

/// Storage key of the package collection
pub const PACKAGES_KEY: &str = "packages";

/// Sole reader and writer of the fleet collections.
///
/// Every mutation is one read-modify-persist-notify cycle over a whole
/// collection. Reads never fail: a missing or unreadable collection is empty.
pub struct EntityStore<S: StoragePort> {
    storage: S,
    notifier: ChangeNotifier,
    bridge: Subscription,
}

impl<S: StoragePort> EntityStore<S> {
    /// Open a store, seeding empty storage with random content
    pub fn open(storage: S) -> Result<Self> {
        Self::open_with_rng(storage, &mut StdRng::from_entropy())
    }

    /// Open a store with reproducible seed data
    pub fn open_seeded(storage: S, seed: u64) -> Result<Self> {
        Self::open_with_rng(storage, &mut StdRng::seed_from_u64(seed))
    }

    pub fn open_with_rng<R: Rng + ?Sized>(storage: S, rng: &mut R) -> Result<Self> {
        Self::open_with_notifier(storage, ChangeNotifier::new(), rng)
    }

    /// Open a store that broadcasts on an existing notifier
    pub fn open_with_notifier<R: Rng + ?Sized>(
        storage: S,
        notifier: ChangeNotifier,
        rng: &mut R,
    ) -> Result<Self> {
        seed::initialize(&storage, rng)?;

        let cross_process = notifier.clone();
        let bridge = storage.subscribe(Rc::new(move || {
            cross_process.publish(Channel::CrossProcess);
        }));

        Ok(Self {
            storage,
            notifier,
            bridge,
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Register a listener for local and cross-process changes
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.storage.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "unreadable collection, treating as empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read collection");
                Vec::new()
            }
        }
    }

    fn persist<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.storage.set(key, &raw)
    }

    fn notify(&self) {
        self.notifier.publish(Channel::Local);
    }

    /// All vehicles of `kind` in insertion order
    pub fn list_vehicles(&self, kind: VehicleKind) -> Vec<Vehicle> {
        self.load(kind.storage_key())
    }

    pub fn get_vehicle(&self, kind: VehicleKind, id: &str) -> Option<Vehicle> {
        self.list_vehicles(kind).into_iter().find(|v| v.id == id)
    }

    /// Create a vehicle and `initial_package_count` pending placeholder
    /// packages assigned to it.
    ///
    /// Name uniqueness is not checked here, only on rename.
    pub fn add_vehicle(&self, kind: VehicleKind, request: NewVehicle) -> Result<Vehicle> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name is required".to_string()));
        }
        if request.capacity < 1 {
            return Err(Error::Validation(
                "Capacity must be at least 1".to_string(),
            ));
        }
        if request.initial_package_count > request.capacity {
            return Err(Error::Validation(
                "Current packages cannot exceed capacity".to_string(),
            ));
        }

        let vehicle = Vehicle::new(kind, name.to_string(), request.capacity);
        let mut vehicles = self.list_vehicles(kind);
        vehicles.push(vehicle.clone());
        self.persist(kind.storage_key(), &vehicles)?;

        if request.initial_package_count > 0 {
            let vehicle_ref = VehicleRef::new(kind, vehicle.id.clone());
            let mut packages = self.list_packages(&PackageFilter::All);
            packages.extend(
                (0..request.initial_package_count).map(|_| initial_placeholder(&vehicle_ref)),
            );
            self.persist(PACKAGES_KEY, &packages)?;
        }

        debug!(
            %kind,
            id = %vehicle.id,
            capacity = vehicle.capacity,
            initial_packages = request.initial_package_count,
            "vehicle added"
        );
        self.notify();
        Ok(vehicle)
    }

    /// Rename a vehicle; names are unique per kind, case-insensitively
    pub fn rename_vehicle(&self, kind: VehicleKind, id: &str, new_name: &str) -> Result<Vehicle> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name cannot be empty".to_string()));
        }

        let mut vehicles = self.list_vehicles(kind);
        let lowered = name.to_lowercase();
        if vehicles
            .iter()
            .any(|v| v.id != id && v.name.to_lowercase() == lowered)
        {
            return Err(Error::Conflict("Name already exists".to_string()));
        }

        let vehicle = vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| Error::NotFound(format!("{} not found", kind.label())))?;
        vehicle.name = name.to_string();
        let renamed = vehicle.clone();

        self.persist(kind.storage_key(), &vehicles)?;
        debug!(%kind, id, name, "vehicle renamed");
        self.notify();
        Ok(renamed)
    }

    /// Packages matching `filter`, in insertion order
    pub fn list_packages(&self, filter: &PackageFilter) -> Vec<Package> {
        let packages: Vec<Package> = self.load(PACKAGES_KEY);
        match filter {
            PackageFilter::All => packages,
            _ => packages.into_iter().filter(|p| filter.matches(p)).collect(),
        }
    }

    pub fn get_package(&self, id: &str) -> Option<Package> {
        self.list_packages(&PackageFilter::All)
            .into_iter()
            .find(|p| p.id == id)
    }

    /// Append one placeholder package to `vehicle`.
    ///
    /// Capacity is not enforced here; callers check before adding.
    pub fn add_package(&self, vehicle: &VehicleRef) -> Result<Package> {
        let package = placeholder(vehicle);
        let mut packages = self.list_packages(&PackageFilter::All);
        packages.push(package.clone());
        self.persist(PACKAGES_KEY, &packages)?;

        debug!(id = %package.id, kind = %vehicle.kind, vehicle = %vehicle.id, "package added");
        self.notify();
        Ok(package)
    }

    /// Remove the most recently added package of `vehicle`.
    ///
    /// Returns `false` without notifying when the vehicle has none.
    pub fn remove_package(&self, vehicle: &VehicleRef) -> Result<bool> {
        let mut packages = self.list_packages(&PackageFilter::All);
        let Some(index) = packages.iter().rposition(|p| p.belongs_to(vehicle)) else {
            return Ok(false);
        };

        let removed = packages.remove(index);
        self.persist(PACKAGES_KEY, &packages)?;
        debug!(id = %removed.id, kind = %vehicle.kind, vehicle = %vehicle.id, "package removed");
        self.notify();
        Ok(true)
    }

    fn update_package(&self, id: &str, change: impl FnOnce(&mut Package)) -> Result<Package> {
        let mut packages = self.list_packages(&PackageFilter::All);
        let package = packages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound("Package not found".to_string()))?;
        change(package);
        let updated = package.clone();

        self.persist(PACKAGES_KEY, &packages)?;
        self.notify();
        Ok(updated)
    }

    pub fn update_package_recipient(&self, id: &str, recipient_name: &str) -> Result<Package> {
        let updated = self.update_package(id, |p| p.recipient_name = recipient_name.to_string())?;
        debug!(id, "package recipient updated");
        Ok(updated)
    }

    /// Merge the supplied address fields; omitted fields keep their values
    pub fn update_package_address(&self, id: &str, address: &AddressUpdate) -> Result<Package> {
        let updated = self.update_package(id, |p| address.apply(p))?;
        debug!(id, "package address updated");
        Ok(updated)
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            trucks: self.list_vehicles(VehicleKind::Truck),
            vans: self.list_vehicles(VehicleKind::Van),
            packages: self.list_packages(&PackageFilter::All),
        }
    }
}

impl<S: StoragePort> FleetRepository for EntityStore<S> {
    fn list_vehicles(&self, kind: VehicleKind) -> Vec<Vehicle> {
        EntityStore::list_vehicles(self, kind)
    }

    fn get_vehicle(&self, kind: VehicleKind, id: &str) -> Option<Vehicle> {
        EntityStore::get_vehicle(self, kind, id)
    }

    fn list_packages(&self, filter: &PackageFilter) -> Vec<Package> {
        EntityStore::list_packages(self, filter)
    }

    fn get_package(&self, id: &str) -> Option<Package> {
        EntityStore::get_package(self, id)
    }

    fn add_package(&self, vehicle: &VehicleRef) -> Result<Package> {
        EntityStore::add_package(self, vehicle)
    }

    fn remove_package(&self, vehicle: &VehicleRef) -> Result<bool> {
        EntityStore::remove_package(self, vehicle)
    }

    fn update_package_recipient(&self, id: &str, recipient_name: &str) -> Result<Package> {
        EntityStore::update_package_recipient(self, id, recipient_name)
    }

    fn update_package_address(&self, id: &str, address: &AddressUpdate) -> Result<Package> {
        EntityStore::update_package_address(self, id, address)
    }

    fn snapshot(&self) -> FleetSnapshot {
        EntityStore::snapshot(self)
    }
}

impl<S: StoragePort> Drop for EntityStore<S> {
    fn drop(&mut self) {
        self.bridge.unsubscribe();
    }
}

fn new_package_id() -> String {
    format!("pkg-{}", uuid::Uuid::new_v4())
}

/// Package created by a single add
fn placeholder(vehicle: &VehicleRef) -> Package {
    let address = AddressUpdate::default()
        .address_1("TBD")
        .city("TBD")
        .state("TBD")
        .zip("00000");
    Package::new(new_package_id(), vehicle, PackageStatus::Pending)
        .with_recipient("New Recipient")
        .with_address(&address)
}

/// Package created alongside a new vehicle
fn initial_placeholder(vehicle: &VehicleRef) -> Package {
    let address = AddressUpdate::default()
        .address_1("123 New St")
        .city("City")
        .state("ST")
        .zip("00000");
    Package::new(new_package_id(), vehicle, PackageStatus::Pending)
        .with_recipient("New Recipient")
        .with_address(&address)
}
