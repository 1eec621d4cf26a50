//! Fleet records and request types

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Vehicle kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Truck,
    Van,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 2] = [VehicleKind::Truck, VehicleKind::Van];

    /// Prefix used for generated vehicle ids (`truck-…`, `van-…`)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            VehicleKind::Truck => "truck",
            VehicleKind::Van => "van",
        }
    }

    /// Storage key of the collection holding this kind
    pub fn storage_key(&self) -> &'static str {
        match self {
            VehicleKind::Truck => "trucks",
            VehicleKind::Van => "vans",
        }
    }

    /// Capitalized display label
    pub fn label(&self) -> &'static str {
        match self {
            VehicleKind::Truck => "Truck",
            VehicleKind::Van => "Van",
        }
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id_prefix())
    }
}

/// A truck or van
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier, namespaced by kind
    pub id: String,
    /// Human-readable label
    pub name: String,
    /// Maximum number of packages the vehicle may hold
    pub capacity: u32,
    /// When created
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Create a vehicle with a freshly generated id
    pub fn new(kind: VehicleKind, name: String, capacity: u32) -> Self {
        Self::with_id(
            format!("{}-{}", kind.id_prefix(), uuid::Uuid::new_v4()),
            name,
            capacity,
        )
    }

    pub fn with_id(id: String, name: String, capacity: u32) -> Self {
        Self {
            id,
            name,
            capacity,
            created_at: Utc::now(),
        }
    }
}

/// Delivery status of a package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
}

impl PackageStatus {
    pub const ALL: [PackageStatus; 3] = [
        PackageStatus::Pending,
        PackageStatus::InTransit,
        PackageStatus::Delivered,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PackageStatus::Pending => "pending",
            PackageStatus::InTransit => "in-transit",
            PackageStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to a single vehicle, the `{truck_id | van_id}` union
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleRef {
    pub kind: VehicleKind,
    pub id: String,
}

impl VehicleRef {
    pub fn new(kind: VehicleKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn truck(id: impl Into<String>) -> Self {
        Self::new(VehicleKind::Truck, id)
    }

    pub fn van(id: impl Into<String>) -> Self {
        Self::new(VehicleKind::Van, id)
    }
}

/// A package assigned to at most one vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    #[serde(default)]
    pub truck_id: Option<String>,
    #[serde(default)]
    pub van_id: Option<String>,
    #[serde(default)]
    pub status: PackageStatus,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    pub created_at: DateTime<Utc>,
}

impl Package {
    /// Create a package with empty business fields assigned to `vehicle`
    pub fn new(id: String, vehicle: &VehicleRef, status: PackageStatus) -> Self {
        let (truck_id, van_id) = match vehicle.kind {
            VehicleKind::Truck => (Some(vehicle.id.clone()), None),
            VehicleKind::Van => (None, Some(vehicle.id.clone())),
        };
        Self {
            id,
            truck_id,
            van_id,
            status,
            recipient_name: String::new(),
            address_1: String::new(),
            address_2: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_recipient(mut self, recipient_name: impl Into<String>) -> Self {
        self.recipient_name = recipient_name.into();
        self
    }

    pub fn with_address(mut self, address: &AddressUpdate) -> Self {
        address.apply(&mut self);
        self
    }

    /// Foreign key for the given kind, if set
    pub fn vehicle_id(&self, kind: VehicleKind) -> Option<&str> {
        match kind {
            VehicleKind::Truck => self.truck_id.as_deref(),
            VehicleKind::Van => self.van_id.as_deref(),
        }
    }

    /// Whether this package is assigned to `vehicle`
    pub fn belongs_to(&self, vehicle: &VehicleRef) -> bool {
        self.vehicle_id(vehicle.kind) == Some(vehicle.id.as_str())
    }
}

/// Input for creating a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub initial_package_count: u32,
}

impl NewVehicle {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            initial_package_count: 0,
        }
    }

    pub fn with_initial_packages(mut self, count: u32) -> Self {
        self.initial_package_count = count;
        self
    }
}

/// Partial address change; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl AddressUpdate {
    pub fn address_1(mut self, value: impl Into<String>) -> Self {
        self.address_1 = Some(value.into());
        self
    }

    pub fn address_2(mut self, value: impl Into<String>) -> Self {
        self.address_2 = Some(value.into());
        self
    }

    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }

    pub fn state(mut self, value: impl Into<String>) -> Self {
        self.state = Some(value.into());
        self
    }

    pub fn zip(mut self, value: impl Into<String>) -> Self {
        self.zip = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.address_1.is_none()
            && self.address_2.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
    }

    /// Shallow merge into `package`
    pub fn apply(&self, package: &mut Package) {
        let fields = [
            (&self.address_1, &mut package.address_1),
            (&self.address_2, &mut package.address_2),
            (&self.city, &mut package.city),
            (&self.state, &mut package.state),
            (&self.zip, &mut package.zip),
        ];
        for (update, target) in fields {
            if let Some(value) = update {
                target.clone_from(value);
            }
        }
    }
}

/// Package selection for listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PackageFilter {
    #[default]
    All,
    /// Packages assigned to one vehicle
    Vehicle(VehicleRef),
    /// Packages whose foreign key for this kind is set
    Kind(VehicleKind),
}

impl PackageFilter {
    pub fn matches(&self, package: &Package) -> bool {
        match self {
            PackageFilter::All => true,
            PackageFilter::Vehicle(vehicle) => package.belongs_to(vehicle),
            PackageFilter::Kind(kind) => package.vehicle_id(*kind).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_status_serializes_kebab_case() {
        let json = serde_json::to_string(&PackageStatus::InTransit).unwrap();
        assert_eq!(json, "\"in-transit\"");
        let parsed: PackageStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, PackageStatus::Delivered);
    }

    #[test]
    fn test_vehicle_new_namespaces_id() {
        let truck = Vehicle::new(VehicleKind::Truck, "Truck 1".to_string(), 10);
        let van = Vehicle::new(VehicleKind::Van, "Van 1".to_string(), 10);
        assert!(truck.id.starts_with("truck-"));
        assert!(van.id.starts_with("van-"));
    }

    #[test]
    fn test_package_keeps_foreign_keys_exclusive() {
        let pkg = Package::new("pkg-1".to_string(), &VehicleRef::van("van-1"), PackageStatus::Pending);
        assert_eq!(pkg.truck_id, None);
        assert_eq!(pkg.van_id.as_deref(), Some("van-1"));
        assert!(pkg.belongs_to(&VehicleRef::van("van-1")));
        assert!(!pkg.belongs_to(&VehicleRef::truck("van-1")));
    }

    #[test]
    fn test_address_update_is_shallow_merge() {
        let mut pkg = Package::new("pkg-1".to_string(), &VehicleRef::truck("truck-1"), PackageStatus::Pending)
            .with_address(&AddressUpdate::default().city("Las Vegas").state("NV").zip("89101"));

        AddressUpdate::default().city("Reno").apply(&mut pkg);

        assert_eq!(pkg.city, "Reno");
        assert_eq!(pkg.state, "NV");
        assert_eq!(pkg.zip, "89101");
    }

    #[test]
    fn test_package_filter_kind() {
        let truck_pkg = Package::new("a".to_string(), &VehicleRef::truck("truck-1"), PackageStatus::Pending);
        let van_pkg = Package::new("b".to_string(), &VehicleRef::van("van-1"), PackageStatus::Pending);
        let filter = PackageFilter::Kind(VehicleKind::Truck);
        assert!(filter.matches(&truck_pkg));
        assert!(!filter.matches(&van_pkg));
        assert!(PackageFilter::All.matches(&van_pkg));
    }

    #[test]
    fn test_package_deserializes_null_foreign_key() {
        let json = r#"{"id":"pkg-1","truck_id":null,"van_id":"van-2","status":"pending",
            "recipient_name":"R","address_1":"","address_2":"","city":"","state":"","zip":"",
            "created_at":"2024-01-01T00:00:00Z"}"#;
        let pkg: Package = serde_json::from_str(json).unwrap();
        assert_eq!(pkg.truck_id, None);
        assert_eq!(pkg.vehicle_id(VehicleKind::Van), Some("van-2"));
    }
}
