//! CLI definition using clap

use clap::{Args, Parser, Subcommand};
use fleet_types::{OutputFormat, VehicleKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleet-manager")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Manage a fleet of trucks and vans and the packages they carry")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Data directory override. Uses config value if not specified.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List vehicles of a kind with their load
    List {
        kind: VehicleKind,
    },

    /// Show one vehicle and its packages
    Show {
        kind: VehicleKind,
        id: String,
    },

    /// Add a vehicle
    Add {
        kind: VehicleKind,

        /// Display name, unique within the kind
        name: String,

        /// Maximum number of packages
        #[arg(long, short = 'c')]
        capacity: u32,

        /// Placeholder packages created with the vehicle
        #[arg(long, short = 'p', default_value = "0")]
        packages: u32,
    },

    /// Rename a vehicle
    Rename {
        kind: VehicleKind,
        id: String,
        name: String,
    },

    /// Load a placeholder package onto a vehicle
    Load {
        kind: VehicleKind,
        id: String,
    },

    /// Unload the most recently added package from a vehicle
    Unload {
        kind: VehicleKind,
        id: String,
    },

    /// List packages, grouped by vehicle kind
    Packages {
        /// Only packages carried by this kind
        #[arg(long, short = 'k')]
        kind: Option<VehicleKind>,

        /// Only packages of this vehicle (requires --kind)
        #[arg(long, requires = "kind")]
        vehicle: Option<String>,
    },

    /// Show one package
    Package {
        id: String,
    },

    /// Change a package's recipient name
    Recipient {
        id: String,
        name: String,
    },

    /// Change some or all of a package's address fields
    Address {
        id: String,

        #[command(flatten)]
        fields: AddressArgs,
    },

    /// Show fleet-wide capacity and utilization
    Stats,

    /// Re-print statistics whenever the data files change
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set seed for first-run sample data
        #[arg(long)]
        set_seed: Option<u64>,

        /// Set log level (trace, debug, info, warn, error)
        #[arg(long)]
        set_log_level: Option<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddressArgs {
    #[arg(long)]
    pub address_1: Option<String>,

    #[arg(long)]
    pub address_2: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_packages() {
        let cli = Cli::try_parse_from([
            "fleet-manager", "add", "truck", "Big Rig", "--capacity", "10", "--packages", "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                kind,
                name,
                capacity,
                packages,
            } => {
                assert_eq!(kind, VehicleKind::Truck);
                assert_eq!(name, "Big Rig");
                assert_eq!(capacity, 10);
                assert_eq!(packages, 3);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fleet-manager", "stats", "--format", "json", "-v"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.verbose);
    }

    #[test]
    fn test_vehicle_filter_requires_kind() {
        let result = Cli::try_parse_from(["fleet-manager", "packages", "--vehicle", "truck-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_address_fields_optional() {
        let cli = Cli::try_parse_from(["fleet-manager", "address", "pkg-1", "--city", "Reno"]).unwrap();
        match cli.command {
            Commands::Address { id, fields } => {
                assert_eq!(id, "pkg-1");
                assert_eq!(fields.city.as_deref(), Some("Reno"));
                assert!(fields.zip.is_none());
            }
            _ => panic!("expected address"),
        }
    }
}
