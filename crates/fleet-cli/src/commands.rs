//! Command handlers

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::cli::{AddressArgs, Cli, Commands};
use crate::output::{
    output_package, output_package_sections, output_packages, output_stats, output_vehicle_detail,
    output_vehicle_loads,
};
use fleet_app::app;
use fleet_app::config::{parse_log_level, Config};
use fleet_app::repository::open_entity_store;
use fleet_store::{EntityStore, FileStorage};
use fleet_types::{
    AddressUpdate, Error, NewVehicle, OutputFormat, PackageFilter, Result, VehicleKind, VehicleRef,
};
use tracing::{debug, warn, Level};

pub fn execute(cli: Cli) -> Result<()> {
    // Config edits must work even when the saved file is broken
    if let Commands::Config {
        show,
        set_data_dir,
        set_output,
        set_seed,
        set_log_level,
        reset,
    } = &cli.command
    {
        return cmd_config(
            &Config::config_path()?,
            *show,
            set_data_dir.clone(),
            *set_output,
            *set_seed,
            set_log_level.clone(),
            *reset,
        );
    }

    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir.clone());
    }

    init_logging(cli.verbose, &config);
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::List { kind } => {
            let store = open_entity_store(&config)?;
            output_vehicle_loads(output_format, *kind, &app::vehicle_loads(&store, *kind))
        }

        Commands::Show { kind, id } => cmd_show(&config, output_format, *kind, id),

        Commands::Add {
            kind,
            name,
            capacity,
            packages,
        } => cmd_add(&config, output_format, *kind, name, *capacity, *packages),

        Commands::Rename { kind, id, name } => cmd_rename(&config, output_format, *kind, id, name),

        Commands::Load { kind, id } => cmd_load(&config, output_format, VehicleRef::new(*kind, id.clone())),

        Commands::Unload { kind, id } => cmd_unload(&config, VehicleRef::new(*kind, id.clone())),

        Commands::Packages { kind, vehicle } => {
            cmd_packages(&config, output_format, *kind, vehicle.clone())
        }

        Commands::Package { id } => {
            let store = open_entity_store(&config)?;
            let package = store
                .get_package(id)
                .ok_or_else(|| Error::NotFound("Package not found".to_string()))?;
            output_package(output_format, &package)
        }

        Commands::Recipient { id, name } => {
            let store = open_entity_store(&config)?;
            let package =
                app::update_package_details(&store, id, Some(name.as_str()), &AddressUpdate::default())?;
            output_package(output_format, &package)
        }

        Commands::Address { id, fields } => cmd_address(&config, output_format, id, fields),

        Commands::Stats => {
            let store = open_entity_store(&config)?;
            output_stats(output_format, &app::fleet_stats(&store))
        }

        Commands::Watch { interval_ms } => cmd_watch(&config, output_format, *interval_ms),

        // Handled before loading
        Commands::Config { .. } => Ok(()),
    }
}

/// Install the stderr log subscriber; an unknown configured level falls back to warn
fn init_logging(verbose: bool, config: &Config) {
    let configured = config.log_level();
    let level = match (verbose, &configured) {
        (true, _) => Level::DEBUG,
        (false, Ok(level)) => *level,
        (false, Err(_)) => Level::WARN,
    };

    // Ignore a second install; only the first subscriber wins
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(e) = configured {
        warn!(error = %e, "using log level warn; fix with `fleet-manager config --set-log-level`");
    }
}

fn cmd_show(config: &Config, output_format: OutputFormat, kind: VehicleKind, id: &str) -> Result<()> {
    let store = open_entity_store(config)?;
    let detail = app::vehicle_detail(&store, kind, id)
        .ok_or_else(|| Error::NotFound(format!("{} not found", kind.label())))?;
    output_vehicle_detail(output_format, &detail)
}

fn cmd_add(
    config: &Config,
    output_format: OutputFormat,
    kind: VehicleKind,
    name: &str,
    capacity: u32,
    packages: u32,
) -> Result<()> {
    let store = open_entity_store(config)?;
    let vehicle = store.add_vehicle(
        kind,
        NewVehicle::new(name, capacity).with_initial_packages(packages),
    )?;

    if output_format == OutputFormat::Table {
        println!("Added {} {} ({})", kind, vehicle.name, vehicle.id);
        println!();
    }
    cmd_show(config, output_format, kind, &vehicle.id)
}

fn cmd_rename(
    config: &Config,
    output_format: OutputFormat,
    kind: VehicleKind,
    id: &str,
    name: &str,
) -> Result<()> {
    let store = open_entity_store(config)?;
    let old_name = store.get_vehicle(kind, id).map(|v| v.name);
    let vehicle = store.rename_vehicle(kind, id, name)?;

    match output_format {
        OutputFormat::Json => {
            let content = serde_json::to_string_pretty(&vehicle)?;
            println!("{}", content);
        }
        OutputFormat::Table => {
            println!(
                "Renamed {} {}: {} -> {}",
                kind,
                vehicle.id,
                old_name.unwrap_or_default(),
                vehicle.name
            );
        }
    }
    Ok(())
}

fn cmd_load(config: &Config, output_format: OutputFormat, vehicle: VehicleRef) -> Result<()> {
    let store = open_entity_store(config)?;
    let package = app::load_package(&store, &vehicle)?;

    if output_format == OutputFormat::Json {
        return output_package(output_format, &package);
    }

    if let Some(detail) = app::vehicle_detail(&store, vehicle.kind, &vehicle.id) {
        println!(
            "Loaded {} onto {} ({}/{})",
            package.id, detail.load.vehicle.name, detail.load.package_count, detail.load.vehicle.capacity
        );
    }
    Ok(())
}

fn cmd_unload(config: &Config, vehicle: VehicleRef) -> Result<()> {
    let store = open_entity_store(config)?;
    if app::unload_package(&store, &vehicle)? {
        let remaining = store.list_packages(&PackageFilter::Vehicle(vehicle.clone())).len();
        println!("Unloaded one package from {} ({} left)", vehicle.id, remaining);
    } else {
        println!("{} {} has no packages", vehicle.kind.label(), vehicle.id);
    }
    Ok(())
}

fn cmd_packages(
    config: &Config,
    output_format: OutputFormat,
    kind: Option<VehicleKind>,
    vehicle: Option<String>,
) -> Result<()> {
    let store = open_entity_store(config)?;

    match (kind, vehicle) {
        (Some(kind), Some(id)) => {
            let detail = app::vehicle_detail(&store, kind, &id)
                .ok_or_else(|| Error::NotFound(format!("{} not found", kind.label())))?;
            output_packages(output_format, &detail.packages)
        }
        (kind, _) => output_package_sections(output_format, &app::package_sections(&store), kind),
    }
}

fn cmd_address(config: &Config, output_format: OutputFormat, id: &str, fields: &AddressArgs) -> Result<()> {
    let update = address_update(fields);
    if update.is_empty() {
        return Err(Error::Validation(
            "Nothing to change. Pass at least one of --address-1, --address-2, --city, --state, --zip".to_string(),
        ));
    }

    let store = open_entity_store(config)?;
    let package = app::update_package_details(&store, id, None, &update)?;
    output_package(output_format, &package)
}

fn address_update(fields: &AddressArgs) -> AddressUpdate {
    AddressUpdate {
        address_1: fields.address_1.clone(),
        address_2: fields.address_2.clone(),
        city: fields.city.clone(),
        state: fields.state.clone(),
        zip: fields.zip.clone(),
    }
}

fn cmd_watch(config: &Config, output_format: OutputFormat, interval_ms: u64) -> Result<()> {
    let store = open_entity_store(config)?;
    let dirty = Rc::new(Cell::new(true));

    let flag = dirty.clone();
    let _subscription = store.subscribe(move || flag.set(true));

    eprintln!(
        "Watching {} (Ctrl-C to stop)",
        store.storage().data_dir().display()
    );

    loop {
        poll_changes(&store)?;
        if dirty.replace(false) {
            output_stats(output_format, &app::fleet_stats(&store))?;
            if output_format == OutputFormat::Table {
                println!();
            }
        }
        std::thread::sleep(Duration::from_millis(interval_ms));
    }
}

fn poll_changes(store: &EntityStore<FileStorage>) -> Result<()> {
    if store.storage().poll()? {
        debug!("Data files changed on disk");
    }
    Ok(())
}

fn cmd_config(
    config_path: &Path,
    show: bool,
    set_data_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_seed: Option<u64>,
    set_log_level: Option<String>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save_to(config_path)?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load_from(config_path)?;
    let mut modified = false;

    if let Some(data_dir) = set_data_dir {
        config.data_dir = Some(data_dir);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(seed) = set_seed {
        config.seed = Some(seed);
        modified = true;
    }

    if let Some(level) = set_log_level {
        parse_log_level(&level)?;
        config.log_level = level.trim().to_lowercase();
        modified = true;
    }

    if modified {
        config.save_to(config_path)?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_app::repository::open_entity_store_at;
    use tempfile::tempdir;

    #[test]
    fn test_address_update_from_args() {
        let args = AddressArgs {
            city: Some("Reno".to_string()),
            zip: Some("89501".to_string()),
            ..AddressArgs::default()
        };
        let update = address_update(&args);
        assert_eq!(update, AddressUpdate::default().city("Reno").zip("89501"));
        assert!(address_update(&AddressArgs::default()).is_empty());
    }

    #[test]
    fn test_poll_marks_watch_dirty_on_external_write() {
        let dir = tempdir().unwrap();
        let store = open_entity_store_at(dir.path().to_path_buf(), Some(5)).unwrap();
        let other = open_entity_store_at(dir.path().to_path_buf(), None).unwrap();

        let dirty = Rc::new(Cell::new(false));
        let flag = dirty.clone();
        let _sub = store.subscribe(move || flag.set(true));

        poll_changes(&store).unwrap();
        assert!(!dirty.get());

        let van = other.list_vehicles(VehicleKind::Van)[0].clone();
        app::load_package(&other, &VehicleRef::van(van.id)).unwrap();

        poll_changes(&store).unwrap();
        assert!(dirty.get());
        assert_eq!(app::fleet_stats(&store).van_packages, 101);
    }

    #[test]
    fn test_config_reset_repairs_bad_log_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level":"loud"}"#).unwrap();

        cmd_config(&path, false, None, None, None, None, true).unwrap();

        let repaired = Config::load_from(&path).unwrap();
        assert_eq!(repaired, Config::default());
        assert!(repaired.log_level().is_ok());
    }

    #[test]
    fn test_config_set_log_level_over_bad_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level":"loud","seed":4}"#).unwrap();

        cmd_config(&path, false, None, None, None, Some("Info".to_string()), false).unwrap();

        let repaired = Config::load_from(&path).unwrap();
        assert_eq!(repaired.log_level, "info");
        assert_eq!(repaired.seed, Some(4));
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = cmd_config(&path, false, None, None, None, Some("loud".to_string()), false)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_init_logging_tolerates_bad_level() {
        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        init_logging(false, &config);
    }
}
