//! Output formatting module

use std::fmt::Write as _;

use fleet_app::app::{PackageSections, VehicleDetail};
use fleet_domain::service::{FleetStats, VehicleLoad};
use fleet_types::{OutputFormat, Package, Result, VehicleKind};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn full_marker(load: &VehicleLoad) -> &'static str {
    if load.is_full() {
        "FULL"
    } else {
        ""
    }
}

pub fn format_vehicle_loads(kind: VehicleKind, loads: &[VehicleLoad]) -> String {
    let mut out = String::new();
    let title = format!("{}s", kind.label());
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));

    if loads.is_empty() {
        let _ = writeln!(out, "No {}s found.", kind);
        return out;
    }

    let _ = writeln!(
        out,
        "{:<44} {:<24} {:>9} {:>7} {:>5}",
        "ID", "Name", "Packages", "Used", ""
    );
    let _ = writeln!(out, "{}", "-".repeat(93));
    for load in loads {
        let _ = writeln!(
            out,
            "{:<44} {:<24} {:>9} {:>6.1}% {:>5}",
            load.vehicle.id,
            truncate(&load.vehicle.name, 24),
            format!("{}/{}", load.package_count, load.vehicle.capacity),
            load.utilization_percent,
            full_marker(load)
        );
    }
    out
}

pub fn format_packages(packages: &[Package]) -> String {
    let mut out = String::new();
    if packages.is_empty() {
        let _ = writeln!(out, "No packages.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<42} {:<11} {:<20} {:<30}",
        "ID", "Status", "Recipient", "Address"
    );
    let _ = writeln!(out, "{}", "-".repeat(106));
    for package in packages {
        let address = format!(
            "{}, {} {} {}",
            package.address_1, package.city, package.state, package.zip
        );
        let _ = writeln!(
            out,
            "{:<42} {:<11} {:<20} {:<30}",
            package.id,
            package.status.label(),
            truncate(&package.recipient_name, 20),
            truncate(&address, 30)
        );
    }
    out
}

pub fn format_package(package: &Package) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Package {}", package.id);
    let _ = writeln!(out, "{}", "=".repeat(8 + package.id.chars().count()));
    if let Some(ref id) = package.truck_id {
        let _ = writeln!(out, "Truck:      {}", id);
    }
    if let Some(ref id) = package.van_id {
        let _ = writeln!(out, "Van:        {}", id);
    }
    let _ = writeln!(out, "Status:     {}", package.status.label());
    let _ = writeln!(out, "Recipient:  {}", package.recipient_name);
    let _ = writeln!(out, "Address 1:  {}", package.address_1);
    if !package.address_2.is_empty() {
        let _ = writeln!(out, "Address 2:  {}", package.address_2);
    }
    let _ = writeln!(
        out,
        "City:       {}, {} {}",
        package.city, package.state, package.zip
    );
    let _ = writeln!(
        out,
        "Created:    {}",
        package.created_at.format("%Y-%m-%d %H:%M")
    );
    out
}

pub fn format_vehicle_detail(detail: &VehicleDetail) -> String {
    let load = &detail.load;
    let mut out = String::new();
    let title = format!("{} {}", load.kind.label(), load.vehicle.name);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
    let _ = writeln!(out, "ID:          {}", load.vehicle.id);
    let _ = writeln!(
        out,
        "Packages:    {}/{} ({:.1}%){}",
        load.package_count,
        load.vehicle.capacity,
        load.utilization_percent,
        if load.is_full() { " FULL" } else { "" }
    );
    let _ = writeln!(
        out,
        "Created:     {}",
        load.vehicle.created_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out);
    out.push_str(&format_packages(&detail.packages));
    out
}

pub fn format_stats(stats: &FleetStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fleet Statistics");
    let _ = writeln!(out, "================");
    let _ = writeln!(
        out,
        "{:<8} {:>9} {:>9} {:>8}",
        "", "Packages", "Capacity", "Used"
    );
    for kind in VehicleKind::ALL {
        let _ = writeln!(
            out,
            "{:<8} {:>9} {:>9} {:>7.1}%",
            format!("{}s", kind.label()),
            stats.packages(kind),
            stats.capacity(kind),
            stats.utilization(kind)
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(37));
    let _ = writeln!(
        out,
        "{:<8} {:>9} {:>9} {:>7.1}%",
        "Total",
        stats.total_packages,
        stats.total_capacity,
        stats.total_utilization()
    );
    out
}

pub fn output_vehicle_loads(
    output_format: OutputFormat,
    kind: VehicleKind,
    loads: &[VehicleLoad],
) -> Result<()> {
    match output_format {
        OutputFormat::Json => print_json(loads),
        OutputFormat::Table => {
            print!("{}", format_vehicle_loads(kind, loads));
            Ok(())
        }
    }
}

pub fn output_vehicle_detail(output_format: OutputFormat, detail: &VehicleDetail) -> Result<()> {
    match output_format {
        OutputFormat::Json => print_json(detail),
        OutputFormat::Table => {
            print!("{}", format_vehicle_detail(detail));
            Ok(())
        }
    }
}

pub fn output_package(output_format: OutputFormat, package: &Package) -> Result<()> {
    match output_format {
        OutputFormat::Json => print_json(package),
        OutputFormat::Table => {
            print!("{}", format_package(package));
            Ok(())
        }
    }
}

pub fn output_package_sections(
    output_format: OutputFormat,
    sections: &PackageSections,
    only: Option<VehicleKind>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return match only {
            Some(kind) => print_json(sections.section(kind)),
            None => print_json(sections),
        };
    }

    for kind in VehicleKind::ALL {
        if only.is_some_and(|k| k != kind) {
            continue;
        }
        let packages = sections.section(kind);
        let title = format!("{} Packages ({})", kind.label(), packages.len());
        println!("{}", title);
        println!("{}", "=".repeat(title.chars().count()));
        print!("{}", format_packages(packages));
        println!();
    }
    Ok(())
}

pub fn output_packages(output_format: OutputFormat, packages: &[Package]) -> Result<()> {
    match output_format {
        OutputFormat::Json => print_json(packages),
        OutputFormat::Table => {
            print!("{}", format_packages(packages));
            Ok(())
        }
    }
}

pub fn output_stats(output_format: OutputFormat, stats: &FleetStats) -> Result<()> {
    match output_format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table => {
            print!("{}", format_stats(stats));
            Ok(())
        }
    }
}
