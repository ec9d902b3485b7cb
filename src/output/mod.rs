//! Rendering of finished reports to text or CSV

use crate::classify::ForecastEntry;
use crate::correlate::CorrelatedInventoryRecord;
use crate::document::CustomerMatch;
use crate::error::Result;
use crate::report::{ClusterEfficiencyReport, EfficiencyOutcome, UtilizationFinding};
use std::io::Write;

pub const INVENTORY_HEADER: [&str; 10] = [
    "Hostname", "Platform", "SystemID", "Serial", "Model", "Mode", "Version", "Used", "Percent",
    "Allocated",
];

const TABLE_HEADER: [&str; 10] = [
    "Hostname", "Platform", "System ID", "Serial", "Model", "Mode", "Version", "Used", "Percent",
    "Allocated",
];
const TABLE_WIDTHS: [usize; 10] = [20, 20, 40, 20, 15, 15, 10, 12, 12, 12];

fn inventory_fields(row: &CorrelatedInventoryRecord) -> [String; 10] {
    let system = &row.inventory;
    [
        system.hostname.clone(),
        system.platform_type.clone(),
        system.system_id.clone(),
        system.serial_number.clone(),
        system.model.clone(),
        system.operating_mode.clone(),
        system.version.clone(),
        row.used_capacity_gb.to_string(),
        row.percent_capacity.to_string(),
        row.allocated_capacity_gb.to_string(),
    ]
}

pub fn write_inventory_csv<W: Write>(rows: &[CorrelatedInventoryRecord], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(INVENTORY_HEADER)?;
    for row in rows {
        csv.write_record(inventory_fields(row))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_inventory_table<W: Write>(rows: &[CorrelatedInventoryRecord], mut writer: W) -> Result<()> {
    writeln!(writer, "{}", table_line(TABLE_HEADER.iter().map(|s| s.to_string())))?;
    for row in rows {
        writeln!(writer, "{}", table_line(inventory_fields(row)))?;
    }
    Ok(())
}

fn table_line<I: IntoIterator<Item = String>>(fields: I) -> String {
    fields
        .into_iter()
        .zip(TABLE_WIDTHS)
        .map(|(field, width)| format!("{:<width$}", field, width = width))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_forecast<W: Write>(entries: &[ForecastEntry], mut writer: W) -> Result<()> {
    for entry in entries {
        writeln!(
            writer,
            "{}: Hostname: {} Capacity: {}",
            entry.label(),
            entry.hostname,
            entry.percent_capacity
        )?;
    }
    Ok(())
}

pub fn write_customers<W: Write>(customers: &[CustomerMatch], mut writer: W) -> Result<()> {
    for customer in customers {
        writeln!(writer, "Name:  {}", customer.name)?;
        writeln!(writer, "Count: {}", customer.count)?;
        writeln!(writer, "ID:    {}", customer.id)?;
    }
    Ok(())
}

pub fn write_utilization<W: Write>(findings: &[UtilizationFinding], mut writer: W) -> Result<()> {
    for finding in findings {
        match finding {
            UtilizationFinding::Disk { node, max_busy } => {
                writeln!(writer, "Disk: Hostname: {} DiskBusy: {}", node, max_busy)?
            }
            UtilizationFinding::Cpu {
                node,
                max_busy,
                avg_busy,
            } => writeln!(
                writer,
                "CPU: Hostname: {} MaxCPUBusy: {} AvgCPUBusy: {}",
                node, max_busy, avg_busy
            )?,
            UtilizationFinding::Balance {
                node,
                busy,
                partner_busy,
            } => writeln!(
                writer,
                "Balance: Hostname: {} CPUBusy: {} PartnerBusy: {}",
                node, busy, partner_busy
            )?,
            UtilizationFinding::NoData { node, serial } => {
                writeln!(writer, "NoData: Hostname: {} SerialNumber: {}", node, serial)?
            }
        }
    }
    Ok(())
}

pub fn write_efficiency<W: Write>(report: &ClusterEfficiencyReport, mut writer: W) -> Result<()> {
    for (attribute, value) in &report.summary.attributes {
        writeln!(writer, "{}: {}", attribute, value)?;
    }
    for node in &report.nodes {
        writeln!(
            writer,
            "Node: {} Serial: {} Model: {} Efficiency: {:.2}",
            node.hostname, node.serial_number, node.model, node.efficiency_ratio
        )?;
    }
    for (serial, reason) in &report.failures {
        writeln!(writer, "Skipped: Serial: {} Reason: {}", serial, reason)?;
    }
    match report.outcome {
        EfficiencyOutcome::Mean(mean) => writeln!(
            writer,
            "Mean Efficiency: {:.2} ({} nodes)",
            mean.value, mean.count
        )?,
        EfficiencyOutcome::NoData => writeln!(writer, "Mean Efficiency: no efficiency data")?,
    }
    Ok(())
}
