use crate::aggregate::threshold_filter;
use crate::document::{CpuBusy, DiskBusy, PerformanceSection, UnbalancedNode};
use serde::Serialize;

/// One line of the utilization report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UtilizationFinding {
    Disk {
        node: String,
        max_busy: f64,
    },
    Cpu {
        node: String,
        max_busy: f64,
        avg_busy: f64,
    },
    Balance {
        node: String,
        busy: f64,
        partner_busy: f64,
    },
    NoData {
        node: String,
        serial: String,
    },
}

/// Busy nodes at or above `threshold`, section by section; nodes without
/// data are always listed.
pub fn utilization_findings(sections: &[PerformanceSection], threshold: f64) -> Vec<UtilizationFinding> {
    let mut findings = Vec::new();
    for section in sections {
        match section {
            PerformanceSection::DiskBusy(entries) => findings.extend(
                threshold_filter(entries.iter().collect(), threshold, |e: &&DiskBusy| e.max_diskbusy_percent)
                    .into_iter()
                    .map(|e| UtilizationFinding::Disk {
                        node: e.node_name.clone(),
                        max_busy: e.max_diskbusy_percent,
                    }),
            ),
            PerformanceSection::CpuBusy(entries) => findings.extend(
                threshold_filter(entries.iter().collect(), threshold, |e: &&CpuBusy| e.max_cpubusy_percent)
                    .into_iter()
                    .map(|e| UtilizationFinding::Cpu {
                        node: e.node_name.clone(),
                        max_busy: e.max_cpubusy_percent,
                        avg_busy: e.avg_cpubusy_percent,
                    }),
            ),
            PerformanceSection::Unbalanced(entries) => findings.extend(
                threshold_filter(entries.iter().collect(), threshold, |e: &&UnbalancedNode| e.average_cpu_busy)
                    .into_iter()
                    .map(|e| UtilizationFinding::Balance {
                        node: e.node_name.clone(),
                        busy: e.average_cpu_busy,
                        partner_busy: e.partner_average_cpu_busy,
                    }),
            ),
            PerformanceSection::NoData(entries) => {
                findings.extend(entries.iter().map(|e| UtilizationFinding::NoData {
                    node: e.node_name.clone(),
                    serial: e.serial_number.clone(),
                }))
            }
        }
    }
    findings
}
