//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reports from the NetApp Active IQ telemetry API
#[derive(Parser, Debug)]
#[command(name = "aiq")]
#[command(about = "aiq - NetApp Active IQ inventory, capacity and efficiency reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Refresh the access token from the stored refresh token
    #[arg(short, long, global = true)]
    pub refresh: bool,

    /// Directory holding the token files and config.toml
    #[arg(short = 'a', long, value_name = "DIR", global = true)]
    pub auth_dir: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Maximum simultaneous per-node efficiency fetches
    #[arg(long, value_name = "N", global = true)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Find a customer ID with a search string
    Lookup {
        /// Customer name or fragment
        name: String,
    },

    /// Inventory joined with capacity, as CSV by default
    Inventory {
        /// Customer ID
        customer_id: String,

        /// Fixed-width table instead of CSV
        #[arg(short = 't', long)]
        table: bool,
    },

    /// Systems with capacity at or above a threshold, by time-to-full
    Capacity {
        /// Customer ID
        customer_id: String,

        /// Minimum percent capacity (default from config, 70)
        #[arg(short = 'f', long, value_name = "PERCENT")]
        threshold: Option<f64>,
    },

    /// All systems sorted by percent capacity with their time-to-full
    Forecast {
        /// Customer ID
        customer_id: String,
    },

    /// Busy and unbalanced nodes at or above a threshold
    Utilization {
        /// Customer ID
        customer_id: String,

        /// Minimum busy percentage (default from config, 50)
        #[arg(short = 'p', long, value_name = "PERCENT")]
        threshold: Option<f64>,
    },

    /// Per-node storage efficiency and the cluster mean
    Efficiency {
        /// Cluster identifier
        cluster_id: String,
    },
}
