//! Vaidya CLI - Command-line interface for the Vaidya queue engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9540";

#[derive(Parser)]
#[command(name = "vaidya")]
#[command(about = "Vaidya therapy queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "VAIDYA_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Actor recorded in the audit log
    #[arg(long, env = "VAIDYA_ACTOR", global = true)]
    actor: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage therapy queues
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },

    /// Manage queue entries
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },
}

#[derive(Subcommand)]
enum QueueCommand {
    /// Register a queue for a clinic and therapy type
    Create {
        #[arg(short, long)]
        clinic: String,

        /// Therapy type (e.g., SHODHANA, SHAMANA)
        #[arg(short, long)]
        therapy: String,

        #[arg(short, long)]
        name: String,

        /// Maximum active entries (server default when omitted)
        #[arg(long)]
        capacity: Option<u32>,
    },

    /// List a clinic's queues with their active entries
    List {
        #[arg(short, long)]
        clinic: String,

        #[arg(long)]
        active_only: bool,
    },

    /// Show the active queue for a therapy type
    Get {
        #[arg(short, long)]
        clinic: String,

        #[arg(short, long)]
        therapy: String,
    },

    /// Deactivate a queue (entries are kept)
    Deactivate { queue_id: String },

    /// Show queue statistics
    Stats { queue_id: String },

    /// Recompute positions and wait estimates
    Reorder { queue_id: String },
}

#[derive(Subcommand)]
enum EntryCommand {
    /// Add a patient to a queue
    Add {
        #[arg(short, long)]
        queue: String,

        #[arg(short, long)]
        patient: String,

        #[arg(short, long)]
        appointment: Option<String>,

        /// Priority (higher = more urgent)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        priority: i32,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Update status, priority or notes of an entry
    Update {
        entry_id: String,

        /// WAITING, IN_PROGRESS, COMPLETED or REMOVED
        #[arg(long)]
        status: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        priority: Option<i32>,

        #[arg(long)]
        notes: Option<String>,

        /// Actual wait in minutes
        #[arg(long)]
        actual_wait: Option<u32>,
    },

    /// Start treatment (WAITING -> IN_PROGRESS)
    Start { entry_id: String },

    /// Complete an entry
    Complete {
        entry_id: String,

        /// Actual wait in minutes (derived from check-in when omitted)
        #[arg(long)]
        actual_wait: Option<u32>,
    },

    /// Remove an entry from its queue
    Remove { entry_id: String },

    /// Show the live position of an appointment
    Position { appointment_id: String },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct QueueView {
    id: String,
    clinic_id: String,
    therapy_type: String,
    name: String,
    max_capacity: u32,
    is_active: bool,
    #[tabled(rename = "booked")]
    current_position: i64,
}

#[derive(Deserialize, Tabled)]
struct EntryView {
    #[tabled(display_with = "display_opt")]
    position: Option<u32>,
    id: String,
    patient_id: String,
    priority: i32,
    status: String,
    #[tabled(rename = "est. wait (min)", display_with = "display_opt")]
    estimated_wait_time: Option<u32>,
}

#[derive(Deserialize)]
struct QueueListing {
    #[serde(flatten)]
    queue: QueueView,
    entries: Vec<EntryView>,
}

fn display_opt(value: &Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

/// Params for entry.update.v1; absent flags are left out so the patch stays sparse
fn update_params(
    entry_id: &str,
    status: Option<String>,
    priority: Option<i32>,
    notes: Option<String>,
    actual_wait: Option<u32>,
    actor: Option<String>,
) -> serde_json::Value {
    let mut params = json!({ "entry_id": entry_id });
    let fields = [
        ("status", status.map(|s| json!(s.to_uppercase()))),
        ("priority", priority.map(|p| json!(p))),
        ("notes", notes.map(|n| json!(n))),
        ("actual_wait_time", actual_wait.map(|m| json!(m))),
        ("actor", actor.map(|a| json!(a))),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            params[key] = value;
        }
    }
    params
}

fn print_entry(message: &str, entry: serde_json::Value) -> Result<()> {
    let entry: EntryView = serde_json::from_value(entry)?;
    println!("{}", message.green().bold());
    println!();
    println!("{}", Table::new(vec![entry]));
    Ok(())
}

async fn run_queue(cli_url: &str, actor: Option<String>, command: QueueCommand) -> Result<()> {
    match command {
        QueueCommand::Create {
            clinic,
            therapy,
            name,
            capacity,
        } => {
            let params = json!({
                "clinic_id": clinic,
                "therapy_type": therapy,
                "name": name,
                "max_capacity": capacity,
                "actor": actor,
            });
            let result = call_rpc(cli_url, "queue.create.v1", params).await?;
            let queue: QueueView = serde_json::from_value(result)?;

            println!("{}", "✓ Queue created".green().bold());
            println!();
            println!("{}", Table::new(vec![queue]));
        }

        QueueCommand::List {
            clinic,
            active_only,
        } => {
            let params = json!({ "clinic_id": clinic, "active_only": active_only });
            let result = call_rpc(cli_url, "queue.list.v1", params).await?;
            let listings: Vec<QueueListing> = serde_json::from_value(result)?;

            if listings.is_empty() {
                println!("{}", format!("No queues for clinic {}", clinic).yellow());
            }
            for listing in listings {
                let state = if listing.queue.is_active {
                    "ACTIVE".green()
                } else {
                    "INACTIVE".red()
                };
                println!(
                    "{} {} [{}] {}",
                    listing.queue.name.cyan().bold(),
                    listing.queue.therapy_type,
                    state,
                    listing.queue.id.dimmed()
                );
                if listing.entries.is_empty() {
                    println!("  (empty)");
                } else {
                    println!("{}", Table::new(listing.entries));
                }
                println!();
            }
        }

        QueueCommand::Get { clinic, therapy } => {
            let params = json!({ "clinic_id": clinic, "therapy_type": therapy });
            let result = call_rpc(cli_url, "queue.get_by_type.v1", params).await?;
            let queue: QueueView = serde_json::from_value(result)?;
            println!("{}", Table::new(vec![queue]));
        }

        QueueCommand::Deactivate { queue_id } => {
            let params = json!({ "queue_id": queue_id, "actor": actor });
            call_rpc(cli_url, "queue.deactivate.v1", params).await?;
            println!(
                "{}",
                format!("✓ Queue {} deactivated", queue_id).green().bold()
            );
        }

        QueueCommand::Stats { queue_id } => {
            let params = json!({ "queue_id": queue_id });
            let stats = call_rpc(cli_url, "queue.stats.v1", params).await?;

            println!("{}", format!("Queue {}", queue_id).cyan().bold());
            println!();
            println!("  {} {}", "Waiting:".bold(), stats["waiting"]);
            println!("  {} {}", "In progress:".bold(), stats["in_progress"]);
            println!("  {} {}", "Completed:".bold(), stats["completed"]);
            println!("  {} {}", "Removed:".bold(), stats["removed"]);
            println!("  {} {}", "Total entries:".bold(), stats["total_entries"]);
            println!();
            println!(
                "  {} {} min",
                "Average wait:".bold(),
                stats["average_wait_time"]
            );
            println!(
                "  {} {}/{}",
                "Capacity:".bold(),
                stats["current_capacity"],
                stats["max_capacity"]
            );
            let utilization = stats["utilization_rate"].as_f64().unwrap_or(0.0);
            println!("  {} {:.1}%", "Utilization:".bold(), utilization);
        }

        QueueCommand::Reorder { queue_id } => {
            let params = json!({ "queue_id": queue_id, "actor": actor });
            let summary = call_rpc(cli_url, "queue.reorder.v1", params).await?;
            println!(
                "{} {} active, {} positions updated",
                "✓ Queue reordered:".green().bold(),
                summary["active_entries"],
                summary["updated_positions"]
            );
        }
    }

    Ok(())
}

async fn run_entry(cli_url: &str, actor: Option<String>, command: EntryCommand) -> Result<()> {
    match command {
        EntryCommand::Add {
            queue,
            patient,
            appointment,
            priority,
            notes,
        } => {
            let params = json!({
                "queue_id": queue,
                "patient_id": patient,
                "appointment_id": appointment,
                "priority": priority,
                "notes": notes,
                "actor": actor,
            });
            let entry = call_rpc(cli_url, "entry.add.v1", params).await?;
            print_entry("✓ Patient added to queue", entry)?;
        }

        EntryCommand::Update {
            entry_id,
            status,
            priority,
            notes,
            actual_wait,
        } => {
            let params = update_params(&entry_id, status, priority, notes, actual_wait, actor);
            let entry = call_rpc(cli_url, "entry.update.v1", params).await?;
            print_entry("✓ Entry updated", entry)?;
        }

        EntryCommand::Start { entry_id } => {
            let params = json!({ "entry_id": entry_id, "actor": actor });
            let entry = call_rpc(cli_url, "entry.start.v1", params).await?;
            print_entry("✓ Treatment started", entry)?;
        }

        EntryCommand::Complete {
            entry_id,
            actual_wait,
        } => {
            let params = json!({
                "entry_id": entry_id,
                "actual_wait_time": actual_wait,
                "actor": actor,
            });
            let entry = call_rpc(cli_url, "entry.complete.v1", params).await?;
            println!(
                "{} actual wait {} min",
                "✓ Entry completed:".green().bold(),
                entry["actual_wait_time"]
            );
        }

        EntryCommand::Remove { entry_id } => {
            let params = json!({ "entry_id": entry_id, "actor": actor });
            call_rpc(cli_url, "entry.remove.v1", params).await?;
            println!("{}", format!("✓ Entry {} removed", entry_id).green().bold());
        }

        EntryCommand::Position { appointment_id } => {
            let params = json!({ "appointment_id": appointment_id });
            let pos = call_rpc(cli_url, "entry.position.v1", params).await?;

            println!("{}", format!("Appointment {}", appointment_id).cyan().bold());
            println!(
                "  {} {} of {}",
                "Position:".bold(),
                pos["position"],
                pos["total_in_queue"]
            );
            println!(
                "  {} {} min",
                "Estimated wait:".bold(),
                pos["estimated_wait_time"]
            );
            println!("  {} {}", "Status:".bold(), pos["status"]);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Queue { command } => run_queue(&cli.rpc_url, cli.actor, command).await,
        Commands::Entry { command } => run_entry(&cli.rpc_url, cli.actor, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_params_are_sparse() {
        let params = update_params("e-1", None, Some(5), None, None, None);
        assert_eq!(params, json!({ "entry_id": "e-1", "priority": 5 }));
    }

    #[test]
    fn test_update_params_uppercase_status() {
        let params = update_params(
            "e-1",
            Some("in_progress".to_string()),
            None,
            Some("bed 3".to_string()),
            None,
            Some("nurse-7".to_string()),
        );
        assert_eq!(params["status"], "IN_PROGRESS");
        assert_eq!(params["notes"], "bed 3");
        assert_eq!(params["actor"], "nurse-7");
        assert!(params.get("actual_wait_time").is_none());
    }

    #[test]
    fn test_listing_parses_server_shape() {
        let listing: QueueListing = serde_json::from_value(json!({
            "id": "q-1",
            "clinic_id": "c-1",
            "therapy_type": "SHODHANA",
            "name": "Morning",
            "max_capacity": 5,
            "is_active": true,
            "current_position": 2,
            "created_at": 1,
            "updated_at": 1,
            "entries": [{
                "id": "e-1",
                "queue_id": "q-1",
                "patient_id": "p-1",
                "position": 1,
                "priority": 0,
                "status": "WAITING",
                "estimated_wait_time": 30
            }]
        }))
        .unwrap();

        assert_eq!(listing.queue.name, "Morning");
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(display_opt(&listing.entries[0].position), "1");
    }
}
