//! Network simulation command implementation.
//!
//! Connectivity is persisted between invocations so a queue built up while
//! "offline" is replayed by a later `network online`.

use serde_json::json;

use super::Context;
use crate::cli::args::{NetworkCommands, OutputFormat};
use crate::error::StudySyncError;
use crate::features::offline::{ConnectionType, ConnectivitySource, NetworkEvent};
use crate::output::{format_drain_pretty, format_status, format_status_pretty, to_json};

/// Execute network subcommands.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written, or output
/// formatting fails.
pub fn network(
    ctx: &Context,
    cmd: NetworkCommands,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    match cmd {
        NetworkCommands::Online { connection } => go_online(ctx, connection.as_deref(), format),
        NetworkCommands::Offline => go_offline(ctx, format),
        NetworkCommands::Status => {
            let manager = ctx.offline_manager(ctx.connectivity()?);
            format_status(&manager.status(), format)
        },
    }
}

fn go_online(
    ctx: &Context,
    connection: Option<&str>,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    let connection = connection.map(ConnectionType::parse);
    let was_online = ctx.connectivity()?.is_online();
    ctx.save_connectivity(true, connection)?;

    let manager = ctx.offline_manager(ctx.connectivity()?);
    if let Some(connection) = connection {
        manager.publish(NetworkEvent::ConnectionChanged(connection));
    }
    // Only a transition from offline announces itself and drains.
    let outcome = if was_online {
        None
    } else {
        manager.publish(NetworkEvent::Online)
    };
    let status = manager.status();

    match format {
        OutputFormat::Json => to_json(&json!({ "status": status, "drain": outcome })),
        OutputFormat::Pretty => {
            let mut output = format_status_pretty(&status);
            if let Some(outcome) = outcome {
                output.push('\n');
                output.push_str(&format_drain_pretty(&outcome));
            }
            Ok(output)
        },
    }
}

fn go_offline(ctx: &Context, format: OutputFormat) -> Result<String, StudySyncError> {
    let was_online = ctx.connectivity()?.is_online();
    ctx.save_connectivity(false, None)?;

    let manager = ctx.offline_manager(ctx.connectivity()?);
    if was_online {
        manager.publish(NetworkEvent::Offline);
    }

    format_status(&manager.status(), format)
}
