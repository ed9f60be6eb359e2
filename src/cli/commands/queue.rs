//! Offline queue command implementation.

use colored::Colorize;

use super::Context;
use crate::cli::args::{OutputFormat, QueueCommands};
use crate::error::StudySyncError;
use crate::features::offline::{MutationType, NewMutation, OfflineManager};
use crate::output::{format_drain_pretty, format_queue, format_status, to_json};

/// Execute queue subcommands.
///
/// # Errors
///
/// Returns an error for invalid input, or if the store cannot be read or
/// output formatting fails.
pub fn queue(
    ctx: &Context,
    cmd: QueueCommands,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    let manager = ctx.offline_manager(ctx.connectivity()?);

    match cmd {
        QueueCommands::Add {
            mutation_type,
            entity,
            data,
        } => add(&manager, &mutation_type, entity, &data, format),
        QueueCommands::List => format_queue(&manager.pending(), format),
        QueueCommands::Status => format_status(&manager.status(), format),
        QueueCommands::Sync => {
            let outcome = manager.process_queue();
            match format {
                OutputFormat::Json => to_json(&outcome),
                OutputFormat::Pretty => Ok(format_drain_pretty(&outcome)),
            }
        },
        QueueCommands::Clear => {
            let dropped = manager.queue_length();
            manager.clear_queue();
            match format {
                OutputFormat::Json => to_json(&serde_json::json!({ "cleared": dropped })),
                OutputFormat::Pretty => Ok(format!(
                    "{} Cleared {} pending change(s)",
                    "✓".green(),
                    dropped
                )),
            }
        },
    }
}

fn add(
    manager: &OfflineManager,
    mutation_type: &str,
    entity: String,
    data: &str,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    let mutation_type = MutationType::parse(mutation_type)?;
    if entity.trim().is_empty() {
        return Err(StudySyncError::InvalidInput(
            "Entity name cannot be empty".to_string(),
        ));
    }
    let data: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| StudySyncError::InvalidInput(format!("Payload is not valid JSON: {e}")))?;

    let queued = manager.queue_mutation(NewMutation::new(mutation_type, entity, data));

    match format {
        OutputFormat::Json => to_json(&queued),
        OutputFormat::Pretty => Ok(format!(
            "Queued {} {} {}",
            queued.mutation_type,
            queued.entity.bold(),
            format!("({})", queued.id).dimmed()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::context;
    use crate::notify::Notice;

    fn add_cmd(kind: &str, entity: &str, data: &str) -> QueueCommands {
        QueueCommands::Add {
            mutation_type: kind.to_string(),
            entity: entity.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_add_then_list_json() {
        let t = context();
        t.ctx.save_connectivity(false, None).unwrap();

        queue(&t.ctx, add_cmd("create", "comment", r#"{"body":"hi"}"#), OutputFormat::Json).unwrap();
        let listed = queue(&t.ctx, QueueCommands::List, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["entity"], "comment");
        assert_eq!(value["items"][0]["data"]["body"], "hi");
        assert_eq!(t.log.notices(), vec![Notice::Queued]);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let t = context();

        let bad_type = queue(&t.ctx, add_cmd("upsert", "comment", "{}"), OutputFormat::Json);
        assert!(matches!(bad_type, Err(StudySyncError::InvalidInput(_))));

        let bad_json = queue(&t.ctx, add_cmd("create", "comment", "{oops"), OutputFormat::Json);
        assert!(matches!(bad_json, Err(StudySyncError::InvalidInput(_))));

        let bad_entity = queue(&t.ctx, add_cmd("create", " ", "{}"), OutputFormat::Json);
        assert!(matches!(bad_entity, Err(StudySyncError::InvalidInput(_))));
    }

    #[test]
    fn test_sync_writes_outbox() {
        let t = context();
        queue(&t.ctx, add_cmd("update", "profile", r#"{"bio":"x"}"#), OutputFormat::Json).unwrap();

        let out = queue(&t.ctx, QueueCommands::Sync, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["synced"], 1);
        let outbox = std::fs::read_to_string(t.dir.path().join("outbox.jsonl")).unwrap();
        assert_eq!(outbox.lines().count(), 1);
    }

    #[test]
    fn test_sync_offline_is_skipped() {
        let t = context();
        t.ctx.save_connectivity(false, None).unwrap();
        queue(&t.ctx, add_cmd("delete", "comment", r#"{"id":1}"#), OutputFormat::Json).unwrap();

        let out = queue(&t.ctx, QueueCommands::Sync, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["outcome"], "skipped");
        assert_eq!(value["reason"], "offline");
    }

    #[test]
    fn test_clear() {
        let t = context();
        queue(&t.ctx, add_cmd("create", "a", "{}"), OutputFormat::Json).unwrap();
        queue(&t.ctx, add_cmd("create", "b", "{}"), OutputFormat::Json).unwrap();

        let out = queue(&t.ctx, QueueCommands::Clear, OutputFormat::Json).unwrap();

        assert!(out.contains("\"cleared\": 2"));
        let status = queue(&t.ctx, QueueCommands::Status, OutputFormat::Json).unwrap();
        assert!(status.contains("\"pending\": 0"));
    }
}
