//! `mapping` and `buckets` commands.

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::services::action_mapping::MappedAction;
use crate::services::registry::Registry;
use crate::services::status_tables::{StatusBucket, StatusTables};

#[derive(Debug, Serialize)]
struct MappingOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow: Option<String>,
    actions: Vec<MappedAction>,
}

impl CommandOutput for MappingOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Slug", "Label", "Actions"]);
        for action in &self.actions {
            table.add_row(vec![
                Cell::new(&action.slug),
                Cell::new(&action.display),
                Cell::new(action.targets.join(", ")),
            ]);
        }
        render_list("bulk action", &table, self.actions.len())
    }
}

#[derive(Debug, Serialize)]
struct BucketsOutput {
    #[serde(flatten)]
    tables: StatusTables,
}

impl CommandOutput for BucketsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Bucket", "Name", "Statuses"]);
        for StatusBucket { slug, name, statuses } in &self.tables.phases_mapping {
            table.add_row(vec![Cell::new(slug), Cell::new(name), Cell::new(statuses.join(", "))]);
        }
        let mut lines = vec![render_list("bucket", &table, self.tables.phases_mapping.len())];
        for (label, statuses) in [
            ("Active", &self.tables.active_statuses),
            ("Review", &self.tables.review_statuses),
            ("Accepted", &self.tables.accepted_statuses),
            ("Dismissed", &self.tables.dismissed_statuses),
            ("External review", &self.tables.ext_review_statuses),
        ] {
            lines.push(format!("{label}: {}", statuses.join(", ")));
        }
        lines.join("\n")
    }
}

pub fn show_mapping(registry: &Registry, workflow: Option<&str>, json_mode: bool) -> Result<()> {
    output(&mapping(registry, workflow)?, json_mode);
    Ok(())
}

pub fn show_buckets(registry: &Registry, json_mode: bool) -> Result<()> {
    let out = BucketsOutput {
        tables: registry.status_tables().clone(),
    };
    output(&out, json_mode);
    Ok(())
}

fn mapping(registry: &Registry, workflow: Option<&str>) -> Result<MappingOutput> {
    let wf = workflow.map(|name| registry.workflow(name)).transpose()?;
    Ok(MappingOutput {
        workflow: wf.map(|w| w.admin_name().to_string()),
        actions: registry.action_mapping(wf).iter().cloned().collect(),
    })
}
