//! Filter statistics command handler.

use tabled::Tabled;

use dnsward_core::{Controller, StatisticEntry, aggregate};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct StatRow {
    #[tabled(rename = "Rule")]
    label: String,
    #[tabled(rename = "Hits")]
    count: u64,
}

impl From<&StatisticEntry> for StatRow {
    fn from(e: &StatisticEntry) -> Self {
        Self {
            label: e.label.clone(),
            count: e.count,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = controller.statistics().await?;
    let screen: Vec<_> = aggregate::top_down(&entries).collect();
    let out = output::render_list(
        &global.output,
        &screen,
        |e| StatRow::from(*e),
        |e| format!("{}\t{}", e.label, e.count),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
