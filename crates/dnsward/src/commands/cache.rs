//! Record cache command handler.

use tabled::Tabled;

use dnsward_core::{CacheEntry, Controller, aggregate};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct CacheRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Valid Until")]
    valid_until: String,
}

impl From<&CacheEntry> for CacheRow {
    fn from(e: &CacheEntry) -> Self {
        Self {
            name: e.name.clone(),
            valid_until: e.expiry_display(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = controller.cache_entries().await?;
    let screen: Vec<_> = aggregate::top_down(&entries).collect();
    let out = output::render_list(
        &global.output,
        &screen,
        |e| CacheRow::from(*e),
        |e| e.name.clone(),
    );
    if matches!(global.output, OutputFormat::Table) {
        let color = output::should_color(&global.color);
        output::print_output(
            &output::heading("Cache", Some(entries.len()), color),
            global.quiet,
        );
    }
    output::print_output(&out, global.quiet);
    Ok(())
}
