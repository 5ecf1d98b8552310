//! Resolver latency command handler.

use tabled::Tabled;

use dnsward_core::{Controller, ResolverStat, aggregate};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct ResolverRow {
    #[tabled(rename = "Resolver")]
    resolver: String,
    #[tabled(rename = "Avg (ms)")]
    average: String,
    #[tabled(rename = "Samples")]
    count: usize,
}

impl From<&ResolverStat> for ResolverRow {
    fn from(s: &ResolverStat) -> Self {
        Self {
            resolver: s.resolver.clone(),
            average: format!("{:.3}", s.average_millis),
            count: s.count,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = controller.resolver_stats().await?;
    let screen: Vec<_> = aggregate::top_down(&stats).collect();
    let out = output::render_list(
        &global.output,
        &screen,
        |s| ResolverRow::from(*s),
        |s| s.resolver.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
