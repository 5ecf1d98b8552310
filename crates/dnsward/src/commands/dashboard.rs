//! Full refresh: every section at once.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use dnsward_core::{
    AllowedDomain, CacheEntry, Controller, Dashboard, ResolverStat, StatisticEntry, aggregate,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::cache::CacheRow;
use super::domains::DomainRow;
use super::resolvers::ResolverRow;
use super::stats::StatRow;
use super::util;

/// A dashboard with every section in on-screen order.
#[derive(Serialize)]
struct DashboardView<'a> {
    fetched_at: DateTime<Utc>,
    statistics: Vec<&'a StatisticEntry>,
    cache_count: usize,
    cache: Vec<&'a CacheEntry>,
    resolvers: Vec<&'a ResolverStat>,
    allowed_domains: Vec<&'a AllowedDomain>,
}

impl<'a> From<&'a Dashboard> for DashboardView<'a> {
    fn from(d: &'a Dashboard) -> Self {
        Self {
            fetched_at: d.fetched_at,
            statistics: aggregate::top_down(&d.statistics).collect(),
            cache_count: d.cache_count(),
            cache: aggregate::top_down(&d.cache).collect(),
            resolvers: aggregate::top_down(&d.resolvers).collect(),
            allowed_domains: aggregate::top_down(&d.allowed_domains).collect(),
        }
    }
}

fn render_sections(view: &DashboardView<'_>, color: bool) -> String {
    let mut out = String::new();
    let fetched = view.fetched_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
    let _ = writeln!(out, "Fetched {fetched}\n");

    let _ = writeln!(out, "{}", output::heading("Filter statistics", None, color));
    let rows: Vec<StatRow> = view.statistics.iter().map(|e| StatRow::from(*e)).collect();
    let _ = writeln!(out, "{}\n", output::render_table(&rows));

    let _ = writeln!(out, "{}", output::heading("Cache", Some(view.cache_count), color));
    let rows: Vec<CacheRow> = view.cache.iter().map(|e| CacheRow::from(*e)).collect();
    let _ = writeln!(out, "{}\n", output::render_table(&rows));

    let _ = writeln!(out, "{}", output::heading("Resolvers", None, color));
    let rows: Vec<ResolverRow> = view.resolvers.iter().map(|s| ResolverRow::from(*s)).collect();
    let _ = writeln!(out, "{}\n", output::render_table(&rows));

    let _ = writeln!(out, "{}", output::heading("Allowed domains", None, color));
    let rows: Vec<DomainRow> = view.allowed_domains.iter().map(|d| DomainRow::from(*d)).collect();
    let _ = write!(out, "{}", output::render_table(&rows));

    out
}

fn render_plain(view: &DashboardView<'_>) -> String {
    let sections = [
        view.statistics
            .iter()
            .map(|e| format!("{}\t{}", e.label, e.count))
            .collect::<Vec<_>>(),
        view.cache.iter().map(|e| e.name.clone()).collect(),
        view.resolvers.iter().map(|s| s.resolver.clone()).collect(),
        view.allowed_domains.iter().map(|d| (*d).clone()).collect(),
    ];
    sections.map(|lines| lines.join("\n")).join("\n\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = util::with_progress(controller, global, controller.refresh()).await?;
    let view = DashboardView::from(dashboard.as_ref());
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &view,
        |v| render_sections(v, color),
        render_plain,
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
