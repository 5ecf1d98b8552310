//! Allow-list command handlers.

use tabled::Tabled;

use dnsward_core::{AllowedDomain, Controller, aggregate};

use crate::cli::{DomainsArgs, DomainsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct DomainRow {
    #[tabled(rename = "Domain")]
    name: String,
}

impl From<&AllowedDomain> for DomainRow {
    fn from(d: &AllowedDomain) -> Self {
        Self { name: d.clone() }
    }
}

pub(super) fn render(format: &OutputFormat, domains: &[AllowedDomain]) -> String {
    let screen: Vec<_> = aggregate::top_down(domains).collect();
    output::render_list(
        format,
        &screen,
        |d| DomainRow::from(*d),
        |d| (*d).clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DomainsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DomainsCommand::List => {
            let domains = controller.allowed_domains().await?;
            output::print_output(&render(&global.output, &domains), global.quiet);
            Ok(())
        }

        DomainsCommand::Add { name } => {
            let dashboard = util::with_progress(
                controller,
                global,
                controller.add_allowed_domain(&name),
            )
            .await?;
            output::notice(format!("Allowed '{}'", name.trim()), global.quiet);
            output::print_output(
                &render(&global.output, &dashboard.allowed_domains),
                global.quiet,
            );
            Ok(())
        }

        DomainsCommand::Remove { name } => {
            if !util::confirm(
                &format!("Remove '{}' from the allow-list?", name.trim()),
                global.yes,
            )? {
                return Ok(());
            }
            let dashboard = util::with_progress(
                controller,
                global,
                controller.delete_allowed_domain(&name),
            )
            .await?;
            output::notice(format!("Removed '{}'", name.trim()), global.quiet);
            output::print_output(
                &render(&global.output, &dashboard.allowed_domains),
                global.quiet,
            );
            Ok(())
        }
    }
}
