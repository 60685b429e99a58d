use clap::Args;
use colored::Colorize;
use modplan_logger as logger;
use modplan_resolver::{resolve_modules, PlanError};

use crate::common::{GlobalOpts, PlanArgs};
use crate::errors::CliError;
use crate::report::format_error;

#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    #[command(flatten)]
    pub plan: PlanArgs,
}

/// Validate and resolve each module on its own, without assembling a graph
pub fn handle_check(cmd: CheckCommand, opts: &GlobalOpts) -> Result<(), CliError> {
    let (set, settings) = cmd.plan.load()?;
    let context = settings.context();
    let results = resolve_modules(&set, &context, settings.plan_options());

    println!("{} ({}):", "Module check".bold().green(), context);
    for module in &results.resolved {
        if module.external && opts.verbosity_level() == 0 {
            continue;
        }
        println!(
            "  {} {} {}",
            "\u{2714}".green(),
            module.name,
            format!(
                "({} public, {} private, {} dynamic)",
                module.deps_public.len(),
                module.deps_private.len(),
                module.deps_dynamic.len()
            )
            .dimmed()
        );
    }
    for err in &results.errors {
        println!("  {} {}", "\u{2717}".red(), format_error(err));
    }

    let checked = results.resolved.len() + results.errors.len();
    if checked < set.len() {
        logger::warn(&format!(
            "Stopped after {} of {} module(s)",
            checked,
            set.len()
        ));
    }

    if results.is_clean() {
        logger::success(&format!("{} module(s) passed", results.resolved.len()));
        Ok(())
    } else {
        Err(PlanError::new(results.errors).into())
    }
}
