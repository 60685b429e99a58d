use clap::Args;
use colored::Colorize;
use modplan_logger as logger;
use modplan_resolver::{plan, BuildPlan};
use tracing::debug;

use crate::common::{GlobalOpts, PlanArgs};
use crate::errors::CliError;
use crate::report::ErrorReport;

#[derive(Args, Debug, Clone)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Print the full build plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Resolve descriptors and print the build order
pub fn handle_resolve(cmd: ResolveCommand, _opts: &GlobalOpts) -> Result<(), CliError> {
    let (set, settings) = cmd.plan.load()?;
    let context = settings.context();

    logger::spinner_start(&format!("Resolving {} module(s) for {}", set.len(), context));
    let graph = match plan(&set, &context, settings.plan_options()) {
        Ok(graph) => graph,
        Err(err) => {
            logger::spinner_error("Resolution failed");
            if cmd.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ErrorReport::from_plan_error(&err))?
                );
            }
            return Err(err.into());
        }
    };
    logger::spinner_success(&format!("Resolved {} module(s)", graph.len()));
    debug!(
        "Graph has {} edge(s); first module {:?}",
        graph.edges().len(),
        graph.build_order().first()
    );

    if cmd.json {
        let build_plan = BuildPlan::from_graph(&graph, context);
        println!("{}", serde_json::to_string_pretty(&build_plan)?);
        return Ok(());
    }

    println!("{} ({}):", "Build order".bold().green(), context);
    for (index, module) in graph.iter_build_order().enumerate() {
        if module.external {
            println!("  {:>3}. {} {}", index + 1, module.name, "(external)".dimmed());
        } else {
            println!("  {:>3}. {}", index + 1, module.name.bold());
        }
    }
    Ok(())
}
