use clap::Args;
use colored::Colorize;
use modplan_descriptor::Visibility;
use modplan_resolver::{plan, DependencyGraph, ResolvedModule};
use std::sync::Arc;

use crate::common::{GlobalOpts, PlanArgs};
use crate::errors::CliError;

#[derive(Args, Debug, Clone)]
pub struct GraphCommand {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Only show this module
    #[arg(short, long)]
    pub module: Option<String>,
}

/// Print dependencies, dependents and visible modules for each module
pub fn handle_graph(cmd: GraphCommand, opts: &GlobalOpts) -> Result<(), CliError> {
    let (set, settings) = cmd.plan.load()?;
    let graph = plan(&set, &settings.context(), settings.plan_options())?;

    match cmd.module {
        Some(name) => {
            let module = graph
                .get(&name)
                .ok_or_else(|| CliError::ModuleNotFound(name.clone()))?;
            print_module(&graph, module);
        }
        None => {
            for module in graph.iter_build_order() {
                if module.external && opts.verbosity_level() == 0 {
                    continue;
                }
                print_module(&graph, module);
            }
        }
    }
    Ok(())
}

fn print_module(graph: &DependencyGraph, module: &ResolvedModule) {
    let mut heading = module.name.bold().to_string();
    if let Some(target) = module.target_restriction {
        heading.push_str(&format!(" {}", format!("[{} only]", target).dimmed()));
    }
    if module.external {
        heading.push_str(&format!(" {}", "(external)".dimmed()));
    }
    println!("{}", heading);

    for visibility in Visibility::ALL {
        print_list(visibility.as_str(), module.deps(visibility).iter());
    }
    let dependents = graph.dependents_of(&module.name);
    print_list("dependents", dependents.iter().map(|(name, _)| name));
    if let Some(visible) = graph.visible_modules(&module.name) {
        print_list("visible", visible.iter());
    }
    println!();
}

fn print_list<'a>(label: &str, names: impl Iterator<Item = &'a Arc<str>>) {
    let names: Vec<&str> = names.map(|name| name.as_ref()).collect();
    let value = if names.is_empty() {
        "-".dimmed().to_string()
    } else {
        names.join(", ")
    };
    let label = format!("{:<12}", format!("{}:", label));
    println!("  {} {}", label.cyan(), value);
}
