use clap::{Parser, Subcommand};
use modplan::{
    commands::{
        check::{self, CheckCommand},
        config::{self, ConfigAction},
        graph::{self, GraphCommand},
        init::{self, InitCommand},
        resolve::{self, ResolveCommand},
    },
    report, tracing_setup, CliError, GlobalOpts,
};
use modplan_config::Config;
use modplan_logger as logger;

#[derive(Parser)]
#[command(name = "modplan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Plugin build-module dependency resolver",
    long_about = "modplan validates build-module descriptors against a target, resolves \
                  engine-version conditions and prints a dependency-ordered build plan."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve descriptors and print the build order
    Resolve(ResolveCommand),
    /// Validate and resolve each module without assembling the graph
    Check(CheckCommand),
    /// Show dependencies, dependents and visible modules
    Graph(GraphCommand),
    /// Create a starter descriptor file
    Init(InitCommand),
    /// Manage modplan configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let verbosity = cli.global.verbosity_level();

    // Session log lives next to the config file
    let log_dir = Config::path()
        .ok()
        .and_then(|path| path.parent().map(std::path::Path::to_path_buf));
    if let Err(e) = logger::init_with_verbosity(verbosity, cli.global.quiet, log_dir.as_deref()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    tracing_setup::init_tracing(verbosity, cli.global.quiet);

    let result = match cli.command {
        Commands::Resolve(cmd) => resolve::handle_resolve(cmd, &cli.global),
        Commands::Check(cmd) => check::handle_check(cmd, &cli.global),
        Commands::Graph(cmd) => graph::handle_graph(cmd, &cli.global),
        Commands::Init(cmd) => init::handle_init(cmd, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn fail(err: &CliError) -> ! {
    match err.plan_errors() {
        Some(plan_error) => report::report_plan_error(plan_error),
        None => logger::error(&err.to_string()),
    }
    if logger::get_verbosity() > 0 {
        logger::show_log_path();
    }
    std::process::exit(1);
}
