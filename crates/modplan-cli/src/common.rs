//! Options shared across commands

use clap::{Args, Parser};
use modplan_config::{Config, Settings};
use modplan_descriptor::{load_module_set, EngineVersion, ModuleSet, TargetType};
use modplan_logger as logger;
use modplan_resolver::{ResolutionMode, VisibilityPolicy};
use std::path::PathBuf;

use crate::errors::CliError;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only print results and errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Effective verbosity level
    /// - 0: warnings only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Descriptor inputs and target overrides for commands that resolve
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Descriptor files or directories to search for *.module.toml
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Build target type (editor, game, server, program, client)
    #[arg(short, long)]
    pub target: Option<TargetType>,

    /// Engine version as MAJOR.MINOR
    #[arg(short, long)]
    pub engine_version: Option<EngineVersion>,

    /// Stop at the first error instead of reporting all of them
    #[arg(long)]
    pub fail_fast: bool,

    /// Treat a dependency listed as both public and private as public
    #[arg(long)]
    pub allow_shared_visibility: bool,
}

impl PlanArgs {
    /// Config values with command-line overrides applied
    pub fn settings(&self, config: &Config) -> Settings {
        let mut settings = config.settings();
        if let Some(target) = self.target {
            settings.target_type = target;
        }
        if let Some(version) = self.engine_version {
            settings.engine_version = version;
        }
        if self.fail_fast {
            settings.mode = ResolutionMode::FailFast;
        }
        if self.allow_shared_visibility {
            settings.visibility = VisibilityPolicy::PreferPublic;
        }
        settings
    }

    /// Load the user config and every descriptor named on the command line
    pub fn load(&self) -> Result<(ModuleSet, Settings), CliError> {
        let config = Config::load()?;
        let settings = self.settings(&config);
        logger::debug(&format!(
            "Settings: {} target, engine {}, {} mode, {} visibility",
            settings.target_type, settings.engine_version, settings.mode, settings.visibility
        ));

        let set = load_module_set(&self.paths)?;
        logger::info(&format!(
            "Loaded {} module(s) ({} external) from {} path(s)",
            set.len(),
            set.external_count(),
            self.paths.len()
        ));
        Ok((set, settings))
    }
}
