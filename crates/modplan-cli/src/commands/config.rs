use clap::Subcommand;
use colored::Colorize;
use modplan_config::Config;
use modplan_logger as logger;
use std::path::PathBuf;

use crate::common::GlobalOpts;
use crate::errors::CliError;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Print one value
    Get { key: String },
    /// Store a value (default-target, engine-version, resolution-mode, visibility-policy)
    Set { key: String, value: String },
    /// Remove a value so the built-in default applies
    Unset { key: String },
    /// Print the config file path, or redirect it with NEW_PATH
    Path { new_path: Option<PathBuf> },
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => logger::info(&format!("{} is not set", key)),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let path = config.save()?;
            logger::debug(&format!("Saved config to {}", path.display()));
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load()?;
            config.unset(&key)?;
            config.save()?;
            logger::success(&format!("Unset {}", key));
        }
        ConfigAction::Path { new_path } => match new_path {
            Some(path) => {
                let pointer = Config::set_pointer(&path)?;
                logger::debug(&format!("Wrote pointer file {}", pointer.display()));
                logger::success(&format!("Config path set to {}", path.display()));
            }
            None => {
                let path = Config::path()?;
                println!("{}", path.display());
                if std::env::var_os(modplan_config::CONFIG_ENV).is_none() {
                    if let Ok((_, Some(target))) = Config::pointer() {
                        println!("{} {}", "overridden-by".cyan(), target.display());
                    }
                }
            }
        },
    }
    Ok(())
}
