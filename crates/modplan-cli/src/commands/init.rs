use clap::Args;
use colored::Colorize;
use modplan_logger as logger;
use std::fs;
use std::path::PathBuf;

use crate::common::GlobalOpts;
use crate::errors::CliError;

pub const DEFAULT_FILENAME: &str = "plugin.module.toml";

pub const DESCRIPTOR_TEMPLATE: &str = r#"# Build-module descriptors for one plugin
#
# Every [[module]] table declares one module. Dependencies are grouped by
# visibility:
#   public   re-exported to every module that depends on this one
#   private  used internally and hidden from dependents
#   dynamic  loaded at runtime, never linked and ignored by cycle checks
#
# An entry is either a module name or a table gated on the engine version:
#   { name = "LevelEditor", min_engine_version = "5.0" }
#   { name = "LegacyTools", max_engine_version_exclusive = "5.0" }

# Modules provided by the engine rather than declared here
[external]
modules = [
    "Core",
    "CoreUObject",
    "Engine",
    "Slate",
    "SlateCore",
    "UnrealEd",
    "EditorFramework",
    "LevelEditor",
]

[[module]]
name = "MyPlugin"
pch_usage = "explicit-or-shared"

[module.include_paths]
public = ["Public"]
private = ["Private"]

[module.dependencies]
public = ["Core"]
private = ["CoreUObject", "Engine"]

[[module]]
name = "MyPluginEditor"
# Building any other target type with this module is an error
target = "editor"
pch_usage = "explicit-or-shared"

[module.dependencies]
public = ["Core"]
private = [
    "CoreUObject",
    "Engine",
    "Slate",
    "SlateCore",
    "UnrealEd",
    "MyPlugin",
    { name = "EditorFramework", min_engine_version = "5.0" },
    { name = "LevelEditor", min_engine_version = "5.0" },
]
"#;

#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Descriptor file to create (default: plugin.module.toml)
    pub file: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

/// Write a starter descriptor document
pub fn handle_init(cmd: InitCommand, _opts: &GlobalOpts) -> Result<(), CliError> {
    let target = cmd.file.unwrap_or_else(|| PathBuf::from(DEFAULT_FILENAME));
    logger::debug(&format!("Target file: {}", target.display()));

    if target.exists() && !cmd.force {
        return Err(CliError::AlreadyExists(target));
    }

    fs::write(&target, DESCRIPTOR_TEMPLATE).map_err(|source| CliError::Write {
        path: target.clone(),
        source,
    })?;
    logger::success(&format!("Created descriptor file: {}", target.display()));

    println!();
    println!("Next steps:");
    println!(
        "  1. Rename the modules in {} and list their dependencies",
        target.display().to_string().bold()
    );
    println!("  2. Check each module: modplan check {}", target.display());
    println!("  3. Print the build order: modplan resolve {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modplan_descriptor::{parse_document, TargetType};
    use std::path::Path;

    #[test]
    fn test_default_filename_is_discoverable() {
        assert!(DEFAULT_FILENAME.ends_with(modplan_descriptor::DESCRIPTOR_SUFFIX));
    }

    #[test]
    fn test_template_parses() {
        let document = parse_document(DESCRIPTOR_TEMPLATE, Path::new(DEFAULT_FILENAME));
        assert!(document.is_ok_and(|doc| doc.modules.len() == 2
            && doc.external.modules.len() == 8
            && doc.modules[1].target_restriction == Some(TargetType::Editor)));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let Ok(dir) = tempfile::TempDir::new() else {
            return;
        };
        let path = dir.path().join(DEFAULT_FILENAME);
        let _ = fs::write(&path, "# keep me\n");

        let cmd = InitCommand {
            file: Some(path.clone()),
            force: false,
        };
        assert!(matches!(
            handle_init(cmd, &GlobalOpts::default()),
            Err(CliError::AlreadyExists(_))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap_or_default(), "# keep me\n");
    }
}
