//! Parsing of complete descriptor documents

use modplan_descriptor::{
    parse_document, EngineVersion, ModuleSet, PchUsage, TargetType, VersionCondition, Visibility,
};
use std::path::Path;

const TETHER_PLUGIN: &str = r#"
[external]
modules = [
    "Core", "CoreUObject", "Engine", "Slate", "SlateCore", "UnrealEd",
    "EditorFramework", "EditorSubsystem", "LevelEditor",
]

[[module]]
name = "Tether"
pch_usage = "explicit-or-shared"

[module.dependencies]
public = ["Core"]
private = ["CoreUObject", "Engine"]

[[module]]
name = "TetherEditor"
target = "editor"
pch_usage = "explicit-or-shared"

[module.include_paths]
public = ["Public"]
private = ["Private", { path = "Private/UE4", max_engine_version_exclusive = "5.0" }]

[module.dependencies]
public = ["Core"]
private = [
    "Engine",
    "Slate",
    "SlateCore",
    "UnrealEd",
    "Tether",
    { name = "EditorFramework", min_engine_version = "5.0" },
    { name = "EditorSubsystem", min_engine_version = "5.0" },
    { name = "LevelEditor", min_engine_version = "5.0" },
]
"#;

#[test]
fn test_tether_plugin_document() {
    let Ok(document) = parse_document(TETHER_PLUGIN, Path::new("Tether.module.toml")) else {
        panic!("document should parse");
    };
    assert_eq!(document.external.modules.len(), 9);
    assert_eq!(document.modules.len(), 2);

    let editor = &document.modules[1];
    assert_eq!(editor.name.as_ref(), "TetherEditor");
    assert_eq!(editor.target_restriction, Some(TargetType::Editor));
    assert_eq!(editor.pch_usage, Some(PchUsage::UseExplicitOrSharedPchs));
    assert_eq!(editor.include_paths.public.len(), 1);
    assert_eq!(
        editor.include_paths.private[1].version_condition,
        Some(VersionCondition::below(EngineVersion::new(5, 0)))
    );

    let gated: Vec<&str> = editor
        .dependencies
        .iter()
        .filter(|(visibility, r)| *visibility == Visibility::Private && !r.is_unconditional())
        .map(|(_, r)| r.target_name.as_ref())
        .collect();
    assert_eq!(gated, vec!["EditorFramework", "EditorSubsystem", "LevelEditor"]);
}

#[test]
fn test_tether_plugin_module_set() {
    let Ok(document) = parse_document(TETHER_PLUGIN, Path::new("Tether.module.toml")) else {
        panic!("document should parse");
    };
    let mut set = ModuleSet::new();
    assert!(set.extend_from_document(document).is_ok());
    assert_eq!(set.len(), 11);
    assert_eq!(set.declared().count(), 2);
    assert!(set.get("Engine").is_some_and(|d| d.external));
    assert!(set.get("Tether").is_some_and(|d| !d.external));
}

#[test]
fn test_invalid_target_is_a_parse_error() {
    let result = parse_document(
        "[[module]]\nname = \"Broken\"\ntarget = \"shipping\"\n",
        Path::new("Broken.module.toml"),
    );
    assert!(result.is_err());
}

#[test]
fn test_invalid_version_is_a_parse_error() {
    let result = parse_document(
        "[[module]]\nname = \"Broken\"\n[module.dependencies]\npublic = [{ name = \"Core\", min_engine_version = \"five\" }]\n",
        Path::new("Broken.module.toml"),
    );
    assert!(result.is_err());
}
