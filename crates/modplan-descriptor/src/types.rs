//! Declared module metadata
//!
//! These types mirror what a module descriptor document states and nothing
//! more. Version conditions are carried unevaluated and the target restriction
//! is not checked here; both happen during resolution.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::DescriptorError;

// =============================================================================
// TARGET TYPE
// =============================================================================

/// Kind of build output a target produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Editor,
    Game,
    Server,
    Program,
    Client,
}

impl TargetType {
    pub const ALL: [TargetType; 5] = [
        TargetType::Editor,
        TargetType::Game,
        TargetType::Server,
        TargetType::Program,
        TargetType::Client,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Editor => "editor",
            TargetType::Game => "game",
            TargetType::Server => "server",
            TargetType::Program => "program",
            TargetType::Client => "client",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TargetType::ALL
            .into_iter()
            .find(|target| target.as_str() == wanted)
            .ok_or_else(|| DescriptorError::InvalidTarget(s.to_string()))
    }
}

// =============================================================================
// ENGINE VERSION
// =============================================================================

/// Host engine version, ordered by `(major, minor)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        EngineVersion { major, minor }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for EngineVersion {
    type Err = DescriptorError;

    /// Parses `MAJOR.MINOR`; a bare `MAJOR` means `MAJOR.0`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DescriptorError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        let (major, minor) = match trimmed.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (trimmed, "0"),
        };
        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let minor = minor.parse::<u32>().map_err(|_| invalid())?;
        Ok(EngineVersion { major, minor })
    }
}

impl TryFrom<String> for EngineVersion {
    type Error = DescriptorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EngineVersion> for String {
    fn from(version: EngineVersion) -> Self {
        version.to_string()
    }
}

// =============================================================================
// VERSION CONDITION
// =============================================================================

/// Predicate over the engine version gating a dependency or include path
///
/// `min` is an inclusive lower bound and stays satisfied for every later
/// minor and major. `below` is an exclusive upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VersionCondition {
    pub min: Option<EngineVersion>,
    pub below: Option<EngineVersion>,
}

impl VersionCondition {
    pub fn at_least(version: EngineVersion) -> Self {
        VersionCondition {
            min: Some(version),
            below: None,
        }
    }

    pub fn below(version: EngineVersion) -> Self {
        VersionCondition {
            min: None,
            below: Some(version),
        }
    }

    pub fn holds(&self, version: EngineVersion) -> bool {
        self.min.map_or(true, |min| version >= min) && self.below.map_or(true, |below| version < below)
    }

    fn from_bounds(min: Option<EngineVersion>, below: Option<EngineVersion>) -> Option<Self> {
        if min.is_none() && below.is_none() {
            None
        } else {
            Some(VersionCondition { min, below })
        }
    }
}

// =============================================================================
// MODULE REF
// =============================================================================

/// Reference to another module, optionally gated on the engine version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawModuleRef", into = "RawModuleRef")]
pub struct ModuleRef {
    pub target_name: Arc<str>,
    pub version_condition: Option<VersionCondition>,
}

impl ModuleRef {
    pub fn new(target_name: impl Into<Arc<str>>) -> Self {
        ModuleRef {
            target_name: target_name.into(),
            version_condition: None,
        }
    }

    /// Reference that only applies from `min` onwards
    pub fn since(target_name: impl Into<Arc<str>>, min: EngineVersion) -> Self {
        ModuleRef::new(target_name).with_condition(VersionCondition::at_least(min))
    }

    pub fn with_condition(mut self, condition: VersionCondition) -> Self {
        self.version_condition = Some(condition);
        self
    }

    pub fn is_unconditional(&self) -> bool {
        self.version_condition.is_none()
    }

    pub fn applies_to(&self, version: EngineVersion) -> bool {
        self.version_condition
            .map_or(true, |condition| condition.holds(version))
    }
}

impl From<&str> for ModuleRef {
    fn from(name: &str) -> Self {
        ModuleRef::new(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawModuleRef {
    Name(Arc<str>),
    Conditional(ConditionalRef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionalRef {
    name: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_engine_version: Option<EngineVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_engine_version_exclusive: Option<EngineVersion>,
}

impl From<RawModuleRef> for ModuleRef {
    fn from(raw: RawModuleRef) -> Self {
        match raw {
            RawModuleRef::Name(name) => ModuleRef::new(name),
            RawModuleRef::Conditional(entry) => ModuleRef {
                target_name: entry.name,
                version_condition: VersionCondition::from_bounds(
                    entry.min_engine_version,
                    entry.max_engine_version_exclusive,
                ),
            },
        }
    }
}

impl From<ModuleRef> for RawModuleRef {
    fn from(module_ref: ModuleRef) -> Self {
        match module_ref.version_condition {
            None => RawModuleRef::Name(module_ref.target_name),
            Some(condition) => RawModuleRef::Conditional(ConditionalRef {
                name: module_ref.target_name,
                min_engine_version: condition.min,
                max_engine_version_exclusive: condition.below,
            }),
        }
    }
}

// =============================================================================
// INCLUDE PATH
// =============================================================================

/// Include directory exposed by a module, optionally version-gated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawIncludePath", into = "RawIncludePath")]
pub struct IncludePath {
    pub path: String,
    pub version_condition: Option<VersionCondition>,
}

impl IncludePath {
    pub fn new(path: impl Into<String>) -> Self {
        IncludePath {
            path: path.into(),
            version_condition: None,
        }
    }

    pub fn with_condition(mut self, condition: VersionCondition) -> Self {
        self.version_condition = Some(condition);
        self
    }

    pub fn applies_to(&self, version: EngineVersion) -> bool {
        self.version_condition
            .map_or(true, |condition| condition.holds(version))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawIncludePath {
    Path(String),
    Conditional(ConditionalPath),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionalPath {
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_engine_version: Option<EngineVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_engine_version_exclusive: Option<EngineVersion>,
}

impl From<RawIncludePath> for IncludePath {
    fn from(raw: RawIncludePath) -> Self {
        match raw {
            RawIncludePath::Path(path) => IncludePath::new(path),
            RawIncludePath::Conditional(entry) => IncludePath {
                path: entry.path,
                version_condition: VersionCondition::from_bounds(
                    entry.min_engine_version,
                    entry.max_engine_version_exclusive,
                ),
            },
        }
    }
}

impl From<IncludePath> for RawIncludePath {
    fn from(include: IncludePath) -> Self {
        match include.version_condition {
            None => RawIncludePath::Path(include.path),
            Some(condition) => RawIncludePath::Conditional(ConditionalPath {
                path: include.path,
                min_engine_version: condition.min,
                max_engine_version_exclusive: condition.below,
            }),
        }
    }
}

// =============================================================================
// VISIBILITY
// =============================================================================

/// Link visibility class of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Dynamic,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Public, Visibility::Private, Visibility::Dynamic];

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Dynamic => "dynamic",
        }
    }

    /// Whether the edge is a link-time edge (public or private)
    pub fn is_static(self) -> bool {
        !matches!(self, Visibility::Dynamic)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PCH USAGE
// =============================================================================

/// Precompiled header policy, passed through to the build plan untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PchUsage {
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "use-shared")]
    UseSharedPchs,
    #[serde(rename = "explicit-or-shared")]
    UseExplicitOrSharedPchs,
    #[serde(rename = "no-pch")]
    NoPchs,
}

impl PchUsage {
    pub fn as_str(self) -> &'static str {
        match self {
            PchUsage::Default => "default",
            PchUsage::UseSharedPchs => "use-shared",
            PchUsage::UseExplicitOrSharedPchs => "explicit-or-shared",
            PchUsage::NoPchs => "no-pch",
        }
    }
}

impl fmt::Display for PchUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MODULE DESCRIPTOR
// =============================================================================

/// Public and private include path lists, in declared order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludePaths {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public: Vec<IncludePath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private: Vec<IncludePath>,
}

/// Declared dependency lists, one per visibility class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependencies {
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub public: SmallVec<[ModuleRef; 8]>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub private: SmallVec<[ModuleRef; 8]>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub dynamic: SmallVec<[ModuleRef; 8]>,
}

impl Dependencies {
    pub fn of(&self, visibility: Visibility) -> &[ModuleRef] {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Private => &self.private,
            Visibility::Dynamic => &self.dynamic,
        }
    }

    /// Every declared reference tagged with its visibility class
    pub fn iter(&self) -> impl Iterator<Item = (Visibility, &ModuleRef)> {
        Visibility::ALL
            .into_iter()
            .flat_map(move |visibility| self.of(visibility).iter().map(move |r| (visibility, r)))
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty() && self.dynamic.is_empty()
    }
}

/// Immutable declared metadata of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescriptor {
    pub name: Arc<str>,
    #[serde(default, rename = "target", skip_serializing_if = "Option::is_none")]
    pub target_restriction: Option<TargetType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pch_usage: Option<PchUsage>,
    #[serde(default)]
    pub include_paths: IncludePaths,
    #[serde(default)]
    pub dependencies: Dependencies,

    /// Runtime only - set for leaf modules supplied by the host engine
    #[serde(skip)]
    pub external: bool,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        ModuleDescriptor {
            name: name.into(),
            target_restriction: None,
            pch_usage: None,
            include_paths: IncludePaths::default(),
            dependencies: Dependencies::default(),
            external: false,
        }
    }

    /// Leaf module provided by the host engine
    pub fn external(name: impl Into<Arc<str>>) -> Self {
        ModuleDescriptor {
            external: true,
            ..ModuleDescriptor::new(name)
        }
    }

    pub fn restricted_to(mut self, target: TargetType) -> Self {
        self.target_restriction = Some(target);
        self
    }

    pub fn with_pch_usage(mut self, pch_usage: PchUsage) -> Self {
        self.pch_usage = Some(pch_usage);
        self
    }

    pub fn public(mut self, dependency: impl Into<ModuleRef>) -> Self {
        self.dependencies.public.push(dependency.into());
        self
    }

    pub fn private(mut self, dependency: impl Into<ModuleRef>) -> Self {
        self.dependencies.private.push(dependency.into());
        self
    }

    pub fn dynamic(mut self, dependency: impl Into<ModuleRef>) -> Self {
        self.dependencies.dynamic.push(dependency.into());
        self
    }

    pub fn public_include(mut self, include: IncludePath) -> Self {
        self.include_paths.public.push(include);
        self
    }

    pub fn private_include(mut self, include: IncludePath) -> Self {
        self.include_paths.private.push(include);
        self
    }
}

// =============================================================================
// DESCRIPTOR DOCUMENT
// =============================================================================

/// Modules supplied by the host engine rather than declared in the plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalModules {
    #[serde(default)]
    pub modules: Vec<Arc<str>>,
}

impl ExternalModules {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// One `*.module.toml` file: optional external module list plus module tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorDocument {
    #[serde(default, skip_serializing_if = "ExternalModules::is_empty")]
    pub external: ExternalModules,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version_parsing() {
        assert!("5.1"
            .parse::<EngineVersion>()
            .is_ok_and(|v| v == EngineVersion::new(5, 1)));
        assert!("4"
            .parse::<EngineVersion>()
            .is_ok_and(|v| v == EngineVersion::new(4, 0)));
        assert!(" 5.27 "
            .parse::<EngineVersion>()
            .is_ok_and(|v| v == EngineVersion::new(5, 27)));
        assert!("5.x".parse::<EngineVersion>().is_err());
        assert!("5.1.2".parse::<EngineVersion>().is_err());
        assert!("".parse::<EngineVersion>().is_err());
    }

    #[test]
    fn test_engine_version_ordering() {
        assert!(EngineVersion::new(5, 0) > EngineVersion::new(4, 27));
        assert!(EngineVersion::new(5, 10) > EngineVersion::new(5, 9));
        assert!(EngineVersion::new(6, 0) > EngineVersion::new(5, 99));
    }

    #[test]
    fn test_condition_lower_bound_is_open_ended() {
        let condition = VersionCondition::at_least(EngineVersion::new(5, 0));
        assert!(!condition.holds(EngineVersion::new(4, 27)));
        assert!(condition.holds(EngineVersion::new(5, 0)));
        assert!(condition.holds(EngineVersion::new(5, 3)));
        assert!(condition.holds(EngineVersion::new(6, 0)));
    }

    #[test]
    fn test_condition_upper_bound_is_exclusive() {
        let condition = VersionCondition {
            min: Some(EngineVersion::new(4, 26)),
            below: Some(EngineVersion::new(5, 0)),
        };
        assert!(condition.holds(EngineVersion::new(4, 27)));
        assert!(!condition.holds(EngineVersion::new(5, 0)));
        assert!(!condition.holds(EngineVersion::new(4, 25)));
    }

    #[test]
    fn test_only_dynamic_edges_are_not_static() {
        assert!(Visibility::Public.is_static());
        assert!(Visibility::Private.is_static());
        assert!(!Visibility::Dynamic.is_static());
    }

    #[test]
    fn test_target_type_parsing_is_case_insensitive() {
        assert!("Editor"
            .parse::<TargetType>()
            .is_ok_and(|t| t == TargetType::Editor));
        assert!("SERVER"
            .parse::<TargetType>()
            .is_ok_and(|t| t == TargetType::Server));
        assert!("shipping".parse::<TargetType>().is_err());
    }

    #[test]
    fn test_module_ref_accepts_bare_name_and_table() {
        let doc: Result<Dependencies, _> = toml::from_str(
            r#"
public = ["Core", { name = "EditorFramework", min_engine_version = "5.0" }]
"#,
        );
        let Ok(deps) = doc else {
            panic!("dependencies should parse");
        };
        assert_eq!(deps.public.len(), 2);
        assert!(deps.public[0].is_unconditional());
        assert_eq!(deps.public[1].target_name.as_ref(), "EditorFramework");
        assert_eq!(
            deps.public[1].version_condition,
            Some(VersionCondition::at_least(EngineVersion::new(5, 0)))
        );
    }

    #[test]
    fn test_module_ref_table_without_bounds_is_unconditional() {
        let doc: Result<Dependencies, _> = toml::from_str(r#"private = [{ name = "Slate" }]"#);
        assert!(doc.is_ok_and(|deps| deps.private[0].is_unconditional()));
    }

    #[test]
    fn test_module_ref_rejects_unknown_keys() {
        let doc: Result<Dependencies, _> =
            toml::from_str(r#"public = [{ name = "Core", min_version = "5.0" }]"#);
        assert!(doc.is_err());
    }

    #[test]
    fn test_descriptor_rejects_misspelled_section() {
        let doc: Result<ModuleDescriptor, _> = toml::from_str(
            r#"
name = "Broken"
[dependancies]
public = ["Core"]
"#,
        );
        assert!(doc.is_err());
    }

    #[test]
    fn test_dependencies_iter_tags_visibility() {
        let descriptor = ModuleDescriptor::new("Editor")
            .public("Core")
            .private("Engine")
            .dynamic("HotReloadTool");
        let tagged: Vec<(Visibility, &str)> = descriptor
            .dependencies
            .iter()
            .map(|(visibility, r)| (visibility, r.target_name.as_ref()))
            .collect();
        assert_eq!(
            tagged,
            vec![
                (Visibility::Public, "Core"),
                (Visibility::Private, "Engine"),
                (Visibility::Dynamic, "HotReloadTool"),
            ]
        );
    }

    #[test]
    fn test_conditional_ref_serializes_back_to_table() {
        let deps = Dependencies {
            public: SmallVec::from_vec(vec![
                ModuleRef::new("Core"),
                ModuleRef::since("LevelEditor", EngineVersion::new(5, 0)),
            ]),
            ..Dependencies::default()
        };
        let Ok(text) = toml::to_string(&deps) else {
            panic!("dependencies should serialize");
        };
        assert!(text.contains("\"Core\""));
        assert!(text.contains("min_engine_version = \"5.0\""));
    }
}
