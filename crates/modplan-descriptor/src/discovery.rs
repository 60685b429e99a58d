//! Descriptor document discovery and loading
//!
//! A path given on the command line is either a single descriptor document or
//! a directory that is walked for `*.module.toml` files. Documents are loaded
//! in sorted path order so duplicate-name errors are reported consistently.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::errors::DescriptorError;
use crate::module_set::ModuleSet;
use crate::types::DescriptorDocument;

/// File name suffix of descriptor documents
pub const DESCRIPTOR_SUFFIX: &str = ".module.toml";

/// Directories never searched for descriptors
const IGNORED_DIRS: &[&str] = &["target", "Binaries", "Intermediate", "node_modules"];

/// Parse descriptor document text; `origin` is only used for error messages
pub fn parse_document(content: &str, origin: &Path) -> Result<DescriptorDocument, DescriptorError> {
    toml::from_str(content).map_err(|source| DescriptorError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

/// Read and parse a single descriptor document
pub fn load_document(path: &Path) -> Result<DescriptorDocument, DescriptorError> {
    debug!("Reading descriptor document: {:?}", path);
    let content = fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, path)
}

/// Expand a file or directory into the descriptor documents it contains
pub fn discover(root: &Path) -> Result<Vec<PathBuf>, DescriptorError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        return Err(DescriptorError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        });
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_descriptor_file(entry.path()) {
            found.push(entry.into_path());
        }
    }

    if found.is_empty() {
        return Err(DescriptorError::NoDescriptors(root.to_path_buf()));
    }
    found.sort();
    Ok(found)
}

/// Discover and load every document under `roots` into one module set
pub fn load_module_set(roots: &[PathBuf]) -> Result<ModuleSet, DescriptorError> {
    let start = Instant::now();
    let mut documents = Vec::new();
    for root in roots {
        for path in discover(root)? {
            documents.push(canonical(&path)?);
        }
    }
    documents.sort();
    documents.dedup();

    let mut set = ModuleSet::new();
    for path in &documents {
        set.extend_from_document(load_document(path)?)?;
    }

    info!(
        "Loaded {} module(s) ({} external) from {} document(s) in {:.2}ms",
        set.len(),
        set.external_count(),
        documents.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(set)
}

/// Absolute, symlink-free form so one file reached two ways loads once
fn canonical(path: &Path) -> Result<PathBuf, DescriptorError> {
    fs::canonicalize(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_descriptor_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DESCRIPTOR_SUFFIX))
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || IGNORED_DIRS.contains(&name.as_ref())
}
