//! Explicit schema registry.
//!
//! The registry is handed to the codec by the caller; there is no implicit
//! global template directory. Reloading a template replaces the previous
//! entry. A SHA-256 fingerprint over the loaded sources lets callers detect
//! template-set drift between runs.

use std::collections::HashMap;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{CodecError, CodecResult};
use crate::schema::Schema;

/// File extension of template files picked up by `load_dir`.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Identity of a loaded template set.
pub type RegistryFingerprint = [u8; 32];

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
    fingerprint: Option<RegistryFingerprint>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its declared name, replacing and returning
    /// any previous schema of that name.
    pub fn insert(&mut self, schema: Schema) -> Option<Schema> {
        self.schemas.insert(schema.name.clone(), schema)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// SHA-256 over the template sources, present when the registry was
    /// built by `load_dir`.
    pub fn fingerprint(&self) -> Option<RegistryFingerprint> {
        self.fingerprint
    }

    /// Builds a registry from every `*.tmpl` file under `root`, in sorted
    /// path order.
    ///
    /// # Errors
    /// Unreadable directories or files, and any template that fails to
    /// parse.
    pub fn load_dir(root: &Path) -> CodecResult<Self> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(std::io::Error::other)?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION)
            {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();

        let mut registry = Self::new();
        let mut hasher = Sha256::new();
        for path in paths {
            let source = std::fs::read_to_string(&path)?;
            hasher.update(source.as_bytes());
            let schema = Schema::parse(&source)
                .map_err(|err| CodecError::Schema(format!("{}: {err}", path.display())))?;
            tracing::debug!(schema = %schema.name, path = %path.display(), "loaded template");
            if registry.insert(schema).is_some() {
                tracing::warn!(path = %path.display(), "template replaces an earlier schema of the same name");
            }
        }
        registry.fingerprint = Some(hasher.finalize().into());
        tracing::info!(count = registry.len(), "template registry loaded");
        Ok(registry)
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
