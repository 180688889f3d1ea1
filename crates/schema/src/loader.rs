//! Locating and loading schema documents.
//!
//! Schemas are read from local JSON or JSONC files only. A [`SchemaSpec`]
//! names a schema by version and library; the [`SchemaLoader`] turns specs
//! into built [`Schema`] values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hed_toolchain_jsonc_strip::strip_jsonc;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::SchemaError;
use crate::source::SchemaSource;
use crate::{Schema, Schemas};

const EXTENSIONS: &[&str] = &["json", "jsonc"];

/// File stem of a schema: `HED<version>` or `HED_<library>_<version>`.
pub fn local_name(library: &str, version: &str) -> String {
    if library.is_empty() {
        format!("HED{version}")
    } else {
        format!("HED_{library}_{version}")
    }
}

/// Parse a schema document from JSON or JSONC text and build it.
pub fn load_schema_from_str(text: &str) -> Result<Schema, SchemaError> {
    let source: SchemaSource = serde_json::from_str(&strip_jsonc(text))?;
    Schema::from_source(&source)
}

/// Read and build a schema document.
pub fn load_schema_from_path(path: &Path) -> Result<Schema, SchemaError> {
    let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loading schema from {}", path.display());
    load_schema_from_str(&text)
}

/// Which schema to load, and under which nickname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSpec {
    /// Prefix used in HED strings (`sc` in `sc:Tag`); empty for the base schema.
    pub nickname: String,
    /// Schema version.
    pub version: String,
    /// Library name; empty for the standard schema.
    pub library: String,
    /// Explicit file to load instead of searching.
    pub local_path: Option<PathBuf>,
}

impl SchemaSpec {
    /// Spec without an explicit path.
    pub fn new(
        nickname: impl Into<String>,
        version: impl Into<String>,
        library: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            version: version.into(),
            library: library.into(),
            local_path: None,
        }
    }

    /// Load from `path` instead of searching.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Parse a version spec as used in BIDS `HEDVersion` fields:
    /// `8.3.0`, `score_1.0.0` or `sc:score_1.0.0`.
    pub fn parse(spec: &str) -> Result<Self, SchemaError> {
        let invalid = || SchemaError::InvalidSpec(spec.to_string());
        let (nickname, rest) = match spec.split_once(':') {
            Some((nickname, rest)) => (nickname.trim(), rest.trim()),
            None => ("", spec.trim()),
        };
        if !nickname.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        let (library, version) = match rest.rsplit_once('_') {
            Some((library, version)) => (library, version),
            None => ("", rest),
        };
        if version.is_empty() || !version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !library.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        Ok(Self::new(nickname, version, library))
    }

    /// File stem of the schema this spec names.
    pub fn local_name(&self) -> String {
        local_name(&self.library, &self.version)
    }
}

/// Schema specs keyed by nickname, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SchemasSpec {
    specs: IndexMap<String, SchemaSpec>,
}

impl SchemasSpec {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec. Each nickname may only be used once.
    pub fn add_schema_spec(&mut self, spec: SchemaSpec) -> Result<&mut Self, SchemaError> {
        if self.is_duplicate(&spec) {
            return Err(SchemaError::DuplicateNickname(spec.nickname));
        }
        self.specs.insert(spec.nickname.clone(), spec);
        Ok(self)
    }

    /// Whether a spec with the same nickname is already present.
    pub fn is_duplicate(&self, spec: &SchemaSpec) -> bool {
        self.specs.contains_key(&spec.nickname)
    }

    /// Specs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaSpec> {
        self.specs.values()
    }

    /// Number of specs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether there are no specs.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Loads schemas from local files.
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    search_dirs: Vec<PathBuf>,
    fallbacks: BTreeMap<String, PathBuf>,
}

impl SchemaLoader {
    /// Loader without search directories or fallbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also look for `<local_name>.json(c)` in `dir`.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Load `path` when a schema of `library` cannot be loaded. The empty
    /// library is the standard schema.
    pub fn with_fallback(mut self, library: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fallbacks.insert(library.into(), path.into());
        self
    }

    /// Load one schema, trying its fallback when the primary load fails.
    pub fn load_schema(&self, spec: &SchemaSpec) -> Result<Schema, SchemaError> {
        let error = match self.load_primary(spec) {
            Ok(schema) => return Ok(schema),
            Err(error) => error,
        };
        let Some(fallback) = self.fallbacks.get(&spec.library) else {
            return Err(error);
        };
        warn!(
            "could not load schema {}: {error}; using fallback {}",
            spec.local_name(),
            fallback.display()
        );
        load_schema_from_path(fallback).map_err(|fallback_error| SchemaError::Load {
            name: spec.local_name(),
            source: Box::new(error),
            fallback: fallback.clone(),
            fallback_error: Box::new(fallback_error),
        })
    }

    fn load_primary(&self, spec: &SchemaSpec) -> Result<Schema, SchemaError> {
        if let Some(path) = &spec.local_path {
            return load_schema_from_path(path);
        }
        let name = spec.local_name();
        let name = name.as_str();
        let candidates: Vec<PathBuf> = self
            .search_dirs
            .iter()
            .flat_map(|dir| {
                EXTENSIONS
                    .iter()
                    .map(move |extension| dir.join(format!("{name}.{extension}")))
            })
            .collect();
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => load_schema_from_path(path),
            None => Err(SchemaError::NotFound {
                name: spec.local_name(),
                searched: candidates.len(),
            }),
        }
    }

    /// Load every spec into a collection keyed by nickname.
    pub fn load_schemas(&self, specs: &SchemasSpec) -> Result<Schemas, SchemaError> {
        let mut schemas = IndexMap::with_capacity(specs.len());
        for spec in specs.iter() {
            let schema = self.load_schema(spec)?;
            if schema.version() != spec.version || schema.library() != spec.library {
                debug!(
                    "schema for {} declares version {} (library '{}')",
                    spec.local_name(),
                    schema.version(),
                    schema.library()
                );
            }
            schemas.insert(spec.nickname.clone(), Arc::new(schema));
        }
        Ok(Schemas::new(schemas))
    }
}
