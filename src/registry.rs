//! Type resolution by identifier.
//!
//! There is no runtime reflection to ask whether `app.films.Film` carries
//! `@MyAnnotation`, so resolution goes through a lookup table prepared ahead
//! of the scan. The table is usually a JSON manifest emitted next to the
//! compiled classes:
//!
//! ```json
//! { "types": { "app.films.Film": ["app.annotations.MyAnnotation"] } }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::error::{ResolveError, ScanError};

/// Fully-qualified name of the annotation being searched for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(String);

impl Marker {
    pub fn new(name: &str) -> Result<Self, ScanError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScanError::InvalidArgument {
                name: "marker",
                reason: "must not be empty",
            });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub name: String,
    pub markers: BTreeSet<Marker>,
}

impl ResolvedType {
    pub fn carries(&self, marker: &Marker) -> bool {
        self.markers.contains(marker)
    }
}

pub trait TypeResolver {
    fn resolve(&self, identifier: &str) -> Result<ResolvedType, ResolveError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    types: BTreeMap<String, Vec<Marker>>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    types: BTreeMap<String, BTreeSet<Marker>>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S, M>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, M)>,
        S: Into<String>,
        M: IntoIterator<Item = Marker>,
    {
        let mut registry = Self::new();
        for (identifier, markers) in entries {
            registry.insert(identifier, markers);
        }
        registry
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read marker manifest: {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse marker manifest: {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(raw)?;
        Ok(Self::from_entries(manifest.types))
    }

    /// Registers `identifier`, merging markers into any existing entry. A type
    /// registered with no markers still resolves; it simply matches nothing.
    pub fn insert<S, M>(&mut self, identifier: S, markers: M)
    where
        S: Into<String>,
        M: IntoIterator<Item = Marker>,
    {
        self.types
            .entry(identifier.into())
            .or_default()
            .extend(markers);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn marked_with(&self, marker: &Marker) -> Vec<&str> {
        self.types
            .iter()
            .filter(|(_, markers)| markers.contains(marker))
            .map(|(identifier, _)| identifier.as_str())
            .collect()
    }
}

impl TypeResolver for MarkerRegistry {
    fn resolve(&self, identifier: &str) -> Result<ResolvedType, ResolveError> {
        let markers = self
            .types
            .get(identifier)
            .ok_or_else(|| ResolveError::NotFound(identifier.to_string()))?;
        Ok(ResolvedType {
            name: identifier.to_string(),
            markers: markers.clone(),
        })
    }
}
