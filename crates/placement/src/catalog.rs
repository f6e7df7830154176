//! Read-only catalog of tool profiles.
//!
//! The catalog is built once (from the built-in drills or a JSON file) and
//! injected into the controller as an `Arc<ToolCatalog>`. Profiles are shared
//! by reference; a placed object keeps its own `Arc<ToolProfile>` so changing
//! the active tool never rewrites an existing placement.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, UnknownTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub u32);

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolProfile {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    /// Usage tips in display order.
    #[serde(default)]
    pub tips: Vec<String>,
    /// Catalog metadata only; model and accent colors are keyed by `id`.
    #[serde(default = "default_style_key")]
    pub style_key: String,
}

fn default_style_key() -> String {
    "drill".to_string()
}

#[derive(Deserialize)]
struct CatalogFile {
    tools: Vec<ToolProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCatalog {
    profiles: Vec<Arc<ToolProfile>>,
}

impl ToolCatalog {
    /// Build a catalog, rejecting empty catalogs, blank names and duplicate ids.
    pub fn from_profiles(profiles: Vec<ToolProfile>) -> Result<Self, LoadError> {
        if profiles.is_empty() {
            return Err(LoadError::Invalid("catalog has no tools".to_string()));
        }
        let mut seen = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            if profile.name.trim().is_empty() {
                return Err(LoadError::Invalid(format!(
                    "tool {} has an empty name",
                    profile.id
                )));
            }
            if seen.contains(&profile.id) {
                return Err(LoadError::Invalid(format!(
                    "duplicate tool id {}",
                    profile.id
                )));
            }
            seen.push(profile.id);
        }
        Ok(Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse `{ "tools": [ ... ] }`.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_profiles(file.tools)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: ToolId) -> Option<&Arc<ToolProfile>> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn require(&self, id: ToolId) -> Result<&Arc<ToolProfile>, UnknownTool> {
        self.get(id).ok_or(UnknownTool(id))
    }

    pub fn first(&self) -> Option<&Arc<ToolProfile>> {
        self.profiles.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ToolProfile>> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ToolCatalog {
    /// The three drills shipped with the app.
    fn default() -> Self {
        let tips = |items: &[&str]| items.iter().map(|t| t.to_string()).collect();
        Self {
            profiles: vec![
                Arc::new(ToolProfile {
                    id: ToolId(1),
                    name: "Power Drill Pro".to_string(),
                    description: "High-performance cordless drill with variable speed control \
                        and LED work light. Perfect for heavy-duty drilling tasks in wood, \
                        metal, and masonry."
                        .to_string(),
                    tips: tips(&[
                        "Use pilot holes for better accuracy",
                        "Select appropriate drill bit for material",
                        "Keep drill perpendicular to surface",
                        "Apply steady pressure without forcing",
                    ]),
                    style_key: "drill.power".to_string(),
                }),
                Arc::new(ToolProfile {
                    id: ToolId(2),
                    name: "Impact Drill Max".to_string(),
                    description: "Heavy-duty impact drill designed for concrete and masonry \
                        work. Features hammer action for efficient drilling in tough materials."
                        .to_string(),
                    tips: tips(&[
                        "Use hammer mode for concrete",
                        "Wear safety glasses and dust mask",
                        "Start with light pressure then increase",
                        "Clear debris frequently from hole",
                    ]),
                    style_key: "drill.impact".to_string(),
                }),
                Arc::new(ToolProfile {
                    id: ToolId(3),
                    name: "Precision Mini Drill".to_string(),
                    description: "Compact precision drill ideal for detailed work and small \
                        holes. Perfect for electronics, jewelry, and delicate materials."
                        .to_string(),
                    tips: tips(&[
                        "Use low speed for better control",
                        "Secure small pieces with clamps",
                        "Keep drill bits sharp and clean",
                        "Practice on scrap material first",
                    ]),
                    style_key: "drill.precision".to_string(),
                }),
            ],
        }
    }
}

/// The catalog shared with the Bevy world.
#[derive(Resource, Debug, Clone, Default)]
pub struct CatalogResource(pub Arc<ToolCatalog>);

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: u32, name: &str) -> ToolProfile {
        ToolProfile {
            id: ToolId(id),
            name: name.to_string(),
            description: String::new(),
            tips: Vec::new(),
            style_key: default_style_key(),
        }
    }

    #[test]
    fn default_catalog_has_three_drills_in_order() {
        let catalog = ToolCatalog::default();
        let ids: Vec<u32> = catalog.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(catalog.first().map(|p| p.name.as_str()), Some("Power Drill Pro"));
        assert!(catalog.iter().all(|p| p.tips.len() == 4));
    }

    #[test]
    fn lookup_by_id() {
        let catalog = ToolCatalog::default();
        assert_eq!(
            catalog.get(ToolId(2)).map(|p| p.name.as_str()),
            Some("Impact Drill Max")
        );
        assert!(catalog.get(ToolId(9)).is_none());
        assert_eq!(catalog.require(ToolId(9)).unwrap_err(), UnknownTool(ToolId(9)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ToolCatalog::from_profiles(vec![profile(1, "A"), profile(1, "B")]).unwrap_err();
        assert!(format!("{err}").contains("duplicate"), "got: {err}");
    }

    #[test]
    fn empty_and_blank_catalogs_are_rejected() {
        assert!(ToolCatalog::from_profiles(Vec::new()).is_err());
        assert!(ToolCatalog::from_profiles(vec![profile(1, "  ")]).is_err());
    }

    #[test]
    fn json_catalog_fills_optional_fields() {
        let catalog = ToolCatalog::from_json(
            r#"{ "tools": [ { "id": 7, "name": "Test Drill", "description": "for tests" } ] }"#,
        )
        .expect("catalog should parse");
        let tool = catalog.get(ToolId(7)).expect("tool 7");
        assert!(tool.tips.is_empty());
        assert_eq!(tool.style_key, "drill");
        assert_eq!(catalog.len(), 1);
    }
}
