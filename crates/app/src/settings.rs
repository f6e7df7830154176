//! Startup configuration from the environment.
//!
//! `ARPLACE_PARAMS` and `ARPLACE_CATALOG` may each name a JSON file. A
//! missing variable means defaults; an unreadable or invalid file is logged
//! and also falls back to defaults, so a bad file never prevents startup.

use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;

use placement::{CatalogResource, LoadError, PlacementParams, ToolCatalog};

pub const PARAMS_ENV: &str = "ARPLACE_PARAMS";
pub const CATALOG_ENV: &str = "ARPLACE_CATALOG";

/// Load `path` with `load`, or fall back to `T::default()` with a warning.
pub fn load_or_default<T: Default>(
    path: Option<&str>,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T, LoadError>,
) -> T {
    let Some(path) = path else {
        return T::default();
    };
    match load(Path::new(path)) {
        Ok(value) => {
            info!("Loaded {what} from {path}");
            value
        }
        Err(err) => {
            warn!("Failed to load {what} from {path}: {err}; using defaults");
            T::default()
        }
    }
}

/// PreStartup: install params and catalog before any session can start.
pub fn load_configuration(mut commands: Commands) {
    let params_path = std::env::var(PARAMS_ENV).ok();
    let catalog_path = std::env::var(CATALOG_ENV).ok();

    let params = load_or_default(params_path.as_deref(), "placement params", |p| {
        PlacementParams::load(p)
    });
    let catalog = load_or_default(catalog_path.as_deref(), "tool catalog", |p| {
        ToolCatalog::load(p)
    });
    info!("{} tools in catalog", catalog.len());

    commands.insert_resource(params);
    commands.insert_resource(CatalogResource(Arc::new(catalog)));
}
