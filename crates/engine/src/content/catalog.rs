use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::asset_keys::resolve_asset_path;

use super::hashing::CatalogHasher;
use super::types::{CatalogDefinition, CatalogEntry, ContentError, WorldDefinition};
use super::world::World;

pub const CATALOG_FILE_NAME: &str = "catalog.json";
const WORLDS_DIR_NAME: &str = "worlds";

#[derive(Debug, Clone)]
pub struct CatalogWorld {
    pub entry: CatalogEntry,
    pub world: Arc<World>,
}

/// Every world of the portfolio in orbit order, validated and ready to enter.
#[derive(Debug, Clone)]
pub struct Catalog {
    worlds: Vec<CatalogWorld>,
    fingerprint: String,
}

impl Catalog {
    pub fn worlds(&self) -> &[CatalogWorld] {
        &self.worlds
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogWorld> {
        self.worlds.get(index)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.worlds.iter().position(|world| world.entry.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&CatalogWorld> {
        self.position_of(id).and_then(|index| self.worlds.get(index))
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

pub fn load_catalog(assets_dir: &Path) -> Result<Catalog, ContentError> {
    let catalog_path = assets_dir.join(CATALOG_FILE_NAME);
    let catalog_bytes = read_file(&catalog_path)?;
    let definition: CatalogDefinition = parse_json(&catalog_path, &catalog_bytes)?;
    if definition.worlds.is_empty() {
        return Err(ContentError::EmptyCatalog { path: catalog_path });
    }

    let mut seen = HashSet::new();
    let mut hasher = CatalogHasher::new();
    let mut worlds = Vec::with_capacity(definition.worlds.len());
    for entry in definition.worlds {
        if !seen.insert(entry.id.clone()) {
            return Err(ContentError::DuplicateWorld { id: entry.id });
        }
        let world_path = world_file_path(assets_dir, &entry.id)?;
        let bytes = read_file(&world_path)?;
        let world = build_world(&world_path, &bytes)?;
        if world.id() != entry.id {
            return Err(ContentError::WorldIdMismatch {
                path: world_path,
                expected: entry.id,
                actual: world.id().to_string(),
            });
        }
        hasher.add_world(&entry.id, &bytes);
        debug!(
            world = %entry.id,
            cols = world.grid().cols(),
            rows = world.grid().rows(),
            points_of_interest = world.overlay().len(),
            "world_loaded"
        );
        worlds.push(CatalogWorld {
            entry,
            world: Arc::new(world),
        });
    }

    let fingerprint = hasher.finish();
    info!(
        path = %catalog_path.display(),
        world_count = worlds.len(),
        fingerprint = %fingerprint,
        "catalog_loaded"
    );
    Ok(Catalog {
        worlds,
        fingerprint,
    })
}

/// Loads a single world file outside of any catalog.
pub fn load_world_file(path: &Path) -> Result<World, ContentError> {
    let bytes = read_file(path)?;
    build_world(path, &bytes)
}

pub fn world_file_path(assets_dir: &Path, world_id: &str) -> Result<PathBuf, ContentError> {
    resolve_asset_path(&assets_dir.join(WORLDS_DIR_NAME), world_id, "json").map_err(|source| {
        ContentError::InvalidWorldId {
            id: world_id.to_string(),
            source,
        }
    })
}

fn build_world(path: &Path, bytes: &[u8]) -> Result<World, ContentError> {
    let definition: WorldDefinition = parse_json(path, bytes)?;
    World::from_definition(definition).map_err(|source| ContentError::InvalidWorld {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<Vec<u8>, ContentError> {
    fs::read(path).map_err(|source| ContentError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        ContentError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}
