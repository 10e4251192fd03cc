use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset_keys::AssetKeyError;
use crate::nav::{ContentEntry, GridError, OverlayError, TileCoord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub spawn: TileCoord,
    pub layout: Vec<String>,
    #[serde(default)]
    pub points_of_interest: Vec<PoiDefinition>,
    #[serde(default)]
    pub content: Vec<ContentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoiDefinition {
    pub x: i32,
    pub y: i32,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDefinition {
    pub worlds: Vec<CatalogEntry>,
}

/// Selection-screen metadata for one world, listed in orbit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("world id must not be empty")]
    EmptyId,
    #[error("invalid layout: {0}")]
    Grid(#[from] GridError),
    #[error("spawn {spawn} is outside the {cols}x{rows} grid")]
    SpawnOutOfBounds {
        spawn: TileCoord,
        cols: usize,
        rows: usize,
    },
    #[error("spawn {spawn} must be a ground or path tile")]
    SpawnNotGround { spawn: TileCoord },
    #[error("point of interest '{content}' at {at} is outside the grid")]
    PoiOutOfBounds { content: String, at: TileCoord },
    #[error("point of interest at {at} references unknown content '{content}'")]
    UnknownContent { content: String, at: TileCoord },
    #[error("content id '{id}' is defined more than once")]
    DuplicateContentId { id: String },
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error("invalid background key '{key}': {source}")]
    InvalidBackground {
        key: String,
        #[source]
        source: AssetKeyError,
    },
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid world {path}: {source}")]
    InvalidWorld {
        path: PathBuf,
        #[source]
        source: WorldError,
    },
    #[error("world file {path} declares id '{actual}', catalog expects '{expected}'")]
    WorldIdMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("catalog lists world '{id}' more than once")]
    DuplicateWorld { id: String },
    #[error("catalog {path} lists no worlds")]
    EmptyCatalog { path: PathBuf },
    #[error("invalid world id '{id}' in catalog: {source}")]
    InvalidWorldId {
        id: String,
        #[source]
        source: AssetKeyError,
    },
}
