mod catalog;
mod hashing;
mod types;
mod world;

pub use catalog::{
    load_catalog, load_world_file, world_file_path, Catalog, CatalogWorld, CATALOG_FILE_NAME,
};
pub use types::{
    CatalogDefinition, CatalogEntry, ContentError, PoiDefinition, WorldDefinition, WorldError,
};
pub use world::World;
