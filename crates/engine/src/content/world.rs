use std::collections::HashMap;

use tracing::warn;

use crate::asset_keys::validate_asset_key;
use crate::nav::{
    find_path, reachable_from, ContentEntry, PoiOverlay, PointOfInterest, TileCoord, TileGrid,
};

use super::types::{WorldDefinition, WorldError};

/// A validated, immutable world: grid, overlay and spawn. Sessions borrow it
/// for their whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    id: String,
    title: String,
    background: Option<String>,
    grid: TileGrid,
    overlay: PoiOverlay,
    spawn: TileCoord,
    reachable_tiles: usize,
}

impl World {
    pub fn from_definition(definition: WorldDefinition) -> Result<Self, WorldError> {
        let WorldDefinition {
            id,
            title,
            background,
            spawn,
            layout,
            points_of_interest,
            content,
        } = definition;

        if id.trim().is_empty() {
            return Err(WorldError::EmptyId);
        }
        if let Some(key) = &background {
            validate_asset_key(key).map_err(|source| WorldError::InvalidBackground {
                key: key.clone(),
                source,
            })?;
        }

        let grid = TileGrid::parse(layout.as_slice())?;
        if !grid.in_bounds(spawn) {
            return Err(WorldError::SpawnOutOfBounds {
                spawn,
                cols: grid.cols(),
                rows: grid.rows(),
            });
        }
        if !grid.is_ground_class(spawn) {
            return Err(WorldError::SpawnNotGround { spawn });
        }

        let mut entries = HashMap::<String, ContentEntry>::with_capacity(content.len());
        for entry in content {
            if entries.contains_key(&entry.id) {
                return Err(WorldError::DuplicateContentId { id: entry.id });
            }
            entries.insert(entry.id.clone(), entry);
        }

        let mut points = Vec::with_capacity(points_of_interest.len());
        for poi in points_of_interest {
            let at = TileCoord::new(poi.x, poi.y);
            if !grid.in_bounds(at) {
                return Err(WorldError::PoiOutOfBounds {
                    content: poi.content,
                    at,
                });
            }
            let Some(entry) = entries.get(&poi.content) else {
                return Err(WorldError::UnknownContent {
                    content: poi.content,
                    at,
                });
            };
            points.push(PointOfInterest {
                at,
                content: entry.clone(),
            });
        }
        let overlay = PoiOverlay::new(points)?;

        let reachable_tiles = reachable_from(&grid, spawn);
        for (at, entry) in overlay.iter() {
            if find_path(&grid, &overlay, spawn, at).is_none() {
                warn!(
                    world = %id,
                    content = %entry.id,
                    x = at.x,
                    y = at.y,
                    "point_of_interest_unreachable_from_spawn"
                );
            }
        }

        Ok(Self {
            id,
            title,
            background,
            grid,
            overlay,
            spawn,
            reachable_tiles,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn overlay(&self) -> &PoiOverlay {
        &self.overlay
    }

    pub fn spawn(&self) -> TileCoord {
        self.spawn
    }

    pub fn reachable_tiles(&self) -> usize {
        self.reachable_tiles
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::asset_keys::AssetKeyError;
    use crate::nav::GridError;

    fn definition(value: serde_json::Value) -> WorldDefinition {
        serde_json::from_value(value).expect("definition json")
    }

    fn base_json() -> serde_json::Value {
        json!({
            "id": "projects",
            "title": "Projects",
            "background": "backgrounds/projects",
            "spawn": { "x": 1, "y": 1 },
            "layout": ["WWWWW", "WGGGW", "WGPGW", "WWWWW"],
            "points_of_interest": [
                { "x": 3, "y": 2, "content": "walker" },
                { "x": 4, "y": 1, "content": "assistant" }
            ],
            "content": [
                {
                    "id": "walker",
                    "title": "Source Walker",
                    "description": "Interactive 3D Portfolio",
                    "icon": "globe",
                    "link": "https://example.com/walker"
                },
                {
                    "id": "assistant",
                    "title": "AI Assistant",
                    "description": "Smart Task Management",
                    "icon": "robot"
                }
            ]
        })
    }

    #[test]
    fn valid_definition_builds_world() {
        let world = World::from_definition(definition(base_json())).expect("world");
        assert_eq!(world.id(), "projects");
        assert_eq!(world.background(), Some("backgrounds/projects"));
        assert_eq!(world.grid().cols(), 5);
        assert_eq!(world.overlay().len(), 2);
        assert_eq!(world.reachable_tiles(), 6);
        let entry = world.overlay().get(TileCoord::new(4, 1)).expect("poi");
        assert_eq!(entry.title, "AI Assistant");
        assert_eq!(entry.link, None);
    }

    #[test]
    fn ragged_layout_is_rejected() {
        let mut value = base_json();
        value["layout"] = json!(["WWWWW", "WGGW", "WWWWW"]);
        assert_eq!(
            World::from_definition(definition(value)),
            Err(WorldError::Grid(GridError::Ragged {
                row: 1,
                expected: 5,
                actual: 4
            }))
        );
    }

    #[test]
    fn spawn_must_be_in_bounds_and_ground() {
        let mut outside = base_json();
        outside["spawn"] = json!({ "x": 9, "y": 1 });
        assert!(matches!(
            World::from_definition(definition(outside)),
            Err(WorldError::SpawnOutOfBounds { .. })
        ));

        let mut on_wall = base_json();
        on_wall["spawn"] = json!({ "x": 0, "y": 0 });
        assert_eq!(
            World::from_definition(definition(on_wall)),
            Err(WorldError::SpawnNotGround {
                spawn: TileCoord::new(0, 0)
            })
        );
    }

    #[test]
    fn unknown_content_reference_is_rejected() {
        let mut value = base_json();
        value["points_of_interest"][0]["content"] = json!("missing");
        assert_eq!(
            World::from_definition(definition(value)),
            Err(WorldError::UnknownContent {
                content: "missing".to_string(),
                at: TileCoord::new(3, 2)
            })
        );
    }

    #[test]
    fn duplicate_poi_coordinate_is_rejected() {
        let mut value = base_json();
        value["points_of_interest"][1] = json!({ "x": 3, "y": 2, "content": "assistant" });
        assert!(matches!(
            World::from_definition(definition(value)),
            Err(WorldError::Overlay(_))
        ));
    }

    #[test]
    fn poi_outside_grid_is_rejected() {
        let mut value = base_json();
        value["points_of_interest"][1] = json!({ "x": 5, "y": 1, "content": "assistant" });
        assert!(matches!(
            World::from_definition(definition(value)),
            Err(WorldError::PoiOutOfBounds { .. })
        ));
    }

    #[test]
    fn background_must_be_asset_key() {
        let mut value = base_json();
        value["background"] = json!("/porto-world.webp");
        assert_eq!(
            World::from_definition(definition(value)),
            Err(WorldError::InvalidBackground {
                key: "/porto-world.webp".to_string(),
                source: AssetKeyError::Absolute
            })
        );
    }

    #[test]
    fn duplicate_content_id_is_rejected() {
        let mut value = base_json();
        value["content"][1]["id"] = json!("walker");
        value["points_of_interest"][1]["content"] = json!("walker");
        assert_eq!(
            World::from_definition(definition(value)),
            Err(WorldError::DuplicateContentId {
                id: "walker".to_string()
            })
        );
    }
}
