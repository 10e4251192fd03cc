use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::TileCoord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOfInterest {
    pub at: TileCoord,
    pub content: ContentEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("points of interest '{first}' and '{second}' share tile {at}")]
    DuplicateCoordinate {
        at: TileCoord,
        first: String,
        second: String,
    },
}

/// Sparse set of interactive tiles laid over the grid. Iteration follows the
/// order the points were authored in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiOverlay {
    points: Vec<PointOfInterest>,
    by_coord: HashMap<TileCoord, usize>,
}

impl PoiOverlay {
    pub fn new(points: Vec<PointOfInterest>) -> Result<Self, OverlayError> {
        let mut by_coord = HashMap::with_capacity(points.len());
        for (index, point) in points.iter().enumerate() {
            if let Some(existing) = by_coord.insert(point.at, index) {
                return Err(OverlayError::DuplicateCoordinate {
                    at: point.at,
                    first: points[existing].content.id.clone(),
                    second: point.content.id.clone(),
                });
            }
        }
        Ok(Self { points, by_coord })
    }

    pub fn get(&self, at: TileCoord) -> Option<&ContentEntry> {
        self.by_coord
            .get(&at)
            .map(|index| &self.points[*index].content)
    }

    pub fn contains(&self, at: TileCoord) -> bool {
        self.by_coord.contains_key(&at)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &ContentEntry)> + '_ {
        self.points.iter().map(|point| (point.at, &point.content))
    }

    pub fn find_by_content_id(&self, id: &str) -> Option<TileCoord> {
        self.points
            .iter()
            .find(|point| point.content.id == id)
            .map(|point| point.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> ContentEntry {
        ContentEntry {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            icon: "*".to_string(),
            link: None,
        }
    }

    #[test]
    fn rejects_two_points_on_one_tile() {
        let result = PoiOverlay::new(vec![
            PointOfInterest {
                at: TileCoord::new(1, 1),
                content: entry("a"),
            },
            PointOfInterest {
                at: TileCoord::new(1, 1),
                content: entry("b"),
            },
        ]);
        assert_eq!(
            result,
            Err(OverlayError::DuplicateCoordinate {
                at: TileCoord::new(1, 1),
                first: "a".to_string(),
                second: "b".to_string(),
            })
        );
    }

    #[test]
    fn iteration_keeps_authoring_order() {
        let overlay = PoiOverlay::new(vec![
            PointOfInterest {
                at: TileCoord::new(4, 2),
                content: entry("late"),
            },
            PointOfInterest {
                at: TileCoord::new(0, 1),
                content: entry("early"),
            },
        ])
        .expect("overlay");

        let ids = overlay
            .iter()
            .map(|(_, content)| content.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["late", "early"]);
        assert_eq!(overlay.find_by_content_id("late"), Some(TileCoord::new(4, 2)));
        assert!(overlay.contains(TileCoord::new(0, 1)));
        assert!(overlay.get(TileCoord::new(3, 3)).is_none());
    }
}
