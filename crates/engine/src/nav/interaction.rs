use super::grid::{Direction, TileCoord};
use super::overlay::{ContentEntry, PoiOverlay};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPanel {
    pub at: TileCoord,
    pub content_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    PanelClosed(OpenPanel),
    ExitRequested,
}

/// Tracks the single open content panel.
#[derive(Debug, Default)]
pub struct InteractionResolver {
    open: Option<OpenPanel>,
}

impl InteractionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_panel(&self) -> Option<&OpenPanel> {
        self.open.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Opens the panel of the point of interest under the player. Standing
    /// next to one is not enough. Returns the newly opened panel, or `None`
    /// when nothing changed.
    pub fn confirm(&mut self, overlay: &PoiOverlay, position: TileCoord) -> Option<&OpenPanel> {
        let content = overlay.get(position)?;
        if self
            .open
            .as_ref()
            .is_some_and(|open| open.at == position && open.content_id == content.id)
        {
            return None;
        }
        self.open = Some(OpenPanel {
            at: position,
            content_id: content.id.clone(),
        });
        self.open.as_ref()
    }

    pub fn cancel(&mut self) -> CancelOutcome {
        match self.open.take() {
            Some(panel) => CancelOutcome::PanelClosed(panel),
            None => CancelOutcome::ExitRequested,
        }
    }

    pub fn close(&mut self) -> Option<OpenPanel> {
        self.open.take()
    }

    pub fn open_content<'a>(&self, overlay: &'a PoiOverlay) -> Option<&'a ContentEntry> {
        self.open.as_ref().and_then(|panel| overlay.get(panel.at))
    }
}

pub fn is_adjacent(a: TileCoord, b: TileCoord) -> bool {
    a.manhattan(b) == 1
}

/// Points of interest orthogonally next to `position`, in search order.
/// Proximity is informational only and never opens a panel.
pub fn points_nearby(overlay: &PoiOverlay, position: TileCoord) -> Vec<TileCoord> {
    Direction::SEARCH_ORDER
        .iter()
        .map(|direction| position.step(*direction))
        .filter(|coord| overlay.contains(*coord))
        .collect()
}
