/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD messages.

use crate::domain::direction::Direction;
use super::registry::BlockId;

#[derive(Clone, Debug, PartialEq)]
pub enum BuildEvent {
    GhostSpawned { id: BlockId },
    GhostPickedUp { id: BlockId },
    /// Committed through a connector pair.
    Snapped { id: BlockId },
    /// Committed onto the half grid with nothing nearby.
    PlacedFree { id: BlockId },
    PlacementRejected,
    GhostCancelled,
    Rotated { direction: Direction },
    Recolored { index: usize },
    IconsToggled { visible: bool },
    MenuOpened,
    MenuNavigated,
    MenuClosed,
}

impl BuildEvent {
    /// Menu feedback gets the UI click.
    pub fn is_menu(&self) -> bool {
        matches!(self, BuildEvent::MenuOpened | BuildEvent::MenuNavigated | BuildEvent::MenuClosed)
    }
}
