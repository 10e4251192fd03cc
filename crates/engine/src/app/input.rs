use winit::keyboard::KeyCode;

use crate::nav::{NavKey, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Confirm,
    Cancel,
    NextWorld,
    Quit,
}

impl InputAction {
    /// Held movement keys keep stepping on OS key repeat; everything else
    /// fires once per physical press.
    pub fn repeats_while_held(self) -> bool {
        matches!(
            self,
            InputAction::MoveUp
                | InputAction::MoveDown
                | InputAction::MoveLeft
                | InputAction::MoveRight
        )
    }

    /// Key a world session understands; host-only actions have none.
    pub fn nav_key(self) -> Option<NavKey> {
        match self {
            InputAction::MoveUp => Some(NavKey::Up),
            InputAction::MoveDown => Some(NavKey::Down),
            InputAction::MoveLeft => Some(NavKey::Left),
            InputAction::MoveRight => Some(NavKey::Right),
            InputAction::Confirm => Some(NavKey::Confirm),
            InputAction::Cancel => Some(NavKey::Cancel),
            InputAction::NextWorld | InputAction::Quit => None,
        }
    }
}

pub(crate) fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Enter | KeyCode::NumpadEnter | KeyCode::Space | KeyCode::KeyE => {
            Some(InputAction::Confirm)
        }
        KeyCode::Escape | KeyCode::Backspace => Some(InputAction::Cancel),
        KeyCode::Tab => Some(InputAction::NextWorld),
        KeyCode::KeyQ => Some(InputAction::Quit),
        _ => None,
    }
}

/// Pointer and touch input in window pixels, queued in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    Leave,
    TouchStart(Vec2),
    TouchMove(Vec2),
    TouchEnd,
}
