use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PlaceBomb,
    Quit,
}

const ACTION_COUNT: usize = 6;

/// Inventory slots reachable from the number row.
pub const SLOT_KEY_COUNT: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::PlaceBomb => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Input as seen by one simulation tick. Press edges are reported on
/// exactly one tick; held keys are reported through `is_down`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    bomb_pressed: bool,
    selected_slot: Option<usize>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        bomb_pressed: bool,
        selected_slot: Option<usize>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            bomb_pressed,
            selected_slot,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn bomb_pressed(&self) -> bool {
        self.bomb_pressed
    }

    pub fn with_bomb_pressed(mut self, bomb_pressed: bool) -> Self {
        self.bomb_pressed = bomb_pressed;
        self
    }

    /// Zero-based slot picked with the number row this tick, if any.
    pub fn selected_slot(&self) -> Option<usize> {
        self.selected_slot
    }

    pub fn with_selected_slot(mut self, selected_slot: Option<usize>) -> Self {
        self.selected_slot = selected_slot;
        self
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    /// Held movement as a unit step. Opposite keys cancel; vertical wins
    /// over horizontal when both are held.
    pub fn movement(&self) -> Option<(i32, i32)> {
        let dx = i32::from(self.is_down(InputAction::MoveRight))
            - i32::from(self.is_down(InputAction::MoveLeft));
        let dy = i32::from(self.is_down(InputAction::MoveDown))
            - i32::from(self.is_down(InputAction::MoveUp));
        match (dx, dy) {
            (0, 0) => None,
            (_, 0) => Some((dx, 0)),
            _ => Some((0, dy)),
        }
    }
}

/// Folds winit key events into per-tick snapshots. Held keys persist across
/// ticks; the bomb press edge and digit selections are consumed by the first
/// snapshot that sees them.
#[derive(Debug, Default)]
pub(crate) struct KeyTracker {
    quit_requested: bool,
    held: ActionStates,
    bomb_edge: bool,
    slot: Option<usize>,
    window_size: (u32, u32),
}

impl KeyTracker {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_size: (window_width, window_height),
            ..Self::default()
        }
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub(crate) fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub(crate) fn key_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.key(code, event.state == ElementState::Pressed);
        }
    }

    fn key(&mut self, code: KeyCode, pressed: bool) {
        if let Some(slot) = digit_slot(code) {
            if pressed {
                self.slot = Some(slot);
            }
            return;
        }
        let action = match code {
            KeyCode::KeyW | KeyCode::ArrowUp => InputAction::MoveUp,
            KeyCode::KeyS | KeyCode::ArrowDown => InputAction::MoveDown,
            KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::MoveLeft,
            KeyCode::KeyD | KeyCode::ArrowRight => InputAction::MoveRight,
            KeyCode::Space => InputAction::PlaceBomb,
            KeyCode::Escape => InputAction::Quit,
            _ => return,
        };
        match action {
            InputAction::PlaceBomb if pressed && !self.held.is_down(action) => {
                self.bomb_edge = true
            }
            InputAction::Quit if pressed => self.quit_requested = true,
            _ => {}
        }
        self.held.set(action, pressed);
    }

    pub(crate) fn take_snapshot(&mut self) -> InputSnapshot {
        let (width, height) = self.window_size;
        InputSnapshot::new(
            self.quit_requested,
            self.held,
            std::mem::take(&mut self.bomb_edge),
            self.slot.take(),
            width,
            height,
        )
    }
}

fn digit_slot(code: KeyCode) -> Option<usize> {
    const DIGITS: [KeyCode; SLOT_KEY_COUNT] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    DIGITS.iter().position(|digit| *digit == code)
}
