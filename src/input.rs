/// Logical player actions, decoupled from any key or device.

use std::collections::HashSet;

use crate::entities::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Dodge,
    Attack,
    CycleWeapon,
    ToggleAutoAim,
    TogglePerformanceMode,
    ToggleAutoMode,
    RadiusUp,
    RadiusDown,
}

pub trait ActionInput {
    /// Held this tick.
    fn is_active(&self, action: Action) -> bool;

    /// Went down this tick.
    fn just_pressed(&self, action: Action) -> bool;

    /// Aim position in world space, if the device has a pointer.
    fn pointer(&self) -> Option<Vec2> {
        None
    }
}

/// In-memory input: callers fill it each tick and clear the edge set.
#[derive(Clone, Debug, Default)]
pub struct ActionState {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    pointer: Option<Vec2>,
}

impl ActionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `action` held and, if it was not held before, just pressed.
    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    /// Forget this tick's edges; held actions stay held.
    pub fn end_tick(&mut self) {
        self.pressed.clear();
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }
}

impl ActionInput for ActionState {
    fn is_active(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    fn just_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }
}
