use glam::Vec2;

use crate::types::{ButtonSpec, DoorLink, ItemId, PlayerId, RoomId};

#[derive(Debug, Clone, PartialEq)]
pub struct DoorEvent {
    pub door: DoorLink,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupEvent {
    pub item_id: ItemId,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonEvent {
    pub button: ButtonSpec,
    pub player_id: PlayerId,
    pub pressed: bool,
}

/// Damage carries the world position it came from so the victim can be
/// shoved apart before the effect lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub player_id: PlayerId,
    pub origin: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelCompleteEvent {
    pub room: RoomId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    DoorCrossing(DoorEvent),
    Pickup(PickupEvent),
    Button(ButtonEvent),
    Damage(DamageEvent),
    LevelComplete(LevelCompleteEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DoorCrossing,
    Pickup,
    Button,
    Damage,
    LevelComplete,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::DoorCrossing(_) => EventKind::DoorCrossing,
            GameEvent::Pickup(_) => EventKind::Pickup,
            GameEvent::Button(_) => EventKind::Button,
            GameEvent::Damage(_) => EventKind::Damage,
            GameEvent::LevelComplete(_) => EventKind::LevelComplete,
        }
    }
}
