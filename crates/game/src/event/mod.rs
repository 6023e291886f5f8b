mod queue;
mod types;

pub use queue::EventQueue;
pub use types::{
    ButtonEvent, DamageEvent, DoorEvent, EventKind, GameEvent, LevelCompleteEvent, PickupEvent,
};
