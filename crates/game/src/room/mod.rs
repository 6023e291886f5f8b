mod sync;
mod transition;

pub use sync::RoomSync;
pub use transition::{DOOR_COOLDOWN_FRAMES, RoomTransition};
