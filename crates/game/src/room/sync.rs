use crate::types::RoomId;
use crate::world::PuzzleState;

/// Keeps per-room puzzle state coherent when the current room is driven by
/// the server. Fires the enter-room hook exactly once per distinct room,
/// so a duplicated `UpdateRoom` cannot reset a room's puzzle twice.
#[derive(Debug, Default)]
pub struct RoomSync {
    last_room: Option<RoomId>,
}

impl RoomSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_room_changed(&mut self, room: &RoomId, online: bool, puzzle: &mut dyn PuzzleState) {
        if !online {
            return;
        }
        if self.last_room.as_ref() == Some(room) {
            return;
        }
        self.last_room = Some(room.clone());
        puzzle.on_room_entered(room);
    }

    /// Call when a match or level restarts.
    pub fn reset(&mut self) {
        self.last_room = None;
    }
}
