use crate::event::{EventKind, EventQueue};
use crate::net::GameClient;
use crate::types::RoomId;
use crate::world::{EntityWorld, PuzzleState};

/// Frames during which every door-crossing event is discarded after a
/// transition attempt, so a sensor that stays overlapped cannot re-fire
/// the transition or ping-pong the player between rooms.
pub const DOOR_COOLDOWN_FRAMES: u32 = 15;

/// Decides what a queued door crossing does.
///
/// Offline the client is the sole authority and switches rooms
/// synchronously. Online it only tells the server (`Door`) and stays put;
/// the real change arrives later as `UpdateRoom`.
#[derive(Debug, Default)]
pub struct RoomTransition {
    cooldown_frames: u32,
}

impl RoomTransition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cooldown_active(&self) -> bool {
        self.cooldown_frames > 0
    }

    /// Once per frame.
    pub fn tick_cooldown(&mut self) {
        if self.cooldown_frames > 0 {
            self.cooldown_frames -= 1;
        }
    }

    /// Consumes the frame's door events. Returns the new room when an
    /// offline transition landed, None otherwise.
    pub fn process_pending_doors(
        &mut self,
        current_room: &RoomId,
        events: &mut EventQueue,
        puzzle: &mut dyn PuzzleState,
        world: &mut dyn EntityWorld,
        online: bool,
        client: Option<&GameClient>,
    ) -> Option<RoomId> {
        if events.is_empty(EventKind::DoorCrossing) {
            return None;
        }

        // A locked room keeps its doors shut no matter what the sensors say.
        if puzzle.is_locked(current_room) {
            events.clear(EventKind::DoorCrossing);
            return None;
        }

        // Mid-transition: discard without resetting the countdown.
        if self.cooldown_frames > 0 {
            events.clear(EventKind::DoorCrossing);
            return None;
        }

        let ev = events.poll_first_door()?;

        // The sensor belongs to the origin room; anything else is stale.
        if ev.door.origin != *current_room {
            events.clear(EventKind::DoorCrossing);
            return None;
        }

        if online {
            if let Some(client) = client {
                log::info!(
                    "door crossing {} -> {} ({}), deferring to server",
                    ev.door.origin,
                    ev.door.dest,
                    ev.door.direction
                );
                client.send_door_crossing(&ev.door.origin, &ev.door.dest, ev.door.direction);
            }
            self.cooldown_frames = DOOR_COOLDOWN_FRAMES;
            events.clear(EventKind::DoorCrossing);
            return None;
        }

        let new_room = world.enter_adjacent_room(&ev.door, ev.player_id);
        if let Some(new_room) = &new_room {
            world.remove_room_enemies(current_room);
            world.room_changed(current_room, new_room);
            puzzle.on_room_entered(new_room);
            world.populate_room(new_room);
            puzzle.set_enemies_alive(new_room, world.enemies_alive_in(new_room));
        }

        self.cooldown_frames = DOOR_COOLDOWN_FRAMES;
        events.clear(EventKind::DoorCrossing);
        new_room
    }
}
