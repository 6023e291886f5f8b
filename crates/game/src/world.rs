use glam::Vec2;

use crate::types::{DoorLink, EnemyId, EntityId, ItemId, PlayerId, RoomId};

/// Handle to a physics body. Placements through this handle are render-only:
/// the authority over where an online body is stays with the server stream.
pub trait BodyHandle {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);
    /// Zero the body's velocity and wake it so the placement sticks.
    fn halt(&mut self);
}

/// The entity/map side of the game, consumed through a narrow seam. The
/// implementation owns rendering, asset loading, and the physics world;
/// this crate never touches those directly.
pub trait EntityWorld {
    fn spawn_item(&mut self, item_id: ItemId, kind: &str, pos: Vec2);
    fn despawn_item(&mut self, item_id: ItemId);
    /// Offline pickup: the local simulation is authoritative.
    fn pickup_item(&mut self, player_id: PlayerId, item_id: ItemId);

    fn spawn_enemy(&mut self, enemy_id: EnemyId, name: &str, pos: Vec2, room: &RoomId);
    fn update_enemy(&mut self, enemy_id: EnemyId, pos: Vec2);
    fn despawn_enemy(&mut self, enemy_id: EnemyId);
    /// Plain removal of a room's enemies (leaving a room).
    fn remove_room_enemies(&mut self, room: &RoomId);
    /// Kill a room's enemies with death feedback (room cleared).
    fn kill_room_enemies(&mut self, room: &RoomId);
    fn enemies_alive_in(&self, room: &RoomId) -> usize;

    /// Offline door crossing: teleport the player through `door` and return
    /// the destination room, or None when the door leads nowhere.
    fn enter_adjacent_room(&mut self, door: &DoorLink, player_id: PlayerId) -> Option<RoomId>;
    /// (Re)generate the destination room's static content.
    fn populate_room(&mut self, room: &RoomId);
    /// Map discovery, camera, HUD listeners: whatever reacts to the
    /// current room moving from `old` to `new`.
    fn room_changed(&mut self, old: &RoomId, new: &RoomId);

    fn player_body(&mut self, entity_id: EntityId) -> Option<&mut dyn BodyHandle>;
    fn player_vulnerable(&self, player_id: PlayerId) -> bool;
    fn damage_player(&mut self, player_id: PlayerId);

    /// `inventory` is None when the update carries no inventory change
    /// (damage-driven refresh); the displayed inventory stays untouched.
    fn apply_hud(&mut self, player_id: PlayerId, hp: i32, hp_max: i32, inventory: Option<&str>);

    fn complete_level(&mut self, room: &RoomId);
}

/// Per-room puzzle state collaborator.
pub trait PuzzleState {
    fn is_locked(&self, room: &RoomId) -> bool;
    fn on_room_entered(&mut self, room: &RoomId);
    /// Returns true when this press completes the puzzle and unlocks the room.
    fn button_down(&mut self, room: &RoomId, player_id: PlayerId) -> bool;
    fn button_up(&mut self, room: &RoomId, player_id: PlayerId);
    fn mark_cleared(&mut self, room: &RoomId);
    fn set_enemies_alive(&mut self, room: &RoomId, count: usize);
}
