use std::collections::HashMap;

use glam::Vec2;

use delve::{BodyHandle, DoorLink, EnemyId, EntityId, EntityWorld, ItemId, PlayerId, PuzzleState, RoomId};

/// Minimal world backing for the headless client: remote bodies are plain
/// positions, everything else is logged. Stands in for the rendering and
/// physics layers a full client wires up here.
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    bodies: HashMap<EntityId, HeadlessBody>,
    items: HashMap<ItemId, String>,
    enemies: HashMap<EnemyId, String>,
}

#[derive(Debug, Default)]
pub struct HeadlessBody {
    pub pos: Vec2,
}

impl BodyHandle for HeadlessBody {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn halt(&mut self) {}
}

impl HeadlessWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_position(&self, entity_id: EntityId) -> Option<Vec2> {
        self.bodies.get(&entity_id).map(|b| b.pos)
    }
}

impl EntityWorld for HeadlessWorld {
    fn spawn_item(&mut self, item_id: ItemId, kind: &str, pos: Vec2) {
        log::info!("item {item_id} ({kind}) spawned at {pos}");
        self.items.insert(item_id, kind.to_string());
    }

    fn despawn_item(&mut self, item_id: ItemId) {
        if self.items.remove(&item_id).is_some() {
            log::info!("item {item_id} despawned");
        }
    }

    fn pickup_item(&mut self, player_id: PlayerId, item_id: ItemId) {
        log::info!("player {player_id} picked up item {item_id}");
        self.items.remove(&item_id);
    }

    fn spawn_enemy(&mut self, enemy_id: EnemyId, name: &str, pos: Vec2, room: &RoomId) {
        log::info!("enemy {enemy_id} ({name}) spawned in {room} at {pos}");
        self.enemies.insert(enemy_id, name.to_string());
    }

    fn update_enemy(&mut self, enemy_id: EnemyId, pos: Vec2) {
        log::trace!("enemy {enemy_id} moved to {pos}");
    }

    fn despawn_enemy(&mut self, enemy_id: EnemyId) {
        if self.enemies.remove(&enemy_id).is_some() {
            log::info!("enemy {enemy_id} despawned");
        }
    }

    fn remove_room_enemies(&mut self, room: &RoomId) {
        log::info!("clearing enemies of {room}");
    }

    fn kill_room_enemies(&mut self, room: &RoomId) {
        log::info!("enemies of {room} defeated");
    }

    fn enemies_alive_in(&self, _room: &RoomId) -> usize {
        self.enemies.len()
    }

    fn enter_adjacent_room(&mut self, door: &DoorLink, _player_id: PlayerId) -> Option<RoomId> {
        Some(door.dest.clone())
    }

    fn populate_room(&mut self, room: &RoomId) {
        log::info!("populating {room}");
    }

    fn room_changed(&mut self, old: &RoomId, new: &RoomId) {
        log::info!("room changed {old} -> {new}");
    }

    fn player_body(&mut self, entity_id: EntityId) -> Option<&mut dyn BodyHandle> {
        Some(
            self.bodies.entry(entity_id).or_default() as &mut dyn BodyHandle
        )
    }

    fn player_vulnerable(&self, _player_id: PlayerId) -> bool {
        true
    }

    fn damage_player(&mut self, player_id: PlayerId) {
        log::info!("player {player_id} took damage");
    }

    fn apply_hud(&mut self, player_id: PlayerId, hp: i32, hp_max: i32, inventory: Option<&str>) {
        match inventory {
            Some(inv) if !inv.is_empty() => {
                log::info!("hud: player {player_id} {hp}/{hp_max} hp, carrying [{inv}]");
            }
            _ => log::info!("hud: player {player_id} {hp}/{hp_max} hp"),
        }
    }

    fn complete_level(&mut self, room: &RoomId) {
        log::info!("level complete at {room}");
    }
}

/// Puzzle stub: nothing is ever locked, presses are just logged.
#[derive(Debug, Default)]
pub struct HeadlessPuzzle;

impl PuzzleState for HeadlessPuzzle {
    fn is_locked(&self, _room: &RoomId) -> bool {
        false
    }

    fn on_room_entered(&mut self, room: &RoomId) {
        log::info!("puzzle state reset for {room}");
    }

    fn button_down(&mut self, room: &RoomId, player_id: PlayerId) -> bool {
        log::info!("player {player_id} pressed a button in {room}");
        false
    }

    fn button_up(&mut self, _room: &RoomId, _player_id: PlayerId) {}

    fn mark_cleared(&mut self, room: &RoomId) {
        log::info!("{room} marked cleared");
    }

    fn set_enemies_alive(&mut self, _room: &RoomId, _count: usize) {}
}
