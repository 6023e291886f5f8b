use std::collections::{HashMap, VecDeque};

use glam::Vec2;

use super::protocol::ServerCommand;
use super::snapshot::{INTERP_DELAY_MS, SNAP_FRAMES, SnapshotBuffer};
use crate::types::{EnemyId, ItemId, PlayerId, RoomChange, RoomId};
use crate::world::{EntityWorld, PuzzleState};

const MAX_PENDING_ITEM_SPAWNS: usize = 50;
const MAX_PENDING_ITEM_DESPAWNS: usize = 50;
const MAX_PENDING_ENEMY_SPAWNS: usize = 50;
const MAX_PENDING_ENEMY_MOVES: usize = 200;
const MAX_PENDING_ENEMY_DESPAWNS: usize = 50;
const MAX_PENDING_HUD: usize = 20;
const MAX_PENDING_OTHER: usize = 10;
const MAX_PENDING_ROOM_CLEARS: usize = 50;

#[derive(Debug, Clone)]
struct ItemSpawn {
    item_id: ItemId,
    kind: String,
    pos: Vec2,
}

#[derive(Debug, Clone)]
struct EnemySpawn {
    enemy_id: EnemyId,
    name: String,
    pos: Vec2,
    room: RoomId,
}

#[derive(Debug, Clone, Copy)]
struct EnemyMove {
    enemy_id: EnemyId,
    pos: Vec2,
}

#[derive(Debug, Clone)]
struct HudUpdate {
    player_id: PlayerId,
    hp: i32,
    hp_max: i32,
    inventory: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtherStatus {
    pub player_id: PlayerId,
    pub hp: i32,
    pub hp_max: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAppearance {
    pub gender: String,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server announced the shutdown; not a fault.
    ServerClosed,
    /// The receive loop died on a socket error.
    Io(String),
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T, cap: usize) {
    queue.push_back(value);
    while queue.len() > cap {
        queue.pop_front();
    }
}

/// All session state shared between the receiver thread and the frame
/// thread. Lives behind one mutex in `GameClient`; the receiver writes,
/// the frame loop consumes, and neither side assumes anything lock-free.
#[derive(Debug, Default)]
pub struct SessionState {
    connected: bool,
    online: bool,
    started: bool,
    world_ready: bool,
    input_enabled: bool,
    hud_synced: bool,

    local_player_id: Option<PlayerId>,
    seed: u64,
    level: i32,

    start_received: bool,
    pending_room: Option<RoomChange>,
    disconnect_reason: Option<DisconnectReason>,
    game_over_loser: Option<PlayerId>,

    snap_frames: u32,
    snapshots: SnapshotBuffer,

    appearances: HashMap<PlayerId, PlayerAppearance>,

    item_spawns: VecDeque<ItemSpawn>,
    item_despawns: VecDeque<ItemId>,
    enemy_spawns: VecDeque<EnemySpawn>,
    enemy_moves: VecDeque<EnemyMove>,
    enemy_despawns: VecDeque<EnemyId>,
    hud_updates: VecDeque<HudUpdate>,
    other_updates: VecDeque<OtherStatus>,
    room_clears: VecDeque<RoomId>,

    other_player: Option<OtherStatus>,
}

impl SessionState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.reset();
        state
    }

    // ----- lifecycle -----

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
        if !online {
            self.reset();
        }
    }

    pub fn set_world_ready(&mut self, ready: bool) {
        self.world_ready = ready;
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    /// Clears every piece of derived online state. `online` itself is left
    /// to the owning mode switch.
    pub fn reset(&mut self) {
        self.input_enabled = true;
        self.hud_synced = false;

        self.connected = false;
        self.started = false;
        self.local_player_id = None;

        self.start_received = false;
        self.seed = 0;
        self.level = 1;

        self.pending_room = None;
        self.disconnect_reason = None;
        self.game_over_loser = None;

        self.snap_frames = 0;
        self.snapshots.clear();

        self.appearances.clear();

        self.item_spawns.clear();
        self.item_despawns.clear();
        self.enemy_spawns.clear();
        self.enemy_moves.clear();
        self.enemy_despawns.clear();
        self.hud_updates.clear();
        self.other_updates.clear();
        self.room_clears.clear();

        self.other_player = None;
    }

    // ----- getters / consume API -----

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_world_ready(&self) -> bool {
        self.world_ready
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn is_hud_synced(&self) -> bool {
        self.hud_synced
    }

    pub fn local_player_id(&self) -> Option<PlayerId> {
        self.local_player_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn other_player(&self) -> Option<OtherStatus> {
        self.other_player
    }

    pub fn appearance(&self, player_id: PlayerId) -> Option<&PlayerAppearance> {
        self.appearances.get(&player_id)
    }

    pub fn consume_start_received(&mut self) -> bool {
        std::mem::take(&mut self.start_received)
    }

    pub fn consume_pending_room_change(&mut self) -> Option<RoomChange> {
        self.pending_room.take()
    }

    pub fn consume_game_over_loser(&mut self) -> Option<PlayerId> {
        self.game_over_loser.take()
    }

    pub fn consume_disconnect_reason(&mut self) -> Option<DisconnectReason> {
        self.disconnect_reason.take()
    }

    pub fn set_disconnect_reason(&mut self, reason: DisconnectReason) {
        self.disconnect_reason = Some(reason);
    }

    pub fn sample_count(&self, entity_id: PlayerId) -> usize {
        self.snapshots.sample_count(entity_id)
    }

    // ----- receive side -----

    /// Translates one decoded command into session-state changes. Runs on
    /// the receiver thread, under the session lock.
    pub fn apply_command(&mut self, command: ServerCommand, now_ms: i64) {
        match command {
            ServerCommand::Connected { player_id } => self.on_connected(player_id),
            ServerCommand::Appearance {
                player_id,
                gender,
                style,
            } => {
                self.appearances
                    .insert(player_id, PlayerAppearance { gender, style });
            }
            ServerCommand::Start { seed, level } => self.on_start(seed, level),
            ServerCommand::UpdatePosition { entity_id, x, y } => {
                self.snapshots.push(entity_id, Vec2::new(x, y), now_ms);
            }
            ServerCommand::UpdateRoom(change) => self.on_update_room(change),
            ServerCommand::SpawnItem {
                item_id,
                kind,
                x,
                y,
            } => {
                if !self.online {
                    return;
                }
                push_bounded(
                    &mut self.item_spawns,
                    ItemSpawn {
                        item_id,
                        kind,
                        pos: Vec2::new(x, y),
                    },
                    MAX_PENDING_ITEM_SPAWNS,
                );
            }
            ServerCommand::DespawnItem { item_id } => self.on_despawn_item(item_id),
            // A pickup implies the item leaves the world; inventory and
            // stats follow through Hud.
            ServerCommand::PickupItem { item_id, .. } => self.on_despawn_item(item_id),
            ServerCommand::Hud {
                player_id,
                hp,
                hp_max,
                inventory_csv,
            } => self.on_hud(player_id, hp, hp_max, Some(inventory_csv)),
            ServerCommand::Other {
                player_id,
                hp,
                hp_max,
            } => self.on_other(player_id, hp, hp_max),
            ServerCommand::SpawnEnemy {
                enemy_id,
                name,
                x,
                y,
                room,
            } => {
                if !self.online {
                    return;
                }
                push_bounded(
                    &mut self.enemy_spawns,
                    EnemySpawn {
                        enemy_id,
                        name,
                        pos: Vec2::new(x, y),
                        room,
                    },
                    MAX_PENDING_ENEMY_SPAWNS,
                );
            }
            ServerCommand::UpdateEnemy { enemy_id, x, y } => {
                if !self.online {
                    return;
                }
                push_bounded(
                    &mut self.enemy_moves,
                    EnemyMove {
                        enemy_id,
                        pos: Vec2::new(x, y),
                    },
                    MAX_PENDING_ENEMY_MOVES,
                );
            }
            ServerCommand::DespawnEnemy { enemy_id } => {
                if !self.online {
                    return;
                }
                push_bounded(
                    &mut self.enemy_despawns,
                    enemy_id,
                    MAX_PENDING_ENEMY_DESPAWNS,
                );
            }
            ServerCommand::RoomClear { room } => {
                if !self.online {
                    return;
                }
                push_bounded(&mut self.room_clears, room, MAX_PENDING_ROOM_CLEARS);
            }
            ServerCommand::Damage {
                player_id,
                hp,
                hp_max,
            } => self.on_damage(player_id, hp, hp_max),
            ServerCommand::Dead { player_id } => {
                // Informative only; the HUD already reflects hp = 0.
                log::debug!("player {player_id} reported dead");
            }
            ServerCommand::GameOver { loser_id } => self.on_game_over(loser_id),
            ServerCommand::Disconnect => {
                self.disconnect_reason = Some(DisconnectReason::ServerClosed);
            }
        }
    }

    fn on_connected(&mut self, player_id: PlayerId) {
        self.local_player_id = Some(player_id);
        self.connected = true;
        self.online = true;
        log::info!("connected, local player id {player_id}");
    }

    fn on_start(&mut self, seed: u64, level: i32) {
        self.seed = seed;
        self.level = level;

        self.snapshots.clear();
        self.pending_room = None;

        self.start_received = true;
        self.started = true;
        self.hud_synced = false;

        // Local input stays suppressed until the owning mode releases it.
        self.input_enabled = false;

        self.snap_frames = SNAP_FRAMES;

        log::info!("start received, seed={seed} level={level}");
    }

    fn on_update_room(&mut self, change: RoomChange) {
        // Last-write-wins: only the destination matters if the server
        // announces twice before a frame consumes the change.
        self.pending_room = Some(change);
        self.snap_frames = SNAP_FRAMES;
    }

    fn on_despawn_item(&mut self, item_id: ItemId) {
        if !self.online {
            return;
        }
        push_bounded(&mut self.item_despawns, item_id, MAX_PENDING_ITEM_DESPAWNS);
    }

    fn on_hud(&mut self, player_id: PlayerId, hp: i32, hp_max: i32, inventory: Option<String>) {
        if !self.online {
            return;
        }
        push_bounded(
            &mut self.hud_updates,
            HudUpdate {
                player_id,
                hp,
                hp_max,
                inventory,
            },
            MAX_PENDING_HUD,
        );
    }

    fn on_other(&mut self, player_id: PlayerId, hp: i32, hp_max: i32) {
        if !self.online {
            return;
        }
        push_bounded(
            &mut self.other_updates,
            OtherStatus {
                player_id,
                hp,
                hp_max,
            },
            MAX_PENDING_OTHER,
        );
    }

    fn on_damage(&mut self, player_id: PlayerId, hp: i32, hp_max: i32) {
        if !self.online {
            return;
        }
        // Damage for the local player refreshes the HUD (without touching
        // the displayed inventory); damage for the remote player refreshes
        // the secondary status widget.
        if self.local_player_id == Some(player_id) {
            self.on_hud(player_id, hp, hp_max, None);
        } else {
            self.on_other(player_id, hp, hp_max);
        }
    }

    fn on_game_over(&mut self, loser_id: PlayerId) {
        if !self.online {
            return;
        }
        self.game_over_loser = Some(loser_id);
        self.input_enabled = false;
        log::info!("game over received, loser id {loser_id}");
    }

    // ----- frame side -----

    /// Called once an announced room change has been applied to the world:
    /// drop cross-room sample history and re-arm the snap window.
    pub fn room_change_applied(&mut self) {
        self.snapshots.clear();
        self.snap_frames = SNAP_FRAMES;
    }

    /// Applies HUD/other-player updates and places every remote body at its
    /// time-delayed interpolated position. Render-only placement: bodies
    /// are halted, and nothing here feeds back into authority decisions.
    pub fn apply_pending_updates(&mut self, world: &mut dyn EntityWorld, now_ms: i64) {
        if !self.online || !self.world_ready {
            return;
        }

        self.apply_hud_pending(world);
        self.apply_other_pending();

        let render_time_ms = now_ms - INTERP_DELAY_MS;

        let snap = self.snap_frames > 0;
        if snap {
            self.snap_frames -= 1;
        }

        for entity_id in self.snapshots.entity_ids() {
            let pos = if snap {
                self.snapshots.collapse_to_latest(entity_id).map(|s| s.pos)
            } else {
                self.snapshots.sample_at(entity_id, render_time_ms)
            };
            let Some(pos) = pos else { continue };
            if let Some(body) = world.player_body(entity_id) {
                body.set_position(pos);
                body.halt();
            }
        }
    }

    fn apply_hud_pending(&mut self, world: &mut dyn EntityWorld) {
        while let Some(update) = self.hud_updates.pop_front() {
            // Each client renders its own HUD only.
            if self
                .local_player_id
                .is_some_and(|local| update.player_id != local)
            {
                continue;
            }
            world.apply_hud(
                update.player_id,
                update.hp,
                update.hp_max,
                update.inventory.as_deref(),
            );
            self.hud_synced = true;
        }
    }

    fn apply_other_pending(&mut self) {
        while let Some(status) = self.other_updates.pop_front() {
            self.other_player = Some(status);
        }
    }

    /// Server-driven item spawns/despawns. The client never decides pickups
    /// online; it only mirrors what the server says exists.
    pub fn apply_item_events(&mut self, world: &mut dyn EntityWorld) {
        if !self.online || !self.world_ready {
            return;
        }
        while let Some(spawn) = self.item_spawns.pop_front() {
            world.spawn_item(spawn.item_id, &spawn.kind, spawn.pos);
        }
        while let Some(item_id) = self.item_despawns.pop_front() {
            world.despawn_item(item_id);
        }
    }

    /// Server-driven enemies; the client does not simulate AI online.
    pub fn apply_enemy_events(&mut self, world: &mut dyn EntityWorld) {
        if !self.online || !self.world_ready {
            return;
        }
        while let Some(spawn) = self.enemy_spawns.pop_front() {
            world.spawn_enemy(spawn.enemy_id, &spawn.name, spawn.pos, &spawn.room);
        }
        while let Some(update) = self.enemy_moves.pop_front() {
            world.update_enemy(update.enemy_id, update.pos);
        }
        while let Some(enemy_id) = self.enemy_despawns.pop_front() {
            world.despawn_enemy(enemy_id);
        }
    }

    /// One room-clear announcement per frame: unlock the puzzle and kill
    /// the room's enemies with feedback.
    pub fn apply_room_clear(&mut self, puzzle: &mut dyn PuzzleState, world: &mut dyn EntityWorld) {
        if !self.online {
            return;
        }
        let Some(room) = self.room_clears.pop_front() else {
            return;
        };
        puzzle.mark_cleared(&room);
        world.kill_room_enemies(&room);
    }
}
