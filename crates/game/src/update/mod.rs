use std::collections::HashSet;

use glam::Vec2;

use crate::event::{EventKind, EventQueue};
use crate::net::GameClient;
use crate::room::{RoomSync, RoomTransition};
use crate::types::{ItemId, PlayerId, RoomId};
use crate::world::{EntityWorld, PuzzleState};

/// How far a damaged player is shoved away from the damage origin before
/// the effect lands, so an overlapping enemy cannot re-hit every frame.
pub const DAMAGE_SEPARATION: f32 = 40.0;

/// Everything one frame of gameplay update needs. Built fresh each frame
/// by the owner of the world; `client` is None in offline play.
pub struct UpdateContext<'a> {
    pub current_room: RoomId,
    pub online: bool,
    pub events: &'a mut EventQueue,
    pub world: &'a mut dyn EntityWorld,
    pub puzzle: &'a mut dyn PuzzleState,
    pub client: Option<&'a GameClient>,
}

/// Per-frame sequencing of the gameplay update: door transitions first,
/// then buttons, then either the offline consumers (pickups, damage, level
/// complete) or the online network appliers. Start/game-over/disconnect
/// consumption stays with the owning game mode; this system only runs the
/// steady-state frame.
#[derive(Debug, Default)]
pub struct GameUpdateSystem {
    transition: RoomTransition,
    room_sync: RoomSync,
    items_picked: HashSet<ItemId>,
    players_hit: HashSet<PlayerId>,
}

impl GameUpdateSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// For the contact router's frame context.
    pub fn door_cooldown_active(&self) -> bool {
        self.transition.cooldown_active()
    }

    /// Call when a match or level restarts.
    pub fn reset(&mut self) {
        self.room_sync.reset();
    }

    /// Runs one frame and returns the (possibly changed) current room.
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> RoomId {
        let mut room = ctx.current_room.clone();

        self.transition.tick_cooldown();

        if let Some(new_room) = self.transition.process_pending_doors(
            &room,
            ctx.events,
            ctx.puzzle,
            ctx.world,
            ctx.online,
            ctx.client,
        ) {
            room = new_room;
        }

        self.process_buttons(&room, ctx);

        if ctx.online {
            // Pickups and damage are server decisions; local contact events
            // for them must never apply.
            ctx.events.clear(EventKind::Pickup);
            ctx.events.clear(EventKind::Damage);
            ctx.events.clear(EventKind::LevelComplete);
            room = self.apply_online_state(room, ctx);
        } else {
            self.process_pickups(ctx);
            self.process_damage(ctx);
            self.process_level_complete(&room, ctx);
        }

        room
    }

    fn process_buttons(&mut self, room: &RoomId, ctx: &mut UpdateContext<'_>) {
        let UpdateContext {
            events,
            world,
            puzzle,
            client,
            online,
            ..
        } = ctx;
        let online = *online;

        events.drain_buttons(|ev| {
            if ev.button.room != *room {
                return;
            }
            // A plate only answers to the player it was laid out for.
            if ev.player_id != ev.button.player_id {
                return;
            }

            if ev.pressed {
                let unlocked = puzzle.button_down(room, ev.player_id);
                if unlocked {
                    log::info!("room {room} unlocked by button");
                    if online {
                        if let Some(client) = client {
                            client.send_room_clear_request(room);
                        }
                    } else {
                        world.kill_room_enemies(room);
                    }
                }
            } else {
                puzzle.button_up(room, ev.player_id);
            }
        });
    }

    fn process_pickups(&mut self, ctx: &mut UpdateContext<'_>) {
        let items_picked = &mut self.items_picked;
        items_picked.clear();

        let UpdateContext { events, world, .. } = ctx;
        events.drain_pickups(|ev| {
            // Both sensor fixtures can report the same item in one step.
            if !items_picked.insert(ev.item_id) {
                return;
            }
            world.pickup_item(ev.player_id, ev.item_id);
        });
    }

    fn process_damage(&mut self, ctx: &mut UpdateContext<'_>) {
        let players_hit = &mut self.players_hit;
        players_hit.clear();

        let UpdateContext { events, world, .. } = ctx;
        events.drain_damage(|ev| {
            if !players_hit.insert(ev.player_id) {
                return;
            }
            if !world.player_vulnerable(ev.player_id) {
                return;
            }

            if let Some(body) = world.player_body(ev.player_id) {
                let pos = body.position();
                let away = pos - ev.origin;
                let dir = if away.length_squared() < 1e-4 {
                    Vec2::X
                } else {
                    away.normalize()
                };
                body.set_position(pos + dir * DAMAGE_SEPARATION);
                body.halt();
            }

            world.damage_player(ev.player_id);
        });
    }

    fn process_level_complete(&mut self, room: &RoomId, ctx: &mut UpdateContext<'_>) {
        let UpdateContext { events, world, .. } = ctx;
        let mut completed = false;
        events.drain_level_complete(|ev| {
            if completed || ev.room != *room {
                return;
            }
            completed = true;
            world.complete_level(&ev.room);
        });
    }

    /// Online tail of the frame: apply what the server sent since the last
    /// frame. The announced room change lands here; the client never moved
    /// itself when the door was crossed.
    fn apply_online_state(&mut self, room: RoomId, ctx: &mut UpdateContext<'_>) -> RoomId {
        let mut room = room;
        let Some(client) = ctx.client else {
            return room;
        };

        if let Some(change) = client.consume_pending_room_change() {
            if change.room != room {
                let old = room.clone();
                room = change.room.clone();
                log::info!("server moved us {old} -> {room}");
                ctx.world.room_changed(&old, &room);
                self.room_sync.on_room_changed(&room, true, ctx.puzzle);
                client.room_change_applied();
            }
        }

        client.apply_item_events(ctx.world);
        client.apply_enemy_events(ctx.world);
        client.apply_room_clear(ctx.puzzle, ctx.world);
        client.apply_pending_updates(ctx.world);

        room
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ButtonEvent, DamageEvent, GameEvent, LevelCompleteEvent, PickupEvent};
    use crate::net::ServerCommand;
    use crate::types::{ButtonSpec, DoorLink, EnemyId, EntityId, RoomChange};
    use crate::world::BodyHandle;

    #[derive(Debug, Default)]
    struct Body {
        pos: Vec2,
        halted: bool,
    }

    impl BodyHandle for Body {
        fn position(&self) -> Vec2 {
            self.pos
        }

        fn set_position(&mut self, pos: Vec2) {
            self.pos = pos;
        }

        fn halt(&mut self) {
            self.halted = true;
        }
    }

    #[derive(Debug, Default)]
    struct World {
        body: Body,
        invulnerable: bool,
        damaged: Vec<PlayerId>,
        picked: Vec<(PlayerId, ItemId)>,
        killed_rooms: Vec<RoomId>,
        completed: Vec<RoomId>,
        room_changes: Vec<(RoomId, RoomId)>,
        items_spawned: Vec<ItemId>,
    }

    impl EntityWorld for World {
        fn spawn_item(&mut self, item_id: ItemId, _kind: &str, _pos: Vec2) {
            self.items_spawned.push(item_id);
        }

        fn despawn_item(&mut self, _item_id: ItemId) {}

        fn pickup_item(&mut self, player_id: PlayerId, item_id: ItemId) {
            self.picked.push((player_id, item_id));
        }

        fn spawn_enemy(&mut self, _enemy_id: EnemyId, _name: &str, _pos: Vec2, _room: &RoomId) {}
        fn update_enemy(&mut self, _enemy_id: EnemyId, _pos: Vec2) {}
        fn despawn_enemy(&mut self, _enemy_id: EnemyId) {}
        fn remove_room_enemies(&mut self, _room: &RoomId) {}

        fn kill_room_enemies(&mut self, room: &RoomId) {
            self.killed_rooms.push(room.clone());
        }

        fn enemies_alive_in(&self, _room: &RoomId) -> usize {
            0
        }

        fn enter_adjacent_room(&mut self, door: &DoorLink, _player_id: PlayerId) -> Option<RoomId> {
            Some(door.dest.clone())
        }

        fn populate_room(&mut self, _room: &RoomId) {}

        fn room_changed(&mut self, old: &RoomId, new: &RoomId) {
            self.room_changes.push((old.clone(), new.clone()));
        }

        fn player_body(&mut self, _entity_id: EntityId) -> Option<&mut dyn BodyHandle> {
            Some(&mut self.body)
        }

        fn player_vulnerable(&self, _player_id: PlayerId) -> bool {
            !self.invulnerable
        }

        fn damage_player(&mut self, player_id: PlayerId) {
            self.damaged.push(player_id);
        }

        fn apply_hud(
            &mut self,
            _player_id: PlayerId,
            _hp: i32,
            _hp_max: i32,
            _inventory: Option<&str>,
        ) {
        }

        fn complete_level(&mut self, room: &RoomId) {
            self.completed.push(room.clone());
        }
    }

    #[derive(Debug, Default)]
    struct Puzzle {
        unlock_on_press: bool,
        downs: Vec<(RoomId, PlayerId)>,
        ups: Vec<(RoomId, PlayerId)>,
        entered: Vec<RoomId>,
    }

    impl PuzzleState for Puzzle {
        fn is_locked(&self, _room: &RoomId) -> bool {
            false
        }

        fn on_room_entered(&mut self, room: &RoomId) {
            self.entered.push(room.clone());
        }

        fn button_down(&mut self, room: &RoomId, player_id: PlayerId) -> bool {
            self.downs.push((room.clone(), player_id));
            self.unlock_on_press
        }

        fn button_up(&mut self, room: &RoomId, player_id: PlayerId) {
            self.ups.push((room.clone(), player_id));
        }

        fn mark_cleared(&mut self, _room: &RoomId) {}
        fn set_enemies_alive(&mut self, _room: &RoomId, _count: usize) {}
    }

    fn damage(player_id: PlayerId, x: f32, y: f32) -> GameEvent {
        GameEvent::Damage(DamageEvent {
            player_id,
            origin: Vec2::new(x, y),
        })
    }

    fn run_offline(
        system: &mut GameUpdateSystem,
        events: &mut EventQueue,
        world: &mut World,
        puzzle: &mut Puzzle,
    ) -> RoomId {
        let mut ctx = UpdateContext {
            current_room: "A1".into(),
            online: false,
            events,
            world,
            puzzle,
            client: None,
        };
        system.update(&mut ctx)
    }

    #[test]
    fn duplicate_damage_lands_once_per_frame() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        events.publish(damage(1, 10.0, 0.0));
        events.publish(damage(1, 10.0, 0.0));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert_eq!(world.damaged, vec![1]);
    }

    #[test]
    fn damage_shoves_victim_away_from_origin() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        // Body at origin, damage source to the right: shove goes left.
        events.publish(damage(1, 10.0, 0.0));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert_eq!(world.body.pos, Vec2::new(-DAMAGE_SEPARATION, 0.0));
        assert!(world.body.halted);
    }

    #[test]
    fn overlapping_damage_origin_still_separates() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        events.publish(damage(1, 0.0, 0.0));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert!(world.body.pos.length() > 0.0);
        assert_eq!(world.damaged, vec![1]);
    }

    #[test]
    fn invulnerable_player_takes_nothing() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World {
            invulnerable: true,
            ..World::default()
        };
        let mut puzzle = Puzzle::default();

        events.publish(damage(1, 5.0, 5.0));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert!(world.damaged.is_empty());
        assert_eq!(world.body.pos, Vec2::ZERO);
    }

    #[test]
    fn duplicate_pickups_dedup_by_item() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        for _ in 0..2 {
            events.publish(GameEvent::Pickup(PickupEvent {
                item_id: 5,
                player_id: 1,
            }));
        }
        events.publish(GameEvent::Pickup(PickupEvent {
            item_id: 6,
            player_id: 2,
        }));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert_eq!(world.picked, vec![(1, 5), (2, 6)]);
    }

    #[test]
    fn button_unlock_kills_enemies_offline() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle {
            unlock_on_press: true,
            ..Puzzle::default()
        };

        events.publish(GameEvent::Button(ButtonEvent {
            button: ButtonSpec {
                room: "A1".into(),
                player_id: 1,
            },
            player_id: 1,
            pressed: true,
        }));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert_eq!(puzzle.downs, vec![(RoomId::from("A1"), 1)]);
        assert_eq!(world.killed_rooms, vec![RoomId::from("A1")]);
    }

    #[test]
    fn wrong_player_on_button_is_rejected() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        events.publish(GameEvent::Button(ButtonEvent {
            button: ButtonSpec {
                room: "A1".into(),
                player_id: 2,
            },
            player_id: 1,
            pressed: true,
        }));
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert!(puzzle.downs.is_empty());
    }

    #[test]
    fn level_complete_fires_once_for_current_room() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        for room in ["A1", "A1", "Z9"] {
            events.publish(GameEvent::LevelComplete(LevelCompleteEvent {
                room: room.into(),
            }));
        }
        run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert_eq!(world.completed, vec![RoomId::from("A1")]);
    }

    #[test]
    fn offline_door_changes_returned_room() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        events.publish(GameEvent::DoorCrossing(crate::event::DoorEvent {
            door: DoorLink {
                origin: "A1".into(),
                dest: "A2".into(),
                direction: crate::types::Direction::South,
            },
            player_id: 1,
        }));
        let room = run_offline(&mut system, &mut events, &mut world, &mut puzzle);

        assert_eq!(room, RoomId::from("A2"));
        assert!(system.door_cooldown_active());
    }

    #[test]
    fn online_clears_local_pickup_and_damage_events() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        events.publish(damage(1, 1.0, 1.0));
        events.publish(GameEvent::Pickup(PickupEvent {
            item_id: 1,
            player_id: 1,
        }));

        let mut ctx = UpdateContext {
            current_room: "A1".into(),
            online: true,
            events: &mut events,
            world: &mut world,
            puzzle: &mut puzzle,
            client: None,
        };
        system.update(&mut ctx);

        assert!(world.damaged.is_empty());
        assert!(world.picked.is_empty());
        assert!(events.is_empty(EventKind::Damage));
        assert!(events.is_empty(EventKind::Pickup));
    }

    #[test]
    fn online_room_change_applies_through_server_state() {
        let mut system = GameUpdateSystem::new();
        let mut events = EventQueue::new();
        let mut world = World::default();
        let mut puzzle = Puzzle::default();

        let client = GameClient::connect("127.0.0.1:9").unwrap();
        {
            let mut session = client.session();
            session.set_world_ready(true);
            session.apply_command(ServerCommand::Connected { player_id: 1 }, 0);
            session.apply_command(ServerCommand::UpdateRoom(RoomChange::new("B3".into())), 0);
            session.apply_command(
                ServerCommand::SpawnItem {
                    item_id: 11,
                    kind: "KEY".to_string(),
                    x: 0.0,
                    y: 0.0,
                },
                0,
            );
        }

        let mut ctx = UpdateContext {
            current_room: "A1".into(),
            online: true,
            events: &mut events,
            world: &mut world,
            puzzle: &mut puzzle,
            client: Some(&client),
        };
        let room = system.update(&mut ctx);

        assert_eq!(room, RoomId::from("B3"));
        assert_eq!(
            world.room_changes,
            vec![(RoomId::from("A1"), RoomId::from("B3"))]
        );
        assert_eq!(puzzle.entered, vec![RoomId::from("B3")]);
        assert_eq!(world.items_spawned, vec![11]);
        // The change was consumed; the next frame stays put.
        assert!(client.consume_pending_room_change().is_none());
    }
}
