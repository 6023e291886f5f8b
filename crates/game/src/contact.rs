use glam::Vec2;

use crate::event::{
    ButtonEvent, DamageEvent, DoorEvent, EventQueue, GameEvent, LevelCompleteEvent, PickupEvent,
};
use crate::types::{ButtonSpec, DoorLink, EnemyId, ItemId, PlayerId, RoomId};

/// Kind tag the physics glue attaches to every body/fixture the contact
/// listener can see. One discriminated match replaces runtime type
/// introspection on body user-data.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactTag {
    Player { player_id: PlayerId },
    Enemy { enemy_id: EnemyId, position: Vec2 },
    Door(DoorLink),
    Button(ButtonSpec),
    Item { item_id: ItemId },
    Hatch { room: RoomId },
}

/// What the router needs to know about the frame it runs in.
#[derive(Debug, Clone)]
pub struct ContactContext {
    pub current_room: RoomId,
    pub online: bool,
    pub door_cooldown_active: bool,
}

/// Translates begin/end contact pairs into queued events. Never mutates
/// simulation state: publishing is the only effect, and the per-frame
/// consumers apply everything later, outside the physics callback.
#[derive(Debug, Default)]
pub struct ContactRouter;

impl ContactRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn begin_contact(
        &self,
        a: &ContactTag,
        b: &ContactTag,
        ctx: &ContactContext,
        events: &mut EventQueue,
    ) {
        // Both fixtures of a sensor can report the same contact; consumers
        // dedup per frame, so publishing from either order is fine.
        self.route_begin(a, b, ctx, events);
        self.route_begin(b, a, ctx, events);
    }

    pub fn end_contact(&self, a: &ContactTag, b: &ContactTag, events: &mut EventQueue) {
        self.route_end(a, b, events);
        self.route_end(b, a, events);
    }

    fn route_begin(
        &self,
        first: &ContactTag,
        second: &ContactTag,
        ctx: &ContactContext,
        events: &mut EventQueue,
    ) {
        let ContactTag::Player { player_id } = *first else {
            return;
        };

        match second {
            // Online, doors are decided by the server; the client never
            // queues a local crossing.
            ContactTag::Door(door) => {
                if ctx.online || ctx.door_cooldown_active {
                    return;
                }
                if door.origin != ctx.current_room {
                    return;
                }
                events.publish(GameEvent::DoorCrossing(DoorEvent {
                    door: door.clone(),
                    player_id,
                }));
            }
            ContactTag::Item { item_id } => {
                events.publish(GameEvent::Pickup(PickupEvent {
                    item_id: *item_id,
                    player_id,
                }));
            }
            ContactTag::Button(button) => {
                events.publish(GameEvent::Button(ButtonEvent {
                    button: button.clone(),
                    player_id,
                    pressed: true,
                }));
            }
            ContactTag::Enemy { position, .. } => {
                events.publish(GameEvent::Damage(DamageEvent {
                    player_id,
                    origin: *position,
                }));
            }
            ContactTag::Hatch { room } => {
                if *room != ctx.current_room {
                    return;
                }
                events.publish(GameEvent::LevelComplete(LevelCompleteEvent {
                    room: room.clone(),
                }));
            }
            ContactTag::Player { .. } => {}
        }
    }

    fn route_end(&self, first: &ContactTag, second: &ContactTag, events: &mut EventQueue) {
        let ContactTag::Player { player_id } = *first else {
            return;
        };
        if let ContactTag::Button(button) = second {
            events.publish(GameEvent::Button(ButtonEvent {
                button: button.clone(),
                player_id,
                pressed: false,
            }));
        }
    }
}
