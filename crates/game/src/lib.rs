pub mod contact;
pub mod event;
pub mod input;
pub mod net;
pub mod room;
pub mod types;
pub mod update;
pub mod world;

pub use contact::{ContactContext, ContactRouter, ContactTag};
pub use event::{
    ButtonEvent, DamageEvent, DoorEvent, EventKind, EventQueue, GameEvent, LevelCompleteEvent,
    PickupEvent,
};
pub use input::MoveFlags;
pub use net::{
    ClientCommand, DEFAULT_PORT, DecodeError, DisconnectReason, GameClient, INTERP_DELAY_MS,
    MAX_DATAGRAM_SIZE, MAX_SAMPLES_PER_ENTITY, OtherStatus, PlayerAppearance, SNAP_FRAMES, Sample,
    SampleQueue, ServerCommand, SessionState, SnapshotBuffer, decode, now_ms,
};
pub use room::{DOOR_COOLDOWN_FRAMES, RoomSync, RoomTransition};
pub use types::{
    ButtonSpec, Direction, DoorLink, EnemyId, EntityId, ItemId, PlayerId, RoomChange, RoomId,
};
pub use update::{DAMAGE_SEPARATION, GameUpdateSystem, UpdateContext};
pub use world::{BodyHandle, EntityWorld, PuzzleState};
