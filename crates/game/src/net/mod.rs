mod client;
mod protocol;
mod session;
mod snapshot;

pub use client::{GameClient, now_ms};
pub use protocol::{
    ClientCommand, DEFAULT_PORT, DecodeError, FIELD_SEP, MAX_DATAGRAM_SIZE, ServerCommand, decode,
};
pub use session::{DisconnectReason, OtherStatus, PlayerAppearance, SessionState};
pub use snapshot::{
    INTERP_DELAY_MS, MAX_SAMPLES_PER_ENTITY, SNAP_FRAMES, Sample, SampleQueue, SnapshotBuffer,
};
