use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{SystemTime, UNIX_EPOCH};

use super::protocol::{self, ClientCommand, MAX_DATAGRAM_SIZE, ServerCommand};
use super::session::{DisconnectReason, SessionState};
use crate::types::{Direction, RoomId};
use crate::world::{EntityWorld, PuzzleState};

pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn lock_session(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the UDP socket and the blocking receiver thread, and fronts the
/// shared session state for the frame loop.
///
/// The configured server address is only the first hop: the effective
/// return address is learned from the source of the first `Connected`
/// reply, so NAT-traversed or dynamically-bound servers keep working.
pub struct GameClient {
    socket: Arc<UdpSocket>,
    state: Arc<Mutex<SessionState>>,
    server_addr: Arc<Mutex<SocketAddr>>,
    running: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
}

impl GameClient {
    /// Binds an ephemeral local socket and spawns the receive loop. No
    /// traffic is sent until `send_connect`.
    pub fn connect<A: ToSocketAddrs>(server: A) -> io::Result<Self> {
        let server_addr = server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no server address"))?;

        let socket = Arc::new(UdpSocket::bind("0.0.0.0:0")?);
        log::info!(
            "client socket bound on {}, server {}",
            socket.local_addr()?,
            server_addr
        );

        let mut session = SessionState::new();
        session.set_online(true);
        let state = Arc::new(Mutex::new(session));
        let server_addr = Arc::new(Mutex::new(server_addr));
        let running = Arc::new(AtomicBool::new(true));

        let receiver = {
            let socket = Arc::clone(&socket);
            let state = Arc::clone(&state);
            let server_addr = Arc::clone(&server_addr);
            let running = Arc::clone(&running);
            std::thread::Builder::new()
                .name("delve-net-recv".to_string())
                .spawn(move || receive_loop(&socket, &state, &server_addr, &running))?
        };

        Ok(Self {
            socket,
            state,
            server_addr,
            running,
            receiver: Some(receiver),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn server_addr(&self) -> SocketAddr {
        *self
            .server_addr
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Direct access to the session under its lock. Callers must not hold
    /// the guard across a `send_*` call.
    pub fn session(&self) -> MutexGuard<'_, SessionState> {
        lock_session(&self.state)
    }

    // ----- outbound -----

    /// Handshake: announces this client (optionally with appearance
    /// fields) to the configured server address.
    pub fn send_connect(&self, appearance: &[String]) {
        self.send_command(&ClientCommand::Connect {
            appearance: appearance.to_vec(),
        });
    }

    /// Signals that the local world finished loading and the server should
    /// send its first full state snapshot.
    pub fn send_ready(&self) {
        if !self.gameplay_allowed() {
            return;
        }
        self.send_command(&ClientCommand::Ready);
    }

    /// Periodic movement intent. Resent every input tick; a lost datagram
    /// just means the next tick's intent wins.
    pub fn send_move(&self, dx: i8, dy: i8) {
        if !self.gameplay_allowed() {
            return;
        }
        self.send_command(&ClientCommand::Move { dx, dy });
    }

    pub fn send_door_crossing(&self, origin: &RoomId, dest: &RoomId, direction: Direction) {
        if !self.gameplay_allowed() {
            return;
        }
        let player_id = self.session().local_player_id();
        self.send_command(&ClientCommand::Door {
            player_id,
            origin: origin.clone(),
            dest: dest.clone(),
            direction,
        });
    }

    pub fn send_room_clear_request(&self, room: &RoomId) {
        if !self.gameplay_allowed() {
            return;
        }
        self.send_command(&ClientCommand::RoomClearReq { room: room.clone() });
    }

    /// Gameplay commands are held back until the handshake completed and
    /// the server started the match.
    fn gameplay_allowed(&self) -> bool {
        let session = self.session();
        session.is_online() && session.is_started()
    }

    fn send_command(&self, command: &ClientCommand) {
        let line = command.encode();
        let addr = self.server_addr();
        log::debug!(">> {line}");
        if let Err(err) = self.socket.send_to(line.as_bytes(), addr) {
            // Best-effort messaging: the periodic input tick resends intent.
            log::trace!("send failed: {err}");
        }
    }

    // ----- session state passthroughs for the frame loop -----

    pub fn is_online(&self) -> bool {
        self.session().is_online()
    }

    pub fn is_connected(&self) -> bool {
        self.session().is_connected()
    }

    pub fn is_started(&self) -> bool {
        self.session().is_started()
    }

    pub fn input_enabled(&self) -> bool {
        self.session().input_enabled()
    }

    pub fn set_input_enabled(&self, enabled: bool) {
        self.session().set_input_enabled(enabled);
    }

    pub fn set_world_ready(&self, ready: bool) {
        self.session().set_world_ready(ready);
    }

    pub fn local_player_id(&self) -> Option<crate::types::PlayerId> {
        self.session().local_player_id()
    }

    pub fn consume_start_received(&self) -> bool {
        self.session().consume_start_received()
    }

    pub fn consume_pending_room_change(&self) -> Option<crate::types::RoomChange> {
        self.session().consume_pending_room_change()
    }

    pub fn consume_game_over_loser(&self) -> Option<crate::types::PlayerId> {
        self.session().consume_game_over_loser()
    }

    pub fn consume_disconnect_reason(&self) -> Option<DisconnectReason> {
        self.session().consume_disconnect_reason()
    }

    pub fn room_change_applied(&self) {
        self.session().room_change_applied();
    }

    pub fn apply_pending_updates(&self, world: &mut dyn EntityWorld) {
        self.session().apply_pending_updates(world, now_ms());
    }

    pub fn apply_item_events(&self, world: &mut dyn EntityWorld) {
        self.session().apply_item_events(world);
    }

    pub fn apply_enemy_events(&self, world: &mut dyn EntityWorld) {
        self.session().apply_enemy_events(world);
    }

    pub fn apply_room_clear(&self, puzzle: &mut dyn PuzzleState, world: &mut dyn EntityWorld) {
        self.session().apply_room_clear(puzzle, world);
    }

    // ----- shutdown -----

    /// Stops the receive loop and joins it. The loop blocks on the socket,
    /// so a zero-length wake datagram to our own port releases it; the
    /// thread observes the cleared running flag and exits without touching
    /// the disconnect reason.
    pub fn shutdown(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Ok(local) = self.socket.local_addr() {
            let _ = self.socket.send_to(&[], wake_addr(local));
        }
        if let Some(handle) = self.receiver.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn wake_addr(local: SocketAddr) -> SocketAddr {
    // The socket binds the wildcard address, which is not routable as a
    // destination; wake through loopback on the same port instead.
    if local.ip().is_unspecified() {
        let loopback: IpAddr = match local.ip() {
            IpAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
            IpAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
        };
        SocketAddr::new(loopback, local.port())
    } else {
        local
    }
}

fn receive_loop(
    socket: &UdpSocket,
    state: &Mutex<SessionState>,
    server_addr: &Mutex<SocketAddr>,
    running: &AtomicBool,
) {
    log::debug!("receive loop started");
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                match protocol::decode(&buf[..len]) {
                    Ok(command) => {
                        if matches!(command, ServerCommand::Connected { .. }) {
                            // Learn the server's effective return address
                            // from its first reply.
                            *server_addr.lock().unwrap_or_else(PoisonError::into_inner) = from;
                        }
                        lock_session(state).apply_command(command, now_ms());
                    }
                    // Malformed frames are invisible: the loop must survive
                    // arbitrary garbage.
                    Err(err) => log::trace!("ignoring frame from {from}: {err}"),
                }
            }
            Err(err) => {
                if running.load(Ordering::SeqCst) {
                    log::warn!("receive failed: {err}");
                    lock_session(state)
                        .set_disconnect_reason(DisconnectReason::Io(err.to_string()));
                }
                break;
            }
        }
    }

    log::debug!("receive loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_joins_receiver_thread() {
        let mut client = GameClient::connect("127.0.0.1:9").unwrap();
        client.shutdown();
        assert!(client.receiver.is_none());
        // Expected shutdown never reads as a fault.
        assert_eq!(client.consume_disconnect_reason(), None);
    }

    #[test]
    fn gameplay_sends_require_started_session() {
        let client = GameClient::connect("127.0.0.1:9").unwrap();
        assert!(!client.gameplay_allowed());

        client
            .session()
            .apply_command(ServerCommand::Connected { player_id: 1 }, 0);
        assert!(!client.gameplay_allowed());

        client.session().apply_command(
            ServerCommand::Start {
                seed: 1,
                level: 1,
            },
            0,
        );
        assert!(client.gameplay_allowed());
    }
}
