mod world;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use delve::{EventQueue, GameClient, GameUpdateSystem, RoomId, UpdateContext};

use world::{HeadlessPuzzle, HeadlessWorld};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Headless dungeon-crawler client")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    server: String,

    #[arg(short, long, default_value_t = delve::DEFAULT_PORT)]
    port: u16,

    #[arg(long, help = "Appearance fields sent with Connect, e.g. FEMALE ROGUE")]
    appearance: Vec<String>,

    #[arg(long, default_value_t = 60, help = "Frame rate of the update loop")]
    frame_rate: u32,

    #[arg(long, default_value_t = 0, help = "Stop after this many seconds (0 = run forever)")]
    seconds: u64,

    #[arg(long, default_value = "A1", help = "Room the session starts in")]
    start_room: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let server_addr = format!("{}:{}", args.server, args.port);

    let mut client =
        GameClient::connect(server_addr.as_str()).context("binding client socket")?;
    client.send_connect(&args.appearance);
    log::info!("connecting to {server_addr}");

    run(&client, &args);

    client.shutdown();
    Ok(())
}

fn run(client: &GameClient, args: &Args) {
    let frame = Duration::from_secs_f64(1.0 / args.frame_rate.max(1) as f64);
    let deadline = (args.seconds > 0).then(|| Instant::now() + Duration::from_secs(args.seconds));

    let mut system = GameUpdateSystem::new();
    let mut events = EventQueue::new();
    let mut world = HeadlessWorld::new();
    let mut puzzle = HeadlessPuzzle;
    let mut room = RoomId::new(args.start_room.clone());

    let mut world_ready = false;
    let started_at = Instant::now();

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::info!("time limit reached, shutting down");
            return;
        }

        if client.consume_start_received() {
            let session = client.session();
            log::info!(
                "match started: seed={} level={}",
                session.seed(),
                session.level()
            );
            drop(session);

            // A full client loads the level here; the headless world is
            // ready immediately.
            system.reset();
            world_ready = true;
            client.set_world_ready(true);
            client.send_ready();
            client.set_input_enabled(true);
        }

        if let Some(reason) = client.consume_disconnect_reason() {
            log::warn!("session ended: {reason:?}");
            return;
        }

        if let Some(loser) = client.consume_game_over_loser() {
            log::info!("game over, player {loser} lost");
            return;
        }

        if world_ready {
            if client.input_enabled() {
                let (dx, dy) = wander(started_at.elapsed());
                client.send_move(dx, dy);
            }

            let mut ctx = UpdateContext {
                current_room: room.clone(),
                online: true,
                events: &mut events,
                world: &mut world,
                puzzle: &mut puzzle,
                client: Some(client),
            };
            room = system.update(&mut ctx);

            if let Some(other) = client.session().other_player() {
                log::trace!(
                    "other player {}: {}/{} hp",
                    other.player_id,
                    other.hp,
                    other.hp_max
                );
            }
            for id in [1, 2] {
                if let Some(pos) = world.body_position(id) {
                    log::trace!("player {id} rendered at {pos}");
                }
            }
        }

        thread::sleep(frame);
    }
}

/// Simple movement intent: walk each compass direction for a second in
/// turn. Enough to watch positions flow both ways.
fn wander(elapsed: Duration) -> (i8, i8) {
    match elapsed.as_secs() % 4 {
        0 => (1, 0),
        1 => (0, 1),
        2 => (-1, 0),
        _ => (0, -1),
    }
}
