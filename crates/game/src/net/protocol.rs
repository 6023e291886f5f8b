use std::fmt::Write as _;
use std::str::FromStr;

use crate::types::{Direction, EnemyId, EntityId, ItemId, PlayerId, RoomChange, RoomId};

pub const FIELD_SEP: char = ':';
pub const MAX_DATAGRAM_SIZE: usize = 1024;
pub const DEFAULT_PORT: u16 = 5555;

/// Commands the server sends to the client. One datagram is one command;
/// no length framing, checksum, or version field. Best-effort text, peers
/// agree by convention.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerCommand {
    Connected {
        player_id: PlayerId,
    },
    Appearance {
        player_id: PlayerId,
        gender: String,
        style: String,
    },
    Start {
        seed: u64,
        level: i32,
    },
    UpdatePosition {
        entity_id: EntityId,
        x: f32,
        y: f32,
    },
    UpdateRoom(RoomChange),
    SpawnItem {
        item_id: ItemId,
        kind: String,
        x: f32,
        y: f32,
    },
    DespawnItem {
        item_id: ItemId,
    },
    PickupItem {
        player_id: PlayerId,
        item_id: ItemId,
        kind: String,
    },
    Hud {
        player_id: PlayerId,
        hp: i32,
        hp_max: i32,
        inventory_csv: String,
    },
    Other {
        player_id: PlayerId,
        hp: i32,
        hp_max: i32,
    },
    SpawnEnemy {
        enemy_id: EnemyId,
        name: String,
        x: f32,
        y: f32,
        room: RoomId,
    },
    UpdateEnemy {
        enemy_id: EnemyId,
        x: f32,
        y: f32,
    },
    DespawnEnemy {
        enemy_id: EnemyId,
    },
    RoomClear {
        room: RoomId,
    },
    Damage {
        player_id: PlayerId,
        hp: i32,
        hp_max: i32,
    },
    Dead {
        player_id: PlayerId,
    },
    GameOver {
        loser_id: PlayerId,
    },
    Disconnect,
}

/// Commands the client sends to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Connect { appearance: Vec<String> },
    Ready,
    Move { dx: i8, dy: i8 },
    Door {
        player_id: Option<PlayerId>,
        origin: RoomId,
        dest: RoomId,
        direction: Direction,
    },
    RoomClearReq { room: RoomId },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid UTF-8")]
    NotUtf8,
    #[error("empty frame")]
    Empty,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{command}: expected at least {expected} fields, got {got}")]
    MissingFields {
        command: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{command}: bad numeric field {field:?}")]
    BadNumber {
        command: &'static str,
        field: String,
    },
}

fn require(command: &'static str, parts: &[&str], expected: usize) -> Result<(), DecodeError> {
    if parts.len() < expected {
        return Err(DecodeError::MissingFields {
            command,
            expected,
            got: parts.len(),
        });
    }
    Ok(())
}

fn number<T: FromStr>(command: &'static str, field: &str) -> Result<T, DecodeError> {
    field.parse().map_err(|_| DecodeError::BadNumber {
        command,
        field: field.to_string(),
    })
}

/// Decodes one datagram. A failed numeric parse fails the whole frame; the
/// caller treats every error as a logged no-op so the receive loop survives
/// arbitrary garbage.
pub fn decode(data: &[u8]) -> Result<ServerCommand, DecodeError> {
    let text = std::str::from_utf8(data).map_err(|_| DecodeError::NotUtf8)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }

    let parts: Vec<&str> = text.split(FIELD_SEP).collect();
    match parts[0] {
        "Connected" => {
            require("Connected", &parts, 2)?;
            Ok(ServerCommand::Connected {
                player_id: number("Connected", parts[1])?,
            })
        }
        "Appearance" => {
            require("Appearance", &parts, 4)?;
            Ok(ServerCommand::Appearance {
                player_id: number("Appearance", parts[1])?,
                gender: parts[2].to_string(),
                style: parts[3].to_string(),
            })
        }
        "Start" => {
            require("Start", &parts, 3)?;
            Ok(ServerCommand::Start {
                seed: number("Start", parts[1])?,
                level: number("Start", parts[2])?,
            })
        }
        "UpdatePosition" => {
            require("UpdatePosition", &parts, 4)?;
            Ok(ServerCommand::UpdatePosition {
                entity_id: number("UpdatePosition", parts[1])?,
                x: number("UpdatePosition", parts[2])?,
                y: number("UpdatePosition", parts[3])?,
            })
        }
        "UpdateRoom" => {
            require("UpdateRoom", &parts, 2)?;
            Ok(ServerCommand::UpdateRoom(RoomChange {
                room: parts[1].into(),
                meta: parts[2..].iter().map(|s| s.to_string()).collect(),
            }))
        }
        "SpawnItem" => {
            require("SpawnItem", &parts, 5)?;
            Ok(ServerCommand::SpawnItem {
                item_id: number("SpawnItem", parts[1])?,
                kind: parts[2].to_string(),
                x: number("SpawnItem", parts[3])?,
                y: number("SpawnItem", parts[4])?,
            })
        }
        "DespawnItem" => {
            require("DespawnItem", &parts, 2)?;
            Ok(ServerCommand::DespawnItem {
                item_id: number("DespawnItem", parts[1])?,
            })
        }
        "PickupItem" => {
            require("PickupItem", &parts, 4)?;
            Ok(ServerCommand::PickupItem {
                player_id: number("PickupItem", parts[1])?,
                item_id: number("PickupItem", parts[2])?,
                kind: parts[3].to_string(),
            })
        }
        "Hud" => {
            require("Hud", &parts, 4)?;
            Ok(ServerCommand::Hud {
                player_id: number("Hud", parts[1])?,
                hp: number("Hud", parts[2])?,
                hp_max: number("Hud", parts[3])?,
                inventory_csv: parts.get(4).unwrap_or(&"").to_string(),
            })
        }
        "Other" => {
            require("Other", &parts, 4)?;
            Ok(ServerCommand::Other {
                player_id: number("Other", parts[1])?,
                hp: number("Other", parts[2])?,
                hp_max: number("Other", parts[3])?,
            })
        }
        "SpawnEnemy" => {
            require("SpawnEnemy", &parts, 6)?;
            Ok(ServerCommand::SpawnEnemy {
                enemy_id: number("SpawnEnemy", parts[1])?,
                name: parts[2].to_string(),
                x: number("SpawnEnemy", parts[3])?,
                y: number("SpawnEnemy", parts[4])?,
                room: parts[5].into(),
            })
        }
        "UpdateEnemy" => {
            require("UpdateEnemy", &parts, 4)?;
            Ok(ServerCommand::UpdateEnemy {
                enemy_id: number("UpdateEnemy", parts[1])?,
                x: number("UpdateEnemy", parts[2])?,
                y: number("UpdateEnemy", parts[3])?,
            })
        }
        "DespawnEnemy" => {
            require("DespawnEnemy", &parts, 2)?;
            Ok(ServerCommand::DespawnEnemy {
                enemy_id: number("DespawnEnemy", parts[1])?,
            })
        }
        "RoomClear" => {
            require("RoomClear", &parts, 2)?;
            Ok(ServerCommand::RoomClear {
                room: parts[1].into(),
            })
        }
        "Damage" => {
            require("Damage", &parts, 4)?;
            Ok(ServerCommand::Damage {
                player_id: number("Damage", parts[1])?,
                hp: number("Damage", parts[2])?,
                hp_max: number("Damage", parts[3])?,
            })
        }
        "Dead" => {
            require("Dead", &parts, 2)?;
            Ok(ServerCommand::Dead {
                player_id: number("Dead", parts[1])?,
            })
        }
        "GameOver" => {
            require("GameOver", &parts, 2)?;
            Ok(ServerCommand::GameOver {
                loser_id: number("GameOver", parts[1])?,
            })
        }
        "Disconnect" => Ok(ServerCommand::Disconnect),
        other => Err(DecodeError::UnknownCommand(other.to_string())),
    }
}

impl ClientCommand {
    pub fn encode(&self) -> String {
        match self {
            ClientCommand::Connect { appearance } => {
                let mut line = String::from("Connect");
                for field in appearance {
                    let _ = write!(line, ":{field}");
                }
                line
            }
            ClientCommand::Ready => String::from("Ready"),
            ClientCommand::Move { dx, dy } => {
                format!("Move:{}:{}", (*dx).clamp(-1, 1), (*dy).clamp(-1, 1))
            }
            ClientCommand::Door {
                player_id,
                origin,
                dest,
                direction,
            } => match player_id {
                Some(id) => format!("Door:{id}:{origin}:{dest}:{direction}"),
                None => format!("Door:{origin}:{dest}:{direction}"),
            },
            ClientCommand::RoomClearReq { room } => format!("RoomClearReq:{room}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_start() {
        let command = decode(b"Start:12345:2").unwrap();
        assert_eq!(
            command,
            ServerCommand::Start {
                seed: 12345,
                level: 2
            }
        );
    }

    #[test]
    fn bad_numeric_field_fails_whole_frame() {
        assert!(matches!(
            decode(b"Start:notanumber:2"),
            Err(DecodeError::BadNumber { command: "Start", .. })
        ));
        assert!(matches!(
            decode(b"UpdatePosition:1:abc:2.0"),
            Err(DecodeError::BadNumber { .. })
        ));
    }

    #[test]
    fn garbage_never_panics() {
        assert!(matches!(decode(b""), Err(DecodeError::Empty)));
        assert!(matches!(decode(b"   "), Err(DecodeError::Empty)));
        assert!(matches!(
            decode(b"Bogus:1:2"),
            Err(DecodeError::UnknownCommand(_))
        ));
        assert!(matches!(decode(&[0xff, 0xfe]), Err(DecodeError::NotUtf8)));
        assert!(matches!(
            decode(b"Connected"),
            Err(DecodeError::MissingFields { .. })
        ));
    }

    #[test]
    fn update_room_keeps_metadata_in_order() {
        let command = decode(b"UpdateRoom:B2:East:1").unwrap();
        let ServerCommand::UpdateRoom(change) = command else {
            panic!("expected UpdateRoom");
        };
        assert_eq!(change.room.as_str(), "B2");
        assert_eq!(change.meta, vec!["East".to_string(), "1".to_string()]);
    }

    #[test]
    fn hud_inventory_is_optional_on_the_wire() {
        let with = decode(b"Hud:1:4:6:POTION,KEY").unwrap();
        assert_eq!(
            with,
            ServerCommand::Hud {
                player_id: 1,
                hp: 4,
                hp_max: 6,
                inventory_csv: "POTION,KEY".to_string(),
            }
        );

        let without = decode(b"Hud:1:4:6").unwrap();
        let ServerCommand::Hud { inventory_csv, .. } = without else {
            panic!("expected Hud");
        };
        assert!(inventory_csv.is_empty());
    }

    #[test]
    fn encode_door_with_and_without_player_id() {
        let base = ClientCommand::Door {
            player_id: None,
            origin: "A1".into(),
            dest: "A2".into(),
            direction: Direction::North,
        };
        assert_eq!(base.encode(), "Door:A1:A2:North");

        let with_id = ClientCommand::Door {
            player_id: Some(2),
            origin: "A1".into(),
            dest: "A2".into(),
            direction: Direction::North,
        };
        assert_eq!(with_id.encode(), "Door:2:A1:A2:North");
    }

    #[test]
    fn encode_move_clamps_axes() {
        let command = ClientCommand::Move { dx: 5, dy: -3 };
        assert_eq!(command.encode(), "Move:1:-1");
    }

    #[test]
    fn encode_connect_appends_appearance_fields() {
        let bare = ClientCommand::Connect {
            appearance: Vec::new(),
        };
        assert_eq!(bare.encode(), "Connect");

        let dressed = ClientCommand::Connect {
            appearance: vec!["FEMALE".to_string(), "ROGUE".to_string()],
        };
        assert_eq!(dressed.encode(), "Connect:FEMALE:ROGUE");
    }
}
