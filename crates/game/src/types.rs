use std::fmt;

pub type PlayerId = u32;
pub type EntityId = u32;
pub type ItemId = u32;
pub type EnemyId = u32;

/// Opaque room identifier as it travels on the wire. Only the map/puzzle
/// collaborators give it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        }
    }

    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "North" => Some(Direction::North),
            "South" => Some(Direction::South),
            "East" => Some(Direction::East),
            "West" => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A door sensor links an origin room to a destination room. The sensor
/// belongs to the origin room; crossings are only honored while the local
/// player is in that room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorLink {
    pub origin: RoomId,
    pub dest: RoomId,
    pub direction: Direction,
}

/// A pressure plate bound to a room and to the player expected to hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub room: RoomId,
    pub player_id: PlayerId,
}

/// Pending room change announced by the server. Extra wire fields are
/// room-change metadata, kept in order for the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomChange {
    pub room: RoomId,
    pub meta: Vec<String>,
}

impl RoomChange {
    pub fn new(room: RoomId) -> Self {
        Self {
            room,
            meta: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trip() {
        for dir in [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ] {
            assert_eq!(Direction::parse(dir.as_str()), Some(dir));
        }
        assert_eq!(Direction::parse("Up"), None);
    }

    #[test]
    fn room_id_displays_its_wire_form() {
        let room = RoomId::from("B2");
        assert_eq!(room.to_string(), "B2");
        assert_eq!(room.as_str(), "B2");
    }
}
