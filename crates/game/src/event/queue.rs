use std::collections::VecDeque;

use super::types::{
    ButtonEvent, DamageEvent, DoorEvent, EventKind, GameEvent, LevelCompleteEvent, PickupEvent,
};

/// Frame-local event buffer. Physics callbacks only publish; consumers run
/// once per frame and fully clear a kind once it has been processed, so no
/// stale contact event survives into the next frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    doors: VecDeque<DoorEvent>,
    pickups: VecDeque<PickupEvent>,
    buttons: VecDeque<ButtonEvent>,
    damage: VecDeque<DamageEvent>,
    level_complete: VecDeque<LevelCompleteEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameEvent) {
        match event {
            GameEvent::DoorCrossing(ev) => self.doors.push_back(ev),
            GameEvent::Pickup(ev) => self.pickups.push_back(ev),
            GameEvent::Button(ev) => self.buttons.push_back(ev),
            GameEvent::Damage(ev) => self.damage.push_back(ev),
            GameEvent::LevelComplete(ev) => self.level_complete.push_back(ev),
        }
    }

    /// Single dequeue, used by the room transition machine which only ever
    /// honors one crossing per frame.
    pub fn poll_first_door(&mut self) -> Option<DoorEvent> {
        self.doors.pop_front()
    }

    pub fn drain_pickups(&mut self, mut f: impl FnMut(PickupEvent)) {
        while let Some(ev) = self.pickups.pop_front() {
            f(ev);
        }
    }

    pub fn drain_buttons(&mut self, mut f: impl FnMut(ButtonEvent)) {
        while let Some(ev) = self.buttons.pop_front() {
            f(ev);
        }
    }

    pub fn drain_damage(&mut self, mut f: impl FnMut(DamageEvent)) {
        while let Some(ev) = self.damage.pop_front() {
            f(ev);
        }
    }

    pub fn drain_level_complete(&mut self, mut f: impl FnMut(LevelCompleteEvent)) {
        while let Some(ev) = self.level_complete.pop_front() {
            f(ev);
        }
    }

    pub fn clear(&mut self, kind: EventKind) {
        match kind {
            EventKind::DoorCrossing => self.doors.clear(),
            EventKind::Pickup => self.pickups.clear(),
            EventKind::Button => self.buttons.clear(),
            EventKind::Damage => self.damage.clear(),
            EventKind::LevelComplete => self.level_complete.clear(),
        }
    }

    pub fn clear_all(&mut self) {
        self.doors.clear();
        self.pickups.clear();
        self.buttons.clear();
        self.damage.clear();
        self.level_complete.clear();
    }

    pub fn len(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::DoorCrossing => self.doors.len(),
            EventKind::Pickup => self.pickups.len(),
            EventKind::Button => self.buttons.len(),
            EventKind::Damage => self.damage.len(),
            EventKind::LevelComplete => self.level_complete.len(),
        }
    }

    pub fn is_empty(&self, kind: EventKind) -> bool {
        self.len(kind) == 0
    }
}
