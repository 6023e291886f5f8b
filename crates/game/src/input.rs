use bitflags::bitflags;

bitflags! {
    /// Movement keys currently held. Whether input is honored at all is the
    /// session's `input_enabled` flag, not a global switch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveFlags: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl MoveFlags {
    /// Axes for the `Move:<dx>:<dy>` intent, each in {-1, 0, 1}. Opposing
    /// keys cancel.
    pub fn axes(self) -> (i8, i8) {
        let mut dx = 0i8;
        let mut dy = 0i8;
        if self.contains(MoveFlags::UP) {
            dy += 1;
        }
        if self.contains(MoveFlags::DOWN) {
            dy -= 1;
        }
        if self.contains(MoveFlags::LEFT) {
            dx -= 1;
        }
        if self.contains(MoveFlags::RIGHT) {
            dx += 1;
        }
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_map_held_keys() {
        assert_eq!(MoveFlags::empty().axes(), (0, 0));
        assert_eq!(MoveFlags::UP.axes(), (0, 1));
        assert_eq!((MoveFlags::LEFT | MoveFlags::DOWN).axes(), (-1, -1));
    }

    #[test]
    fn opposing_keys_cancel() {
        assert_eq!((MoveFlags::UP | MoveFlags::DOWN).axes(), (0, 0));
        assert_eq!((MoveFlags::LEFT | MoveFlags::RIGHT).axes(), (0, 0));
    }
}
