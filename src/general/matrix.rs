use super::keyboard::{KeyEvent, KeyPhase};

/// Number of switches on the 4x4 matrix.
pub const KEY_COUNT: usize = 16;

/// Pressed/released state of every switch, kept by the event loop after
/// each event has been dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyMatrix {
    pressed: u16,
}

impl KeyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition. Returns `false` when the key was already in that
    /// state or is not on the matrix.
    pub fn record(&mut self, event: KeyEvent) -> bool {
        if event.index >= KEY_COUNT {
            return false;
        }
        let bit = 1u16 << event.index;
        let was_pressed = self.pressed & bit != 0;
        match event.phase {
            KeyPhase::Pressed => self.pressed |= bit,
            KeyPhase::Released => self.pressed &= !bit,
        }
        was_pressed != event.is_pressed()
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        index < KEY_COUNT && self.pressed & (1 << index) != 0
    }

    /// The transition that flips `index`.
    pub fn toggle_event(&self, index: usize) -> KeyEvent {
        if self.is_pressed(index) {
            KeyEvent::released(index)
        } else {
            KeyEvent::pressed(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_transitions() {
        let mut matrix = KeyMatrix::new();
        assert!(matrix.record(KeyEvent::pressed(3)));
        assert!(matrix.is_pressed(3));
        assert!(!matrix.record(KeyEvent::pressed(3)));
        assert!(matrix.record(KeyEvent::released(3)));
        assert!(!matrix.is_pressed(3));
        assert!(!matrix.record(KeyEvent::released(3)));
    }

    #[test]
    fn toggle_flips_current_state() {
        let mut matrix = KeyMatrix::new();
        assert_eq!(matrix.toggle_event(15), KeyEvent::pressed(15));
        matrix.record(KeyEvent::pressed(15));
        assert_eq!(matrix.toggle_event(15), KeyEvent::released(15));
        assert!((0..15).all(|i| !matrix.is_pressed(i)));
    }

    #[test]
    fn ignores_keys_off_the_matrix() {
        let mut matrix = KeyMatrix::new();
        assert!(!matrix.record(KeyEvent::pressed(16)));
        assert!(!matrix.is_pressed(16));
        assert!((0..KEY_COUNT).all(|i| !matrix.is_pressed(i)));
    }
}
