use super::notes::MIDI_NOTE_MAX;

/// Notes currently sounding, in the order they were pressed.
///
/// A note number is held at most once, so a second Note On for a sounding
/// note and a Note Off for a silent one are both swallowed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveNotes {
    notes: Vec<u8>,
}

impl ActiveNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `note` was not sounding and a Note On should be sent.
    pub fn note_on(&mut self, note: u8) -> bool {
        debug_assert!(note <= MIDI_NOTE_MAX);
        if self.contains(note) {
            return false;
        }
        self.notes.push(note);
        self.check_invariants();
        true
    }

    /// Returns `true` when `note` was sounding and a Note Off should be sent.
    pub fn note_off(&mut self, note: u8) -> bool {
        match self.notes.iter().position(|n| *n == note) {
            Some(pos) => {
                self.notes.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Most recently pressed note that is still sounding.
    pub fn last_active(&self) -> Option<u8> {
        self.notes.last().copied()
    }

    pub fn contains(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.notes
    }

    fn check_invariants(&self) {
        let last = self.notes.len() - 1;
        assert!(
            !self.notes[..last].contains(&self.notes[last]),
            "note {} sounding twice: {:?}",
            self.notes[last],
            self.notes
        );
        assert!(self.notes.len() <= MIDI_NOTE_MAX as usize + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn duplicate_note_on_is_suppressed() {
        let mut active = ActiveNotes::new();
        assert!(active.note_on(60));
        assert!(!active.note_on(60));
        assert_eq!(active.as_slice(), &[60]);
    }

    #[test]
    fn spurious_note_off_is_ignored() {
        let mut active = ActiveNotes::new();
        assert!(!active.note_off(60));
        active.note_on(62);
        assert!(!active.note_off(60));
        assert_eq!(active.as_slice(), &[62]);
    }

    #[test]
    fn last_active_follows_press_order() {
        let mut active = ActiveNotes::new();
        assert_eq!(active.last_active(), None);

        active.note_on(67);
        active.note_on(60);
        assert_eq!(active.last_active(), Some(60));

        active.note_off(60);
        assert_eq!(active.last_active(), Some(67));

        active.note_on(60);
        active.note_off(67);
        active.note_on(67);
        assert_eq!(active.as_slice(), &[60, 67]);
        assert_eq!(active.last_active(), Some(67));
    }

    proptest! {
        #[test]
        fn a_note_is_never_held_twice(ops in prop::collection::vec((any::<bool>(), 58u8..64), 0..64)) {
            let mut active = ActiveNotes::new();
            for (on, note) in ops {
                let was_active = active.contains(note);
                if on {
                    prop_assert_eq!(active.note_on(note), !was_active);
                } else {
                    prop_assert_eq!(active.note_off(note), was_active);
                }
                for n in 58u8..64 {
                    let count = active.as_slice().iter().filter(|x| **x == n).count();
                    prop_assert!(count <= 1);
                }
            }
        }
    }
}
