use std::fmt;

pub const MIDI_NOTE_MAX: u8 = 127;

/// Number of keys that play notes (keys 0-11).
pub const KEY_NOTE_COUNT: usize = 12;

/// C4 through B4, one semitone per key.
pub const DEFAULT_NOTE_MAP: [u8; KEY_NOTE_COUNT] = [
    60, 61, 62, 63, // Row 0: C4 C#4 D4 D#4
    64, 65, 66, 67, // Row 1: E4 F4 F#4 G4
    68, 69, 70, 71, // Row 2: G#4 A4 A#4 B4
];

/// Pitch class of a MIDI note, sharps only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

const NOTE_NAMES: [NoteName; 12] = [
    NoteName::C,
    NoteName::CSharp,
    NoteName::D,
    NoteName::DSharp,
    NoteName::E,
    NoteName::F,
    NoteName::FSharp,
    NoteName::G,
    NoteName::GSharp,
    NoteName::A,
    NoteName::ASharp,
    NoteName::B,
];

impl NoteName {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a MIDI note number into pitch class and octave. MIDI note 0 is C-1,
/// so 60 is C4.
///
/// # Panics
///
/// Panics if `note_number` is above 127.
pub fn name_of(note_number: u8) -> (NoteName, i8) {
    assert!(
        note_number <= MIDI_NOTE_MAX,
        "MIDI note {} out of range 0..=127",
        note_number
    );
    let note_index = (note_number % 12) as usize;
    let octave = (note_number / 12) as i8 - 1;
    (NOTE_NAMES[note_index], octave)
}

/// Convert a MIDI note number to its display label, e.g. "C4" or "F#3".
pub fn note_label(note_number: u8) -> String {
    let (name, octave) = name_of(note_number);
    format!("{}{}", name, octave)
}

/// Maps note keys to their base MIDI note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTable {
    notes: [u8; KEY_NOTE_COUNT],
}

impl NoteTable {
    pub fn new(notes: [u8; KEY_NOTE_COUNT]) -> Self {
        debug_assert!(notes.iter().all(|n| *n <= MIDI_NOTE_MAX));
        Self { notes }
    }

    /// Base note for `key_index`, or `None` for keys outside 0-11.
    pub fn lookup(&self, key_index: usize) -> Option<u8> {
        self.notes.get(key_index).copied()
    }
}

impl Default for NoteTable {
    fn default() -> Self {
        Self::new(DEFAULT_NOTE_MAP)
    }
}
