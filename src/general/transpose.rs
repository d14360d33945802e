use crate::config::Config;

/// Clamp a transpose value into `min..=max`.
pub fn clamp_transpose(value: i32, min: i32, max: i32) -> i32 {
    value.clamp(min, max)
}

/// Apply a transpose to a base note. Returns `None` when the result leaves
/// the MIDI note range.
pub fn apply_transpose(base_note: u8, semitones: i32) -> Option<u8> {
    u8::try_from(base_note as i32 + semitones)
        .ok()
        .filter(|note| *note <= super::notes::MIDI_NOTE_MAX)
}

/// Transpose offset plus the value of the keyboard's control change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransposeState {
    transpose: i32,
    min: i32,
    max: i32,
    control: u8,
    control_code: u8,
}

impl TransposeState {
    pub fn new(min: i32, max: i32, control_code: u8, control_default: u8) -> Self {
        debug_assert!(min <= 0 && max >= 0);
        Self {
            transpose: 0,
            min,
            max,
            control: control_default,
            control_code,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.transpose.min,
            config.transpose.max,
            config.control.cc_code,
            config.control.cc_default,
        )
    }

    /// Add `delta` semitones, saturating at the configured bounds. Returns the new offset.
    pub fn adjust_transpose(&mut self, delta: i32) -> i32 {
        self.transpose = clamp_transpose(self.transpose.saturating_add(delta), self.min, self.max);
        self.transpose
    }

    pub fn transpose(&self) -> i32 {
        self.transpose
    }

    pub fn control_value(&self) -> i32 {
        self.control as i32
    }

    pub fn control_code(&self) -> u8 {
        self.control_code
    }
}

impl Default for TransposeState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
