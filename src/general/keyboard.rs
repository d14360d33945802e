use std::ops::RangeInclusive;

use tracing::{debug, info, warn};

use super::notes::{NoteTable, KEY_NOTE_COUNT};
use super::playback::ActiveNotes;
use super::status::{self, DisplayProjection};
use super::transpose::{apply_transpose, TransposeState};
use crate::config::{Config, ReleasePolicy};
use crate::io::display::{self, StatusSurface};
use crate::io::output::{MidiCommand, MidiTransport};

/// Keys 0-11 play notes; 12-15 shift the transpose.
pub const NOTE_KEYS: RangeInclusive<usize> = 0..=11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Pressed,
    Released,
}

/// A single debounced transition of one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub index: usize,
    pub phase: KeyPhase,
}

impl KeyEvent {
    pub fn pressed(index: usize) -> Self {
        Self { index, phase: KeyPhase::Pressed }
    }

    pub fn released(index: usize) -> Self {
        Self { index, phase: KeyPhase::Released }
    }

    pub fn is_pressed(&self) -> bool {
        self.phase == KeyPhase::Pressed
    }
}

/// What dispatching one event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    NoteOn(u8),
    NoteOff(u8),
    /// Note key transition that sent nothing (already sounding, or not sounding).
    Suppressed,
    /// Transposed note fell outside 0..=127.
    OutOfRange,
    Transposed(i32),
    ControlReleased,
    Ignored,
}

/// Semitone shift for a control key.
pub fn transpose_delta(index: usize) -> Option<i32> {
    match index {
        12 => Some(-12),
        13 => Some(1),
        14 => Some(12),
        15 => Some(-1),
        _ => None,
    }
}

/// Turns key transitions into MIDI and keeps the playing/transpose state.
#[derive(Debug, Clone)]
pub struct Keyboard {
    table: NoteTable,
    active: ActiveNotes,
    state: TransposeState,
    velocity: u8,
    release: ReleasePolicy,
    /// Note sent by the press of each note key, for `ReleasePolicy::PressTranspose`.
    held: [Option<u8>; KEY_NOTE_COUNT],
}

impl Keyboard {
    pub fn new(table: NoteTable, state: TransposeState, velocity: u8, release: ReleasePolicy) -> Self {
        Self {
            table,
            active: ActiveNotes::new(),
            state,
            velocity,
            release,
            held: [None; KEY_NOTE_COUNT],
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            NoteTable::new(config.note_map()),
            TransposeState::from_config(config),
            config.midi.velocity,
            config.transpose.release,
        )
    }

    /// Dispatch one key transition, send any resulting MIDI and refresh the display.
    pub fn process_key(
        &mut self,
        event: KeyEvent,
        midi: &mut dyn MidiTransport,
        display: &mut dyn StatusSurface,
    ) -> KeyAction {
        let action = self.dispatch(event, midi);
        self.refresh(display);
        action
    }

    pub fn refresh(&self, surface: &mut dyn StatusSurface) {
        display::render(surface, &self.project());
    }

    pub fn project(&self) -> DisplayProjection {
        status::project(&self.active, &self.state)
    }

    pub fn active_notes(&self) -> &ActiveNotes {
        &self.active
    }

    pub fn transpose(&self) -> i32 {
        self.state.transpose()
    }

    pub fn control_code(&self) -> u8 {
        self.state.control_code()
    }

    fn dispatch(&mut self, event: KeyEvent, midi: &mut dyn MidiTransport) -> KeyAction {
        let index = event.index;
        if NOTE_KEYS.contains(&index) {
            match event.phase {
                KeyPhase::Pressed => self.press_note(index, midi),
                KeyPhase::Released => self.release_note(index, midi),
            }
        } else if let Some(delta) = transpose_delta(index) {
            match event.phase {
                KeyPhase::Pressed => {
                    info!("Control Key SW{} Pressed", index + 1);
                    let transpose = self.state.adjust_transpose(delta);
                    debug!("Transpose {:+} -> {}", delta, transpose);
                    KeyAction::Transposed(transpose)
                }
                KeyPhase::Released => {
                    info!("Control Key SW{} Released", index + 1);
                    KeyAction::ControlReleased
                }
            }
        } else {
            debug!("Key {} is unassigned, ignoring {:?}", index, event.phase);
            KeyAction::Ignored
        }
    }

    fn sounding_note(&self, index: usize) -> Option<u8> {
        let Some(base) = self.table.lookup(index) else {
            unreachable!("note key {} has no base note", index);
        };
        let note = apply_transpose(base, self.state.transpose());
        if note.is_none() {
            warn!(
                "Key {} with transpose {} leaves the MIDI range, dropping",
                index,
                self.state.transpose()
            );
        }
        note
    }

    fn press_note(&mut self, index: usize, midi: &mut dyn MidiTransport) -> KeyAction {
        if self.held[index].is_some() {
            debug!("Key {} already holds note {:?}", index, self.held[index]);
            return KeyAction::Suppressed;
        }
        let Some(note) = self.sounding_note(index) else {
            return KeyAction::OutOfRange;
        };
        if !self.active.note_on(note) {
            debug!("Note {} already sounding, key {} suppressed", note, index);
            return KeyAction::Suppressed;
        }
        if self.release == ReleasePolicy::PressTranspose {
            self.held[index] = Some(note);
            assert!(
                self.active.len() <= KEY_NOTE_COUNT,
                "{} notes sounding from {} keys",
                self.active.len(),
                KEY_NOTE_COUNT
            );
        }
        midi.send(MidiCommand::NoteOn { note, velocity: self.velocity });
        debug!("Note On {} (key {})", note, index);
        KeyAction::NoteOn(note)
    }

    fn release_note(&mut self, index: usize, midi: &mut dyn MidiTransport) -> KeyAction {
        let note = match self.release {
            ReleasePolicy::CurrentTranspose => self.sounding_note(index),
            ReleasePolicy::PressTranspose => self.held[index].take(),
        };
        let Some(note) = note else {
            return KeyAction::Suppressed;
        };
        if !self.active.note_off(note) {
            debug!("Note {} not sounding, release of key {} suppressed", note, index);
            return KeyAction::Suppressed;
        }
        midi.send(MidiCommand::NoteOff { note, velocity: 0 });
        debug!("Note Off {} (key {})", note, index);
        KeyAction::NoteOff(note)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
