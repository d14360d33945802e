use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::general::notes::{DEFAULT_NOTE_MAP, KEY_NOTE_COUNT, MIDI_NOTE_MAX};

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// How a released note key decides which note number to turn off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Re-apply the transpose in effect at release time. A transpose change
    /// while a key is held leaves the pressed note sounding.
    #[default]
    CurrentTranspose,
    /// Release exactly the note that the press sent.
    PressTranspose,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Substring of the output port name to pick.
    pub output_port: String,
    /// Create a virtual output port instead of connecting to an existing one (Unix only).
    pub virtual_port: bool,
    pub client_name: String,
    pub channel: u8,
    pub velocity: u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            output_port: String::new(),
            virtual_port: false,
            client_name: "HackPiano".to_string(),
            channel: 0,
            velocity: 127,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub cc_code: u8,
    pub cc_default: u8,
    pub cc_on: u8,
    pub cc_off: u8,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cc_code: 64,
            cc_default: 0,
            cc_on: 127,
            cc_off: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransposeConfig {
    pub min: i32,
    pub max: i32,
    pub release: ReleasePolicy,
}

impl Default for TransposeConfig {
    fn default() -> Self {
        Self {
            min: -48,
            max: 48,
            release: ReleasePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub listen_enabled: bool,
    pub listening_host: String,
    pub listening_port: u16,
    pub key_path: String,
    pub display_enabled: bool,
    pub display_target: String,
    pub note_path: String,
    pub transpose_path: String,
    pub control_path: String,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            listen_enabled: false,
            listening_host: "127.0.0.1".to_string(),
            listening_port: 9069,
            key_path: "/key".to_string(),
            display_enabled: false,
            display_target: "127.0.0.1:9000".to_string(),
            note_path: "/display/note".to_string(),
            transpose_path: "/display/transpose".to_string(),
            control_path: "/display/control".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub midi: MidiConfig,
    pub control: ControlConfig,
    /// Base note for keys 0-11.
    pub notes: Vec<u8>,
    pub transpose: TransposeConfig,
    pub osc: OscConfig,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            midi: MidiConfig::default(),
            control: ControlConfig::default(),
            notes: DEFAULT_NOTE_MAP.to_vec(),
            transpose: TransposeConfig::default(),
            osc: OscConfig::default(),
            debug: false,
        }
    }
}

impl Config {
    /// The file to read: `path` when given, else `config.json` in the
    /// working directory if it exists.
    pub fn locate(path: Option<&Path>) -> Option<PathBuf> {
        match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                p.exists().then_some(p)
            }
        }
    }

    /// Read and validate the file at `path`, or validate the built-in
    /// defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_json(&fs::read_to_string(p)?)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn note_map(&self) -> [u8; KEY_NOTE_COUNT] {
        let mut map = DEFAULT_NOTE_MAP;
        for (slot, note) in map.iter_mut().zip(&self.notes) {
            *slot = *note;
        }
        map
    }

    pub fn validate(&self) -> Result<()> {
        if self.midi.channel > 15 {
            return Err(invalid(format!("midi.channel {} is not in 0..=15", self.midi.channel)));
        }
        if self.midi.velocity == 0 {
            return Err(invalid("midi.velocity 0 would read as Note Off".to_string()));
        }
        check_7bit("midi.velocity", self.midi.velocity)?;
        check_7bit("control.cc_code", self.control.cc_code)?;
        check_7bit("control.cc_default", self.control.cc_default)?;
        check_7bit("control.cc_on", self.control.cc_on)?;
        check_7bit("control.cc_off", self.control.cc_off)?;

        if self.notes.len() != KEY_NOTE_COUNT {
            return Err(invalid(format!(
                "notes must list {} base notes, got {}",
                KEY_NOTE_COUNT,
                self.notes.len()
            )));
        }
        for note in &self.notes {
            check_7bit("notes[]", *note)?;
        }

        let (min, max) = (self.transpose.min, self.transpose.max);
        if min > 0 || max < 0 {
            return Err(invalid(format!("transpose bounds {}..={} must include 0", min, max)));
        }
        let lowest = self.notes.iter().copied().min().unwrap_or(0) as i32;
        let highest = self.notes.iter().copied().max().unwrap_or(0) as i32;
        if lowest + min < 0 || highest + max > MIDI_NOTE_MAX as i32 {
            return Err(invalid(format!(
                "transpose bounds {}..={} push notes {}..={} outside 0..=127",
                min, max, lowest, highest
            )));
        }

        Ok(())
    }
}

fn check_7bit(name: &str, value: u8) -> Result<()> {
    if value > MIDI_NOTE_MAX {
        return Err(invalid(format!("{} = {} is not in 0..=127", name, value)));
    }
    Ok(())
}

fn invalid(msg: String) -> Error {
    Error::InvalidConfig(msg)
}
