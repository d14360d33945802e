use std::io::{stdin, stdout, Write};

use midir::{MidiOutput, MidiOutputConnection};
use tracing::info;

use crate::config::MidiConfig;
use crate::error::{Error, Result};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// A channel voice message the keyboard emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiCommand {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
}

impl MidiCommand {
    /// Raw bytes of the message on `channel` (0-15).
    pub fn to_bytes(self, channel: u8) -> [u8; 3] {
        let channel = channel & 0x0F;
        match self {
            MidiCommand::NoteOn { note, velocity } => [NOTE_ON | channel, note & 0x7F, velocity & 0x7F],
            MidiCommand::NoteOff { note, velocity } => [NOTE_OFF | channel, note & 0x7F, velocity & 0x7F],
        }
    }
}

/// Outgoing MIDI. Sending never blocks and never reports delivery failure.
pub trait MidiTransport {
    fn send(&mut self, command: MidiCommand);
}

/// Select a MIDI output port. Prefers the first port whose name contains
/// `output_port_name_substr`; falls back to the only port, or asks on stdin.
pub fn choose_output_port(midi_out: &MidiOutput, output_port_name_substr: &str) -> Result<usize> {
    let ports = midi_out.ports();
    if ports.is_empty() {
        return Err(Error::MidiPort("no output port found".to_string()));
    }

    if !output_port_name_substr.is_empty() {
        for (i, p) in ports.iter().enumerate() {
            if let Ok(name) = midi_out.port_name(p) {
                if name.contains(output_port_name_substr) {
                    info!("Choosing output port matching '{}': {}", output_port_name_substr, name);
                    return Ok(i);
                }
            }
        }
    }

    if ports.len() == 1 {
        info!("Choosing the only available output port: {}", midi_out.port_name(&ports[0])?);
        return Ok(0);
    }

    println!("\nAvailable output ports:");
    for (i, p) in ports.iter().enumerate() {
        println!("{}: {}", i, midi_out.port_name(p)?);
    }

    print!("Please select output port: ");
    stdout().flush()?;
    let mut choice = String::new();
    stdin().read_line(&mut choice)?;
    let idx = choice.trim().parse::<usize>()?;
    if idx >= ports.len() {
        return Err(Error::Selection(format!("no output port {}", idx)));
    }
    Ok(idx)
}

/// Open the output connection described by `config`. Returns the connection
/// and a printable port name.
pub fn open_output(config: &MidiConfig) -> Result<(MidiOutputConnection, String)> {
    let midi_out = MidiOutput::new(&config.client_name)?;

    if config.virtual_port {
        return open_virtual(midi_out, config);
    }

    let idx = choose_output_port(&midi_out, &config.output_port)?;
    let ports = midi_out.ports();
    let port = ports
        .get(idx)
        .ok_or_else(|| Error::MidiPort(format!("output port {} disappeared", idx)))?;
    let port_name = midi_out.port_name(port)?;
    let conn = midi_out.connect(port, "hackpiano-output")?;
    Ok((conn, port_name))
}

#[cfg(unix)]
fn open_virtual(midi_out: MidiOutput, config: &MidiConfig) -> Result<(MidiOutputConnection, String)> {
    use midir::os::unix::VirtualOutput;

    let conn = midi_out.create_virtual("hackpiano-out")?;
    Ok((conn, format!("{}:hackpiano-out (virtual)", config.client_name)))
}

#[cfg(not(unix))]
fn open_virtual(_midi_out: MidiOutput, _config: &MidiConfig) -> Result<(MidiOutputConnection, String)> {
    Err(Error::InvalidConfig(
        "midi.virtual_port is only supported on Unix".to_string(),
    ))
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Keeps every command in send order.
    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        pub sent: Vec<MidiCommand>,
    }

    impl MidiTransport for RecordingTransport {
        fn send(&mut self, command: MidiCommand) {
            self.sent.push(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_note_messages() {
        assert_eq!(
            MidiCommand::NoteOn { note: 60, velocity: 127 }.to_bytes(0),
            [0x90, 60, 127]
        );
        assert_eq!(
            MidiCommand::NoteOff { note: 61, velocity: 0 }.to_bytes(0),
            [0x80, 61, 0]
        );
        assert_eq!(
            MidiCommand::NoteOn { note: 60, velocity: 100 }.to_bytes(9),
            [0x99, 60, 100]
        );
    }
}
