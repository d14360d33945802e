use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use tracing::{debug, error};

use crate::io::output::{MidiCommand, MidiTransport};

/// Spawn a forwarding thread that owns the provided `conn_out` and listens on `rx`.
/// Each command is encoded for `midi_channel` and written to the output port.
/// The thread exits once every sender is dropped.
pub fn spawn_forwarder(
    mut conn_out: midir::MidiOutputConnection,
    rx: Receiver<MidiCommand>,
    midi_channel: u8,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for command in rx {
            let bytes = command.to_bytes(midi_channel);
            if let Err(err) = conn_out.send(&bytes) {
                error!("Error sending MIDI message to output: {}", err);
            } else {
                debug!("Sent {:?} -> {:02X?}", command, bytes);
            }
        }
        let _ = conn_out.close();
    })
}

/// Transport that hands commands to the forwarder thread.
pub struct ChannelTransport {
    tx: Sender<MidiCommand>,
}

impl ChannelTransport {
    pub fn new() -> (Self, Receiver<MidiCommand>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }
}

impl MidiTransport for ChannelTransport {
    fn send(&mut self, command: MidiCommand) {
        if self.tx.send(command).is_err() {
            debug!("MIDI forwarder gone, dropping {:?}", command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_transport_queues_in_order() {
        let (mut transport, rx) = ChannelTransport::new();
        transport.send(MidiCommand::NoteOn { note: 60, velocity: 127 });
        transport.send(MidiCommand::NoteOff { note: 60, velocity: 0 });
        drop(transport);
        let sent: Vec<_> = rx.iter().collect();
        assert_eq!(
            sent,
            vec![
                MidiCommand::NoteOn { note: 60, velocity: 127 },
                MidiCommand::NoteOff { note: 60, velocity: 0 },
            ]
        );
    }

    #[test]
    fn send_after_forwarder_exit_is_silent() {
        let (mut transport, rx) = ChannelTransport::new();
        drop(rx);
        transport.send(MidiCommand::NoteOn { note: 60, velocity: 127 });
    }
}
