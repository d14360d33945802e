use std::net::UdpSocket;

use rosc::{encoder, OscMessage, OscPacket, OscType};
use tracing::{debug, warn};

use crate::config::OscConfig;
use crate::error::Result;
use crate::general::status::LabelRegion;
use crate::io::display::StatusSurface;

/// Mirrors the display labels to an OSC target, one string message per
/// changed label.
pub struct OscDisplay {
    socket: UdpSocket,
    target_addr: String,
    paths: [String; 3],
    last_sent: [Option<String>; 3],
}

impl OscDisplay {
    pub fn new(config: &OscConfig) -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0")?;
        let target = if config.display_target.trim().is_empty() {
            "127.0.0.1:9000".to_string()
        } else {
            config.display_target.clone()
        };
        socket.connect(&target)?;
        debug!("OSC display mirror sending to {}", target);

        Ok(Self {
            socket,
            target_addr: target,
            paths: [
                config.note_path.clone(),
                config.transpose_path.clone(),
                config.control_path.clone(),
            ],
            last_sent: Default::default(),
        })
    }

    fn send_osc_message(&self, msg: OscMessage) -> Result<()> {
        let packet = OscPacket::Message(msg);
        let msg_buf = encoder::encode(&packet)?;
        self.socket.send(&msg_buf)?;
        Ok(())
    }
}

/// Build the message for one label.
pub fn label_message(path: &str, text: &str) -> OscMessage {
    OscMessage {
        addr: path.to_string(),
        args: vec![OscType::String(text.to_string())],
    }
}

impl StatusSurface for OscDisplay {
    fn set_label(&mut self, region: LabelRegion, text: &str) {
        let i = region.index();
        if self.last_sent[i].as_deref() == Some(text) {
            return;
        }
        let msg = label_message(&self.paths[i], text);
        match self.send_osc_message(msg) {
            Ok(()) => self.last_sent[i] = Some(text.to_string()),
            Err(e) => warn!("[OSC] Failed to send to {}: {}", self.target_addr, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn label_message_carries_text() {
        let msg = label_message("/display/note", "C#4");
        assert_eq!(msg.addr, "/display/note");
        assert_eq!(msg.args, vec![OscType::String("C#4".to_string())]);
    }

    #[test]
    fn sends_only_changed_labels() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let config = OscConfig {
            display_target: receiver.local_addr().unwrap().to_string(),
            ..OscConfig::default()
        };
        let mut display = OscDisplay::new(&config).unwrap();

        display.set_label(LabelRegion::Transpose, "+1");
        display.set_label(LabelRegion::Transpose, "+1");
        display.set_label(LabelRegion::Control, "CC=0");

        let mut buf = [0u8; rosc::decoder::MTU];
        let mut received = Vec::new();
        for _ in 0..2 {
            let size = receiver.recv(&mut buf).unwrap();
            match rosc::decoder::decode_udp(&buf[..size]).unwrap().1 {
                OscPacket::Message(msg) => received.push(msg.addr),
                OscPacket::Bundle(_) => panic!("unexpected bundle"),
            }
        }
        assert_eq!(received, vec!["/display/transpose", "/display/control"]);
    }
}
