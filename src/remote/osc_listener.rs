use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rosc::{decoder, OscMessage, OscPacket, OscType};
use tracing::{debug, info, warn};

use crate::config::OscConfig;
use crate::error::Result;
use crate::general::keyboard::KeyEvent;
use crate::general::stdin_handler::Input;

/// Bind the OSC socket and spawn a thread that turns key messages into
/// events for the loop. Recognised forms, with `key_path` = "/key":
/// - `/key <index> <state>` where state is a bool or a number (non-zero = pressed)
/// - `/key/press <index>` and `/key/release <index>`
///
/// The thread checks `exit` periodically to shut down.
pub fn spawn_osc_listener(
    config: &OscConfig,
    tx: Sender<Input>,
    exit: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>> {
    let bind_addr = format!("{}:{}", config.listening_host, config.listening_port);
    let socket = UdpSocket::bind(&bind_addr)?;
    socket.set_read_timeout(Some(Duration::from_millis(200)))?;
    info!("OSC listener bound on {} (path: {})", bind_addr, config.key_path);

    let key_path = config.key_path.clone();
    Ok(thread::spawn(move || {
        let mut buf = [0u8; decoder::MTU];
        loop {
            if exit.load(Ordering::SeqCst) {
                break;
            }

            match socket.recv_from(&mut buf) {
                Ok((size, peer_addr)) => match decoder::decode_udp(&buf[..size]) {
                    Ok((_, packet)) => {
                        if !handle_packet(packet, &key_path, &tx) {
                            break;
                        }
                    }
                    Err(err) => warn!("OSC decode error from {}: {}", peer_addr, err),
                },
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(err) => warn!("OSC recv error: {}", err),
            }
        }
        debug!("OSC listener exiting");
    }))
}

/// Returns `false` once the event loop has hung up.
fn handle_packet(packet: OscPacket, key_path: &str, tx: &Sender<Input>) -> bool {
    match packet {
        OscPacket::Message(msg) => match key_event(&msg, key_path) {
            Some(event) => tx.send(Input::Key(event)).is_ok(),
            None => {
                debug!("[OSC] ignoring {} {:?}", msg.addr, msg.args);
                true
            }
        },
        OscPacket::Bundle(bundle) => bundle
            .content
            .into_iter()
            .all(|pkt| handle_packet(pkt, key_path, tx)),
    }
}

/// Decode a key message. Returns `None` for other paths or bad arguments.
pub fn key_event(msg: &OscMessage, key_path: &str) -> Option<KeyEvent> {
    let suffix = msg.addr.strip_prefix(key_path)?;
    let index = msg.args.first().and_then(as_index)?;
    match suffix {
        "" => {
            let pressed = msg.args.get(1).and_then(as_state)?;
            Some(if pressed {
                KeyEvent::pressed(index)
            } else {
                KeyEvent::released(index)
            })
        }
        "/press" => Some(KeyEvent::pressed(index)),
        "/release" => Some(KeyEvent::released(index)),
        _ => None,
    }
}

fn as_index(arg: &OscType) -> Option<usize> {
    match *arg {
        OscType::Int(v) => usize::try_from(v).ok(),
        OscType::Long(v) => usize::try_from(v).ok(),
        OscType::Float(v) if v >= 0.0 => Some(v.round() as usize),
        OscType::Double(v) if v >= 0.0 => Some(v.round() as usize),
        _ => None,
    }
}

fn as_state(arg: &OscType) -> Option<bool> {
    match *arg {
        OscType::Bool(b) => Some(b),
        OscType::Int(v) => Some(v != 0),
        OscType::Long(v) => Some(v != 0),
        OscType::Float(v) => Some(v.abs() >= f32::EPSILON),
        OscType::Double(v) => Some(v.abs() >= f64::EPSILON),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn msg(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage { addr: addr.to_string(), args }
    }

    #[test]
    fn decodes_state_form() {
        let m = msg("/key", vec![OscType::Int(3), OscType::Int(1)]);
        assert_eq!(key_event(&m, "/key"), Some(KeyEvent::pressed(3)));

        let m = msg("/key", vec![OscType::Int(3), OscType::Bool(false)]);
        assert_eq!(key_event(&m, "/key"), Some(KeyEvent::released(3)));

        let m = msg("/key", vec![OscType::Float(13.0), OscType::Float(1.0)]);
        assert_eq!(key_event(&m, "/key"), Some(KeyEvent::pressed(13)));
    }

    #[test]
    fn decodes_press_and_release_paths() {
        let m = msg("/key/press", vec![OscType::Int(0)]);
        assert_eq!(key_event(&m, "/key"), Some(KeyEvent::pressed(0)));
        let m = msg("/key/release", vec![OscType::Long(0)]);
        assert_eq!(key_event(&m, "/key"), Some(KeyEvent::released(0)));
    }

    #[test]
    fn rejects_other_messages() {
        assert_eq!(key_event(&msg("/transpose", vec![OscType::Int(1)]), "/key"), None);
        assert_eq!(key_event(&msg("/key", vec![OscType::Int(1)]), "/key"), None);
        assert_eq!(key_event(&msg("/key/press", vec![OscType::Int(-1)]), "/key"), None);
        assert_eq!(key_event(&msg("/keyboard", vec![OscType::Int(1), OscType::Int(1)]), "/key"), None);
        assert_eq!(
            key_event(&msg("/key/press", vec![OscType::String("0".into())]), "/key"),
            None
        );
    }

    #[test]
    fn bundles_forward_each_message() {
        let (tx, rx) = channel();
        let bundle = OscPacket::Bundle(rosc::OscBundle {
            timetag: rosc::OscTime { seconds: 0, fractional: 1 },
            content: vec![
                OscPacket::Message(msg("/key/press", vec![OscType::Int(4)])),
                OscPacket::Message(msg("/key/release", vec![OscType::Int(4)])),
            ],
        });
        assert!(handle_packet(bundle, "/key", &tx));
        drop(tx);
        let inputs: Vec<_> = rx.iter().collect();
        assert_eq!(
            inputs,
            vec![
                Input::Key(KeyEvent::pressed(4)),
                Input::Key(KeyEvent::released(4)),
            ]
        );
    }
}
