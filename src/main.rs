mod config;
mod error;
mod general;
mod io;
mod remote;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::general::check;
use crate::general::forwarder::{spawn_forwarder, ChannelTransport};
use crate::general::keyboard::{KeyEvent, Keyboard};
use crate::general::matrix::KeyMatrix;
use crate::general::stdin_handler::{spawn_stdin_handler, Input};
use crate::io::display::{StatusSurface, TerminalDisplay};
use crate::io::output::{open_output, MidiTransport};
use crate::remote::osc_listener::spawn_osc_listener;
use crate::remote::osc_sender::OscDisplay;

fn main() {
    let arg_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config_path = Config::locate(arg_path.as_deref());
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            check::print_startup_failed(&err);
            std::process::exit(1);
        }
    };

    init_logging(config.debug);
    match &config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(err) = run(&config) {
        check::print_startup_failed(&err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "hackpiano=debug" } else { "hackpiano=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Owns the keyboard and the switch matrix state; feeds them one input at a time.
struct EventLoop {
    keyboard: Keyboard,
    matrix: KeyMatrix,
}

impl EventLoop {
    fn new(keyboard: Keyboard) -> Self {
        Self { keyboard, matrix: KeyMatrix::new() }
    }

    /// Returns `false` when the loop should stop.
    fn handle(
        &mut self,
        input: Input,
        midi: &mut dyn MidiTransport,
        display: &mut dyn StatusSurface,
    ) -> bool {
        match input {
            Input::Quit => return false,
            Input::Key(event) => self.step(event, midi, display),
            Input::Tap(index) => {
                self.step(KeyEvent::pressed(index), midi, display);
                self.step(KeyEvent::released(index), midi, display);
            }
            Input::Toggle(index) => {
                let event = self.matrix.toggle_event(index);
                self.step(event, midi, display);
            }
        }
        true
    }

    fn step(&mut self, event: KeyEvent, midi: &mut dyn MidiTransport, display: &mut dyn StatusSurface) {
        let action = self.keyboard.process_key(event, midi, display);
        if !self.matrix.record(event) {
            debug!("Key {} {:?} without a matrix transition", event.index, event.phase);
        }
        debug!(
            "{:?} -> {:?} (transpose {}, sounding {:?})",
            event,
            action,
            self.keyboard.transpose(),
            self.keyboard.active_notes().as_slice()
        );
    }
}

fn run(config: &Config) -> Result<()> {
    let (conn_out, port_name) = open_output(&config.midi)?;
    let (mut transport, midi_rx) = ChannelTransport::new();
    let forward_handle = spawn_forwarder(conn_out, midi_rx, config.midi.channel);

    let mut display: Vec<Box<dyn StatusSurface>> = vec![Box::new(TerminalDisplay::new())];
    if config.osc.display_enabled {
        display.push(Box::new(OscDisplay::new(&config.osc)?));
    }

    let exit_flag = Arc::new(AtomicBool::new(false));
    let (tx, rx) = channel::<Input>();
    let osc_handle = if config.osc.listen_enabled {
        Some(spawn_osc_listener(&config.osc, tx.clone(), exit_flag.clone())?)
    } else {
        None
    };
    let stdin_handle = spawn_stdin_handler(tx);

    check::print_ready(&port_name);

    let mut event_loop = EventLoop::new(Keyboard::from_config(config));
    info!(
        "Control value {} reported on CC {}, releases use {:?}",
        config.control.cc_default,
        event_loop.keyboard.control_code(),
        config.transpose.release
    );
    event_loop.keyboard.refresh(&mut display);

    for input in rx {
        if !event_loop.handle(input, &mut transport, &mut display) {
            break;
        }
    }

    let sounding = event_loop.keyboard.active_notes();
    if !sounding.is_empty() {
        warn!("Exiting with notes still sounding: {:?}", sounding.as_slice());
    }
    info!("Closing connections and exiting...");
    exit_flag.store(true, Ordering::SeqCst);
    if let Some(handle) = osc_handle {
        let _ = handle.join();
    }
    let _ = stdin_handle.join();
    // Dropping the transport closes the channel, which ends the forwarder thread
    drop(transport);
    let _ = forward_handle.join();

    Ok(())
}
