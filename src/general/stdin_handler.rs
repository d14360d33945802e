use std::io::stdin;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use super::keyboard::KeyEvent;

/// Something for the event loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    /// Press then release.
    Tap(usize),
    /// Flip the key's current matrix state.
    Toggle(usize),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Input(Input),
    Help,
    Unrecognized(String),
}

/// Parse one console line.
pub fn parse_command(line: &str) -> Command {
    let cmd = line.trim();
    if cmd.is_empty()
        || cmd.eq_ignore_ascii_case("exit")
        || cmd.eq_ignore_ascii_case("quit")
        || cmd.eq_ignore_ascii_case("q")
    {
        return Command::Input(Input::Quit);
    }
    if cmd.eq_ignore_ascii_case("help") || cmd.eq_ignore_ascii_case("h") {
        return Command::Help;
    }
    if let Ok(index) = cmd.parse::<usize>() {
        return Command::Input(Input::Tap(index));
    }

    let mut parts = cmd.split_whitespace();
    let verb = parts.next().unwrap_or("").to_ascii_lowercase();
    let index = parts.next().and_then(|p| p.parse::<usize>().ok());
    match (verb.as_str(), index, parts.next()) {
        ("p" | "press", Some(i), None) => Command::Input(Input::Key(KeyEvent::pressed(i))),
        ("r" | "release", Some(i), None) => Command::Input(Input::Key(KeyEvent::released(i))),
        ("t" | "toggle", Some(i), None) => Command::Input(Input::Toggle(i)),
        _ => Command::Unrecognized(cmd.to_string()),
    }
}

pub fn print_help() {
    println!("Commands:");
    println!("  <key>            - Tap key 0-15 (press and release)");
    println!("  p/press <key>    - Press key");
    println!("  r/release <key>  - Release key");
    println!("  t/toggle <key>   - Press if up, release if down");
    println!("  Keys 0-11 play C4..B4, 12: -12, 13: +1, 14: +12, 15: -1");
    println!("  help/h           - Show this help");
    println!("  exit/quit/q      - Exit program");
}

/// Spawn a thread that reads lines from stdin and forwards them to the
/// event loop. Stops after sending `Input::Quit` or when the loop is gone.
pub fn spawn_stdin_handler(tx: Sender<Input>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    let _ = tx.send(Input::Quit);
                    break;
                }
                Ok(_) => {}
            }

            match parse_command(&line) {
                Command::Input(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                    if input == Input::Quit {
                        break;
                    }
                }
                Command::Help => print_help(),
                Command::Unrecognized(cmd) => {
                    println!("Unrecognized command: '{}'. Type 'help' for available commands.", cmd);
                }
            }
        }
        debug!("stdin handler exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_commands() {
        assert_eq!(parse_command("3\n"), Command::Input(Input::Tap(3)));
        assert_eq!(parse_command("p 0"), Command::Input(Input::Key(KeyEvent::pressed(0))));
        assert_eq!(parse_command("Press 13"), Command::Input(Input::Key(KeyEvent::pressed(13))));
        assert_eq!(parse_command("r 0"), Command::Input(Input::Key(KeyEvent::released(0))));
        assert_eq!(parse_command("release 11"), Command::Input(Input::Key(KeyEvent::released(11))));
        assert_eq!(parse_command("t 15"), Command::Input(Input::Toggle(15)));
    }

    #[test]
    fn parses_control_words() {
        assert_eq!(parse_command(""), Command::Input(Input::Quit));
        assert_eq!(parse_command("  \n"), Command::Input(Input::Quit));
        assert_eq!(parse_command("QUIT"), Command::Input(Input::Quit));
        assert_eq!(parse_command("h"), Command::Help);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(matches!(parse_command("p"), Command::Unrecognized(_)));
        assert!(matches!(parse_command("p x"), Command::Unrecognized(_)));
        assert!(matches!(parse_command("p 1 2"), Command::Unrecognized(_)));
        assert!(matches!(parse_command("-1"), Command::Unrecognized(_)));
        assert!(matches!(parse_command("osc on"), Command::Unrecognized(_)));
    }
}
