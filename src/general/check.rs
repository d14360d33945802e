use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// "HackPiano v1" style title, major version only.
pub fn title() -> String {
    let major = env!("CARGO_PKG_VERSION").split('.').next().unwrap_or("0");
    format!("HackPiano v{}", major)
}

// Print the quick help line in blue (works on Windows CMD via termcolor)
pub fn print_quick_help() {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_intense(true));
    let _ = writeln!(&mut stdout, "Type 'help' for commands, 'exit' to quit");
    let _ = stdout.reset();
}

pub fn print_ready(port_name: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    let _ = writeln!(&mut stdout, "{} | MIDI out: {}", title(), port_name);
    let _ = stdout.reset();
    print_quick_help();
}

pub fn print_startup_failed(err: &dyn std::fmt::Display) {
    let mut stderr = StandardStream::stderr(ColorChoice::Always);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_intense(true));
    let _ = writeln!(&mut stderr, "{} | Startup failed: {}", title(), err);
    let _ = stderr.reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_major_version() {
        assert_eq!(title(), "HackPiano v1");
    }
}
