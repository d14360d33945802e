use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::general::status::{DisplayProjection, LabelRegion};

/// A screen with three independent text labels.
pub trait StatusSurface {
    fn set_label(&mut self, region: LabelRegion, text: &str);

    /// Flush label changes to the device.
    fn redraw(&mut self) {}
}

/// Push every label of `projection` to `surface` and redraw it.
pub fn render(surface: &mut dyn StatusSurface, projection: &DisplayProjection) {
    for region in LabelRegion::ALL {
        surface.set_label(region, projection.label(region));
    }
    surface.redraw();
}

impl StatusSurface for Vec<Box<dyn StatusSurface>> {
    fn set_label(&mut self, region: LabelRegion, text: &str) {
        for surface in self.iter_mut() {
            surface.set_label(region, text);
        }
    }

    fn redraw(&mut self) {
        for surface in self.iter_mut() {
            surface.redraw();
        }
    }
}

/// Status line on the terminal, redrawn only when a label changed.
pub struct TerminalDisplay {
    labels: [String; 3],
    dirty: bool,
    stdout: StandardStream,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            labels: Default::default(),
            dirty: true,
            stdout: StandardStream::stdout(ColorChoice::Auto),
        }
    }

    fn write_line(&mut self) -> std::io::Result<()> {
        for region in layout() {
            let text = self.labels[region.index()].as_str();
            let mut spec = ColorSpec::new();
            let cell = match region {
                LabelRegion::CurrentNote => {
                    spec.set_fg(Some(Color::Green)).set_intense(true);
                    format!("[{:>4}]", if text.is_empty() { "--" } else { text })
                }
                LabelRegion::Transpose => {
                    spec.set_fg(Some(Color::Yellow)).set_intense(true);
                    format!(" {:>4}", text)
                }
                LabelRegion::Control => {
                    spec.set_fg(Some(Color::Cyan));
                    format!("  {}", text)
                }
            };
            self.stdout.set_color(&spec)?;
            write!(self.stdout, "{}", cell)?;
        }
        writeln!(self.stdout)?;
        self.stdout.reset()
    }
}

/// Regions in the order they read on the OLED: by column, then by row.
fn layout() -> [LabelRegion; 3] {
    let mut regions = LabelRegion::ALL;
    regions.sort_by_key(|region| region.position());
    regions
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSurface for TerminalDisplay {
    fn set_label(&mut self, region: LabelRegion, text: &str) {
        let slot = &mut self.labels[region.index()];
        if slot.as_str() != text {
            *slot = text.to_string();
            self.dirty = true;
        }
    }

    fn redraw(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let _ = self.write_line();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingDisplay;
    use super::*;

    #[test]
    fn render_sets_every_region() {
        let projection = DisplayProjection {
            current_note: "C4".to_string(),
            transpose: "+1".to_string(),
            control: "CC=0".to_string(),
        };
        let mut display = RecordingDisplay::default();
        render(&mut display, &projection);
        assert_eq!(display.label(LabelRegion::CurrentNote), "C4");
        assert_eq!(display.label(LabelRegion::Transpose), "+1");
        assert_eq!(display.label(LabelRegion::Control), "CC=0");
        assert_eq!(display.redraws, 1);
    }

    #[test]
    fn terminal_line_follows_oled_columns() {
        assert_eq!(
            layout(),
            [LabelRegion::CurrentNote, LabelRegion::Transpose, LabelRegion::Control]
        );
    }

    #[test]
    fn terminal_display_tracks_changes() {
        let mut display = TerminalDisplay::new();
        display.redraw();
        assert!(!display.dirty);
        display.set_label(LabelRegion::Control, "CC=0");
        assert!(display.dirty);
        display.redraw();
        display.set_label(LabelRegion::Control, "CC=0");
        assert!(!display.dirty);
    }
}
