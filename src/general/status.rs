use super::notes::note_label;
use super::playback::ActiveNotes;
use super::transpose::TransposeState;

/// One of the three independent text fields on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelRegion {
    CurrentNote,
    Transpose,
    Control,
}

impl LabelRegion {
    pub const ALL: [LabelRegion; 3] = [
        LabelRegion::CurrentNote,
        LabelRegion::Transpose,
        LabelRegion::Control,
    ];

    /// Anchor of the label on the 128x32 OLED.
    pub fn position(self) -> (u16, u16) {
        match self {
            LabelRegion::CurrentNote => (3, 15),
            LabelRegion::Transpose => (72, 9),
            LabelRegion::Control => (72, 19),
        }
    }

    pub fn index(self) -> usize {
        match self {
            LabelRegion::CurrentNote => 0,
            LabelRegion::Transpose => 1,
            LabelRegion::Control => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayProjection {
    pub current_note: String,
    pub transpose: String,
    pub control: String,
}

impl DisplayProjection {
    pub fn label(&self, region: LabelRegion) -> &str {
        match region {
            LabelRegion::CurrentNote => &self.current_note,
            LabelRegion::Transpose => &self.transpose,
            LabelRegion::Control => &self.control,
        }
    }
}

/// "+n" above zero, "-n" below, empty when untransposed.
pub fn transpose_text(transpose: i32) -> String {
    if transpose > 0 {
        format!("+{}", transpose)
    } else if transpose < 0 {
        transpose.to_string()
    } else {
        String::new()
    }
}

pub fn project(active: &ActiveNotes, state: &TransposeState) -> DisplayProjection {
    DisplayProjection {
        current_note: active.last_active().map(note_label).unwrap_or_default(),
        transpose: transpose_text(state.transpose()),
        control: format!("CC={}", state.control_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_projection() {
        let projection = project(&ActiveNotes::new(), &TransposeState::default());
        assert_eq!(projection.current_note, "");
        assert_eq!(projection.transpose, "");
        assert_eq!(projection.control, "CC=0");
    }

    #[test]
    fn shows_last_pressed_note() {
        let mut active = ActiveNotes::new();
        active.note_on(60);
        active.note_on(66);
        let projection = project(&active, &TransposeState::default());
        assert_eq!(projection.label(LabelRegion::CurrentNote), "F#4");
    }

    #[test]
    fn regions_keep_oled_layout() {
        let positions: Vec<_> = LabelRegion::ALL.iter().map(|r| r.position()).collect();
        assert_eq!(positions, vec![(3, 15), (72, 9), (72, 19)]);
    }

    #[test]
    fn transpose_sign_formatting() {
        assert_eq!(transpose_text(0), "");
        assert_eq!(transpose_text(1), "+1");
        assert_eq!(transpose_text(12), "+12");
        assert_eq!(transpose_text(-12), "-12");
    }

    #[test]
    fn control_reflects_configured_default() {
        let state = TransposeState::new(-12, 12, 64, 127);
        let projection = project(&ActiveNotes::new(), &state);
        assert_eq!(projection.label(LabelRegion::Control), "CC=127");
    }
}
