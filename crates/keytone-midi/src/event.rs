//! Normalized note events.

use std::fmt;

/// Direction of a note transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotePhase {
    /// Key pressed (action performed, or device note-on).
    Down,
    /// Key released (action canceled, or device note-off).
    Up,
}

impl fmt::Display for NotePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => f.write_str("Down"),
            Self::Up => f.write_str("Up"),
        }
    }
}

/// One observed key transition, from either input source.
///
/// Built at the moment the raw signal is observed and handed to every current
/// subscriber by reference; nothing keeps it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Note name such as `"C4"` or `"Cs4"`.
    pub name: String,
    /// Note number (12 = C0), or [`UNRESOLVED_NOTE`](crate::UNRESOLVED_NOTE).
    pub note_number: i32,
    /// Velocity in `[0, 1]`, or 1.0/0.0 for a plain press/release.
    pub value: f32,
    /// Down or Up.
    pub phase: NotePhase,
    /// Monotonic time in seconds.
    pub timestamp: f64,
}

impl NoteEvent {
    /// True for a Down event.
    pub fn is_down(&self) -> bool {
        self.phase == NotePhase::Down
    }

    /// True when the note number could be resolved.
    pub fn has_note_number(&self) -> bool {
        self.note_number >= 0
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {} v={:.3} t={:.3}",
            self.name, self.note_number, self.phase, self.value, self.timestamp
        )
    }
}
