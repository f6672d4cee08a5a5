//! Statically bound note actions.
//!
//! An action is one named key (e.g. `"C4"`) bound to one or more control
//! paths. It fires a Down transition when performed and an Up transition when
//! canceled, each carrying a raw value that may or may not be readable as a
//! float.

use crate::event::NotePhase;
use crate::note_name::{name_from_number, note_number_from_path, resolve_note_number};

/// Lowest key of the default piano map (A0).
pub const PIANO_LOWEST: i32 = 21;

/// Highest key of the default piano map (C8).
pub const PIANO_HIGHEST: i32 = 108;

/// A named action and the control paths bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    /// Action name, also used as the event name.
    pub name: String,
    /// Control paths such as `<MidiDevice>/note060`.
    pub paths: Vec<String>,
}

impl ActionBinding {
    /// A binding with no paths.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paths: Vec::new(),
        }
    }

    /// Add a control path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Note number for this action.
    ///
    /// The first path containing `noteNNN` wins. Without one, the number is
    /// derived from the name, or [`UNRESOLVED_NOTE`](crate::UNRESOLVED_NOTE)
    /// if the name does not parse.
    pub fn note_number(&self) -> i32 {
        self.paths
            .iter()
            .find_map(|p| note_number_from_path(p))
            .unwrap_or_else(|| resolve_note_number(&self.name))
    }
}

/// One binding per piano key from A0 to C8, each bound to
/// `<MidiDevice>/noteNNN`.
pub fn piano_bindings() -> Vec<ActionBinding> {
    (PIANO_LOWEST..=PIANO_HIGHEST)
        .map(|n| ActionBinding::new(name_from_number(n)).with_path(format!("<MidiDevice>/note{n:03}")))
        .collect()
}

/// Payload carried by an action transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    /// A single float control (key velocity or pressure).
    Axis(f32),
    /// A two-axis control; not readable as a float.
    Vector2([f32; 2]),
    /// No payload.
    Missing,
}

/// Read an action payload as a float.
///
/// A finite axis value is clamped to [0, 1]. Anything else falls back to 1.0
/// for a Down transition and 0.0 for an Up transition.
pub fn read_value(raw: RawValue, phase: NotePhase) -> f32 {
    match raw {
        RawValue::Axis(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => default_value(phase),
    }
}

/// Boolean-like value for a transition with no usable payload.
pub fn default_value(phase: NotePhase) -> f32 {
    match phase {
        NotePhase::Down => 1.0,
        NotePhase::Up => 0.0,
    }
}
