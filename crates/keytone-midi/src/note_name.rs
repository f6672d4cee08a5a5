//! Note name ⇄ note number conversion.
//!
//! Names are a pitch-class token followed by an octave: `C4`, `Cs4`, `As0`.
//! Sharps are written with a trailing `s`. Octave 0 starts at note number 12,
//! so `C0 = 12`, `A4 = 69` and `C4 = 60`.

/// Note number of `C0`.
pub const NOTE_C0: i32 = 12;

/// Note number published when a name cannot be resolved.
pub const UNRESOLVED_NOTE: i32 = -1;

/// Pitch-class tokens, indexed by semitone above C.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "Cs", "D", "Ds", "E", "F", "Fs", "G", "Gs", "A", "As", "B",
];

/// Derive a note number from a name.
///
/// The trailing run of ASCII digits is the octave and everything before it is
/// the pitch-class token. Returns `None` when either part is missing or
/// unknown, or the result does not fit in an `i32`.
///
/// ```rust
/// use keytone_midi::number_from_name;
///
/// assert_eq!(number_from_name("C0"), Some(12));
/// assert_eq!(number_from_name("A4"), Some(69));
/// assert_eq!(number_from_name("Cs4"), Some(61));
/// assert_eq!(number_from_name("H2"), None);
/// ```
pub fn number_from_name(name: &str) -> Option<i32> {
    let split = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (token, octave) = name.split_at(split);
    let octave: i32 = octave.parse().ok()?;
    let semitone = PITCH_CLASSES.iter().position(|&pc| pc == token)?;
    octave
        .checked_mul(12)?
        .checked_add(NOTE_C0)?
        .checked_add(semitone as i32)
}

/// [`number_from_name`], with [`UNRESOLVED_NOTE`] for names it rejects.
pub fn resolve_note_number(name: &str) -> i32 {
    number_from_name(name).unwrap_or(UNRESOLVED_NOTE)
}

/// Build the name of a note number.
///
/// Numbers below [`NOTE_C0`] are treated as `C0`.
///
/// ```rust
/// use keytone_midi::name_from_number;
///
/// assert_eq!(name_from_number(60), "C4");
/// assert_eq!(name_from_number(70), "As4");
/// assert_eq!(name_from_number(3), "C0");
/// ```
pub fn name_from_number(note_number: i32) -> String {
    let x = note_number.saturating_sub(NOTE_C0).max(0);
    let octave = x / 12;
    let semitone = (x % 12) as usize;
    format!("{}{}", PITCH_CLASSES[semitone], octave)
}

/// Find a note number in a control binding path such as `<MidiDevice>/note060`.
///
/// Matches the first `note` followed by exactly three more characters that
/// are all ASCII digits; further digits after those three are ignored.
pub fn note_number_from_path(path: &str) -> Option<i32> {
    path.match_indices("note").find_map(|(i, _)| {
        let digits = path.get(i + 4..i + 7)?;
        if digits.bytes().all(|b| b.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pitch_class() {
        for (semitone, token) in PITCH_CLASSES.iter().enumerate() {
            let name = format!("{token}3");
            assert_eq!(number_from_name(&name), Some(48 + semitone as i32));
        }
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(number_from_name(""), None);
        assert_eq!(number_from_name("C"), None);
        assert_eq!(number_from_name("4"), None);
        assert_eq!(number_from_name("Db4"), None);
        assert_eq!(number_from_name("c4"), None);
        assert_eq!(number_from_name("C-1"), None);
        assert_eq!(number_from_name("C99999999999"), None);
        assert_eq!(resolve_note_number("Cb2"), UNRESOLVED_NOTE);
    }

    #[test]
    fn piano_range_names() {
        assert_eq!(name_from_number(21), "A0");
        assert_eq!(name_from_number(108), "C8");
        assert_eq!(name_from_number(69), "A4");
    }

    #[test]
    fn low_numbers_clamp_to_c0() {
        assert_eq!(name_from_number(0), "C0");
        assert_eq!(name_from_number(-5), "C0");
        assert_eq!(name_from_number(11), "C0");
        assert_eq!(name_from_number(12), "C0");
    }

    #[test]
    fn extreme_numbers_do_not_overflow() {
        assert_eq!(name_from_number(i32::MIN), "C0");
        assert_eq!(name_from_number(i32::MIN + 1), "C0");
        assert_eq!(name_from_number(-1), "C0");
        assert_eq!(name_from_number(i32::MAX), "G178956969");
    }

    #[test]
    fn round_trip_octaves_0_to_8() {
        for n in 12..=119 {
            assert_eq!(number_from_name(&name_from_number(n)), Some(n), "note {n}");
        }
    }

    #[test]
    fn binding_paths() {
        assert_eq!(note_number_from_path("<MidiDevice>/note060"), Some(60));
        assert_eq!(note_number_from_path("<MidiDevice>/note108"), Some(108));
        assert_eq!(note_number_from_path("<MidiDevice>/note0600"), Some(60));
        assert_eq!(note_number_from_path("<MidiDevice>/note60"), None);
        assert_eq!(note_number_from_path("<Keyboard>/space"), None);
        assert_eq!(note_number_from_path("notes/note021"), Some(21));
        assert_eq!(note_number_from_path(""), None);
    }
}
