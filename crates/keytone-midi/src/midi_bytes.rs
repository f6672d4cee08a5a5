//! Raw MIDI byte parsing.
//!
//! Only note messages matter here. Control change, pitch bend, pressure and
//! system messages are ignored.

/// Note-level meaning of one channel-voice message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteMessage {
    /// Key pressed with a velocity in `(0, 1]`.
    NoteOn {
        /// MIDI channel, 0-15.
        channel: u8,
        /// Note number, 0-127.
        note: u8,
        /// `velocity / 127`.
        velocity: f32,
    },
    /// Key released (note-off, or note-on with velocity 0).
    NoteOff {
        /// MIDI channel, 0-15.
        channel: u8,
        /// Note number, 0-127.
        note: u8,
    },
}

impl NoteMessage {
    /// Note number of the message.
    pub fn note(&self) -> u8 {
        match *self {
            Self::NoteOn { note, .. } | Self::NoteOff { note, .. } => note,
        }
    }
}

/// Parse raw bytes into a note message.
///
/// Returns `None` for anything that is not a complete note-on or note-off.
pub fn parse_note_message(data: &[u8]) -> Option<NoteMessage> {
    let [status_byte, note, velocity, ..] = *data else {
        return None;
    };

    // data bytes must have the high bit clear
    if note > 0x7F || velocity > 0x7F {
        return None;
    }

    let channel = status_byte & 0x0F;
    match status_byte & 0xF0 {
        0x90 if velocity > 0 => Some(NoteMessage::NoteOn {
            channel,
            note,
            velocity: f32::from(velocity) / 127.0,
        }),
        0x80 | 0x90 => Some(NoteMessage::NoteOff { channel, note }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on() {
        assert_eq!(
            parse_note_message(&[0x93, 60, 127]),
            Some(NoteMessage::NoteOn {
                channel: 3,
                note: 60,
                velocity: 1.0
            })
        );
    }

    #[test]
    fn note_off_forms() {
        assert_eq!(
            parse_note_message(&[0x80, 64, 40]),
            Some(NoteMessage::NoteOff { channel: 0, note: 64 })
        );
        assert_eq!(
            parse_note_message(&[0x9F, 64, 0]),
            Some(NoteMessage::NoteOff { channel: 15, note: 64 })
        );
    }

    #[test]
    fn other_messages_ignored() {
        assert_eq!(parse_note_message(&[0xB0, 1, 64]), None);
        assert_eq!(parse_note_message(&[0xE0, 0, 64]), None);
        assert_eq!(parse_note_message(&[0xF8]), None);
        assert_eq!(parse_note_message(&[0xF0, 0x7E, 0x7F]), None);
        assert_eq!(parse_note_message(&[0x90, 60]), None);
        assert_eq!(parse_note_message(&[]), None);
        assert_eq!(parse_note_message(&[0x90, 0x80, 10]), None);
    }
}
