//! Keytone MIDI - note event routing
//!
//! Turns raw key signals from two independent sources into one stream of
//! named note events, and drives a synth from them.
//!
//! # Sources
//!
//! - [`ActionBinding`] - Statically bound named keys, fired through
//!   [`NoteRouter::trigger_action`]
//! - [`MidiDevice`] - Hot-pluggable devices reporting any note number through
//!   a [`NoteSink`], tracked by a [`DeviceRegistry`]
//!
//! # Routing
//!
//! - [`NoteRouter`] - Normalizes both sources into [`NoteEvent`]s
//! - [`KeyStreamRegistry`] - Per-name Down/Up streams, created on first use,
//!   plus the aggregate streams
//! - [`EventStream`] - Synchronous multicast to subscribers
//!
//! # Dispatch
//!
//! - [`NoteDispatcher`] - Held-key counter and active-synth selection over any
//!   [`Synthesizer`](keytone_synth::Synthesizer)
//!
//! # Note Names
//!
//! `C0` is note 12, sharps are spelled with `s` (`Cs4`, `Fs2`). See
//! [`number_from_name`] and [`name_from_number`].
//!
//! # Duplicate Delivery
//!
//! The router does not de-duplicate across sources. If the same key press is
//! both bound as an action and reported by an attached device, subscribers see
//! it twice and the dispatcher counts two held keys. Disable one source with
//! [`NoteRouter::set_actions_enabled`] or [`NoteRouter::set_devices_enabled`]
//! to avoid that.

pub mod action;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod midi_bytes;
pub mod note_name;
pub mod registry;
pub mod router;
pub mod stream;

pub use action::{
    ActionBinding, PIANO_HIGHEST, PIANO_LOWEST, RawValue, default_value, piano_bindings,
    read_value,
};
pub use device::{DeviceChange, DeviceId, DeviceNote, DeviceRegistry, MidiDevice, NoteSink};
pub use dispatch::{DispatchSubscription, NoteDispatcher, VoiceGate};
pub use error::{BackendError, DeviceError};
pub use event::{NoteEvent, NotePhase};
pub use midi_bytes::{NoteMessage, parse_note_message};
pub use note_name::{
    NOTE_C0, PITCH_CLASSES, UNRESOLVED_NOTE, name_from_number, note_number_from_path,
    number_from_name, resolve_note_number,
};
pub use registry::KeyStreamRegistry;
pub use router::{DIRECT_DEVICE, NoteRouter};
pub use stream::{EventStream, SubscriptionId};
