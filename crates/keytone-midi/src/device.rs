//! MIDI device attachment.
//!
//! Devices report raw notes from their own threads through a [`NoteSink`];
//! the router drains the sink's channel on the control thread. The
//! [`DeviceRegistry`] tracks which devices are attached so each one is
//! connected once and disconnected once.

use crate::error::DeviceError;
use crate::midi_bytes::{NoteMessage, parse_note_message};
use crossbeam_channel::Sender;
use std::fmt;
use std::time::Instant;

/// Stable identity of a device for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// A raw note reported by a device, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceNote {
    /// Reporting device.
    pub device: DeviceId,
    /// Note number as reported.
    pub note_number: i32,
    /// `Some(velocity)` for note-on, `None` for note-off.
    pub velocity: Option<f32>,
    /// Display name of the note control, if the device has one.
    pub display_name: Option<String>,
    /// When the sink received the note.
    pub received: Instant,
}

impl DeviceNote {
    /// True for a note-on.
    pub fn is_note_on(&self) -> bool {
        self.velocity.is_some()
    }
}

/// Where a connected device sends its notes. Cheap to clone, `Send`.
#[derive(Debug, Clone)]
pub struct NoteSink {
    device: DeviceId,
    tx: Sender<DeviceNote>,
}

impl NoteSink {
    pub(crate) fn new(device: DeviceId, tx: Sender<DeviceNote>) -> Self {
        Self { device, tx }
    }

    /// Device this sink belongs to.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Report a note-on. Returns false once the router is gone.
    pub fn note_on(&self, note_number: i32, velocity: f32, display_name: Option<&str>) -> bool {
        self.send(note_number, Some(velocity), display_name)
    }

    /// Report a note-off. Returns false once the router is gone.
    pub fn note_off(&self, note_number: i32, display_name: Option<&str>) -> bool {
        self.send(note_number, None, display_name)
    }

    /// Parse raw MIDI bytes and report any note message they carry.
    ///
    /// Returns false if the bytes were not a note message or the router is gone.
    pub fn midi_bytes(&self, data: &[u8]) -> bool {
        match parse_note_message(data) {
            Some(NoteMessage::NoteOn { note, velocity, .. }) => {
                self.note_on(i32::from(note), velocity, None)
            }
            Some(NoteMessage::NoteOff { note, .. }) => self.note_off(i32::from(note), None),
            None => false,
        }
    }

    fn send(&self, note_number: i32, velocity: Option<f32>, display_name: Option<&str>) -> bool {
        self.tx
            .send(DeviceNote {
                device: self.device,
                note_number,
                velocity,
                display_name: display_name.map(str::to_string),
                received: Instant::now(),
            })
            .is_ok()
    }
}

/// A MIDI input that can be connected to a [`NoteSink`].
///
/// `connect` starts delivery, `disconnect` stops it. The registry calls each
/// exactly once per attachment.
pub trait MidiDevice: Send {
    /// Identity used for idempotent attach and for detach.
    fn id(&self) -> DeviceId;

    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Start delivering notes to `sink`.
    fn connect(&mut self, sink: NoteSink) -> Result<(), DeviceError>;

    /// Stop delivering notes.
    fn disconnect(&mut self) -> Result<(), DeviceError>;
}

/// A device hot-plug notification.
pub enum DeviceChange {
    /// A new device appeared.
    Added(Box<dyn MidiDevice>),
    /// A previously lost device came back.
    Reconnected(Box<dyn MidiDevice>),
    /// A device was removed.
    Removed(DeviceId),
    /// A device stopped responding.
    Disconnected(DeviceId),
}

impl fmt::Debug for DeviceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(d) => write!(f, "Added({} '{}')", d.id(), d.name()),
            Self::Reconnected(d) => write!(f, "Reconnected({} '{}')", d.id(), d.name()),
            Self::Removed(id) => write!(f, "Removed({id})"),
            Self::Disconnected(id) => write!(f, "Disconnected({id})"),
        }
    }
}

/// Devices currently attached, in attach order.
pub struct DeviceRegistry {
    attached: Vec<Box<dyn MidiDevice>>,
    tx: Sender<DeviceNote>,
}

impl fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.attached.iter().map(|d| (d.id(), d.name().to_string())))
            .finish()
    }
}

impl DeviceRegistry {
    /// An empty registry whose devices report into `tx`.
    pub fn new(tx: Sender<DeviceNote>) -> Self {
        Self {
            attached: Vec::new(),
            tx,
        }
    }

    /// Connect and record a device.
    ///
    /// Returns `Ok(false)` without touching the device if one with the same
    /// id is already attached. A device whose `connect` fails is not recorded.
    pub fn attach(&mut self, mut device: Box<dyn MidiDevice>) -> Result<bool, DeviceError> {
        let id = device.id();
        if self.is_attached(id) {
            tracing::debug!(%id, name = device.name(), "device already attached");
            return Ok(false);
        }
        device.connect(NoteSink::new(id, self.tx.clone()))?;
        tracing::info!(%id, name = device.name(), "attached MIDI device");
        self.attached.push(device);
        Ok(true)
    }

    /// Disconnect and forget a device. Returns false if it was not attached.
    ///
    /// A failing `disconnect` is logged and otherwise ignored; the device is
    /// forgotten either way.
    pub fn detach(&mut self, id: DeviceId) -> bool {
        let Some(pos) = self.attached.iter().position(|d| d.id() == id) else {
            return false;
        };
        let mut device = self.attached.remove(pos);
        Self::disconnect_quietly(device.as_mut());
        true
    }

    /// Apply a hot-plug notification. Connect failures are logged.
    pub fn handle_change(&mut self, change: DeviceChange) {
        match change {
            DeviceChange::Added(device) | DeviceChange::Reconnected(device) => {
                if let Err(err) = self.attach(device) {
                    tracing::warn!(error = %err, "could not attach MIDI device");
                }
            }
            DeviceChange::Removed(id) | DeviceChange::Disconnected(id) => {
                self.detach(id);
            }
        }
    }

    /// Detach every device. Returns how many were attached.
    pub fn detach_all(&mut self) -> usize {
        let devices = std::mem::take(&mut self.attached);
        let count = devices.len();
        for mut device in devices {
            Self::disconnect_quietly(device.as_mut());
        }
        count
    }

    /// Whether a device with this id is attached.
    pub fn is_attached(&self, id: DeviceId) -> bool {
        self.attached.iter().any(|d| d.id() == id)
    }

    /// Ids of attached devices, in attach order.
    pub fn attached_ids(&self) -> Vec<DeviceId> {
        self.attached.iter().map(|d| d.id()).collect()
    }

    /// Number of attached devices.
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// True if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    fn disconnect_quietly(device: &mut dyn MidiDevice) {
        let id = device.id();
        match device.disconnect() {
            Ok(()) => tracing::info!(%id, name = device.name(), "detached MIDI device"),
            Err(err) => tracing::warn!(%id, error = %err, "ignoring MIDI device detach failure"),
        }
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.detach_all();
    }
}
