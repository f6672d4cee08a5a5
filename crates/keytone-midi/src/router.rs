//! Dual-source note router.
//!
//! [`NoteRouter`] fans in two independent producers:
//!
//! - **Actions**: named keys bound up front ([`ActionBinding`]), fired with
//!   [`NoteRouter::trigger_action`].
//! - **Devices**: attached [`MidiDevice`]s reporting any note number, drained
//!   with [`NoteRouter::poll_devices`] (or fed directly through
//!   [`NoteRouter::device_note_on`] / [`NoteRouter::device_note_off`]).
//!
//! Both are normalized into [`NoteEvent`]s and published through the
//! [`KeyStreamRegistry`]. The router does not de-duplicate: a key reported by
//! both sources is published twice.

use crate::action::{ActionBinding, RawValue, read_value};
use crate::device::{DeviceChange, DeviceId, DeviceNote, DeviceRegistry, MidiDevice, NoteSink};
use crate::error::DeviceError;
use crate::event::{NoteEvent, NotePhase};
use crate::note_name::{UNRESOLVED_NOTE, name_from_number};
use crate::registry::KeyStreamRegistry;
use crate::stream::EventStream;
use crossbeam_channel::{Receiver, unbounded};
use std::collections::HashMap;
use std::time::Instant;

/// Routes both note sources into named and aggregate event streams.
///
/// Lives on the control thread. Devices may report from any thread; their
/// notes wait in a channel until [`poll_devices`](Self::poll_devices).
///
/// # Example
///
/// ```rust
/// use keytone_midi::{NotePhase, NoteRouter, RawValue, piano_bindings};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let mut router = NoteRouter::with_bindings(piano_bindings());
/// let downs = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&downs);
/// router.on_any_down().subscribe(move |_| {
///     counter.fetch_add(1, Ordering::Relaxed);
/// });
///
/// router.trigger_action("C4", NotePhase::Down, RawValue::Axis(0.8), 0.0);
/// router.device_note_on(64, 0.5, None);
/// router.poll_devices();
/// assert_eq!(downs.load(Ordering::Relaxed), 2);
/// ```
#[derive(Debug)]
pub struct NoteRouter {
    streams: KeyStreamRegistry,
    /// Bound action name → resolved note number.
    actions: HashMap<String, i32>,
    devices: DeviceRegistry,
    device_notes: Receiver<DeviceNote>,
    /// Local sink for notes injected without a device.
    direct: NoteSink,
    actions_enabled: bool,
    devices_enabled: bool,
    epoch: Instant,
    closed: bool,
}

impl Default for NoteRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Device id used for notes injected with `device_note_on`/`device_note_off`.
pub const DIRECT_DEVICE: DeviceId = DeviceId(u32::MAX);

impl NoteRouter {
    /// A router with no bound actions and no devices.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            streams: KeyStreamRegistry::new(),
            actions: HashMap::new(),
            direct: NoteSink::new(DIRECT_DEVICE, tx.clone()),
            devices: DeviceRegistry::new(tx),
            device_notes: rx,
            actions_enabled: true,
            devices_enabled: true,
            epoch: Instant::now(),
            closed: false,
        }
    }

    /// A router with the given actions bound.
    pub fn with_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = ActionBinding>,
    {
        let mut router = Self::new();
        router.bind_actions(bindings);
        router
    }

    /// Bind one action and create its Down/Up streams.
    ///
    /// Returns the resolved note number. Rebinding a name replaces its number.
    pub fn bind_action(&mut self, binding: &ActionBinding) -> i32 {
        let number = binding.note_number();
        if number == UNRESOLVED_NOTE {
            tracing::debug!(action = %binding.name, "no note number for action");
        }
        self.streams.down(&binding.name);
        self.streams.up(&binding.name);
        self.actions.insert(binding.name.clone(), number);
        number
    }

    /// Bind several actions.
    pub fn bind_actions<I>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = ActionBinding>,
    {
        for binding in bindings {
            self.bind_action(&binding);
        }
    }

    /// Note number of a bound action.
    pub fn action_note_number(&self, name: &str) -> Option<i32> {
        self.actions.get(name).copied()
    }

    /// Number of bound actions.
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    // --- subscriptions ---

    /// Down stream for one note name, created if needed.
    pub fn on_down(&mut self, name: &str) -> EventStream {
        self.streams.down(name)
    }

    /// Up stream for one note name, created if needed.
    pub fn on_up(&mut self, name: &str) -> EventStream {
        self.streams.up(name)
    }

    /// Every Down event from either source.
    pub fn on_any_down(&self) -> EventStream {
        self.streams.any_down()
    }

    /// Every Up event from either source.
    pub fn on_any_up(&self) -> EventStream {
        self.streams.any_up()
    }

    /// The stream registry.
    pub fn streams(&self) -> &KeyStreamRegistry {
        &self.streams
    }

    // --- action source ---

    /// Fire a bound action.
    ///
    /// The payload is read with [`read_value`], so an unreadable value becomes
    /// 1.0 (Down) or 0.0 (Up). Returns false if the name is not bound, the
    /// action source is disabled, or the router is closed.
    pub fn trigger_action(
        &mut self,
        name: &str,
        phase: NotePhase,
        raw: RawValue,
        timestamp: f64,
    ) -> bool {
        if self.closed || !self.actions_enabled {
            return false;
        }
        let Some(&note_number) = self.actions.get(name) else {
            tracing::debug!(action = name, "ignoring unbound action");
            return false;
        };
        let event = NoteEvent {
            name: name.to_string(),
            note_number,
            value: read_value(raw, phase),
            phase,
            timestamp,
        };
        self.publish(&event);
        true
    }

    // --- device source ---

    /// Attach a device. Attaching an id that is already attached, or
    /// attaching after [`close`](Self::close), does nothing.
    pub fn attach_device(&mut self, device: Box<dyn MidiDevice>) -> Result<bool, DeviceError> {
        if self.closed {
            return Ok(false);
        }
        self.devices.attach(device)
    }

    /// Detach a device. Returns false if it was not attached.
    pub fn detach_device(&mut self, id: DeviceId) -> bool {
        self.devices.detach(id)
    }

    /// Apply a hot-plug notification.
    pub fn handle_device_change(&mut self, change: DeviceChange) {
        if self.closed {
            return;
        }
        self.devices.handle_change(change);
    }

    /// The device registry.
    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// Queue a note-on as if an attached device reported it.
    ///
    /// Delivered by the next [`poll_devices`](Self::poll_devices).
    pub fn device_note_on(&self, note_number: i32, velocity: f32, display_name: Option<&str>) {
        self.direct.note_on(note_number, velocity, display_name);
    }

    /// Queue a note-off as if an attached device reported it.
    pub fn device_note_off(&self, note_number: i32, display_name: Option<&str>) {
        self.direct.note_off(note_number, display_name);
    }

    /// Publish every device note queued at the time of the call, in arrival
    /// order. Returns the number published.
    ///
    /// While the device source is disabled, queued notes are discarded.
    pub fn poll_devices(&mut self) -> usize {
        let pending = self.device_notes.len();
        let mut published = 0;
        for _ in 0..pending {
            let Ok(note) = self.device_notes.try_recv() else {
                break;
            };
            if self.closed || !self.devices_enabled {
                continue;
            }
            let event = self.normalize(note);
            self.publish(&event);
            published += 1;
        }
        published
    }

    fn normalize(&self, note: DeviceNote) -> NoteEvent {
        let name = match note.display_name {
            Some(name) if !name.is_empty() => name,
            _ => name_from_number(note.note_number),
        };
        let (phase, value) = match note.velocity {
            Some(v) if v.is_nan() => (
                NotePhase::Down,
                read_value(RawValue::Missing, NotePhase::Down),
            ),
            Some(v) => (NotePhase::Down, v.clamp(0.0, 1.0)),
            None => (NotePhase::Up, 0.0),
        };
        NoteEvent {
            name,
            note_number: note.note_number,
            value,
            phase,
            timestamp: self.seconds_at(note.received),
        }
    }

    // --- source switches ---

    /// Enable or disable the action source.
    pub fn set_actions_enabled(&mut self, enabled: bool) {
        self.actions_enabled = enabled;
    }

    /// Whether the action source is enabled.
    pub fn actions_enabled(&self) -> bool {
        self.actions_enabled
    }

    /// Enable or disable the device source.
    pub fn set_devices_enabled(&mut self, enabled: bool) {
        self.devices_enabled = enabled;
    }

    /// Whether the device source is enabled.
    pub fn devices_enabled(&self) -> bool {
        self.devices_enabled
    }

    // --- clock and lifecycle ---

    /// Seconds since the router was created.
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn seconds_at(&self, instant: Instant) -> f64 {
        instant.saturating_duration_since(self.epoch).as_secs_f64()
    }

    fn publish(&mut self, event: &NoteEvent) {
        tracing::trace!(%event, "note");
        self.streams.publish(event);
    }

    /// Complete every stream, drop queued device notes and detach every
    /// device. Later triggers and polls publish nothing. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.streams.complete_all();
        while self.device_notes.try_recv().is_ok() {}
        let detached = self.devices.detach_all();
        tracing::debug!(detached, "note router closed");
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for NoteRouter {
    fn drop(&mut self) {
        self.close();
    }
}
