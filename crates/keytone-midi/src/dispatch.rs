//! Note-to-voice dispatch.
//!
//! The instrument is gated monophonically: a counter tracks how many keys are
//! held, the selected synth follows the most recently pressed key's pitch, and
//! it stays active while the counter is above zero.

use crate::event::{NoteEvent, NotePhase};
use crate::router::NoteRouter;
use crate::stream::{EventStream, SubscriptionId};
use keytone_synth::{Synthesizer, midi_to_freq};
use parking_lot::Mutex;
use std::sync::Arc;

/// Held-key counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceGate {
    held: u32,
}

impl VoiceGate {
    /// A closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a key press. Returns whether the gate is open.
    pub fn press(&mut self) -> bool {
        self.held = self.held.saturating_add(1);
        self.is_open()
    }

    /// Count a key release, never going below zero. Returns whether the gate
    /// is open.
    pub fn release(&mut self) -> bool {
        self.held = self.held.saturating_sub(1);
        self.is_open()
    }

    /// Keys currently counted as held.
    pub fn held(&self) -> u32 {
        self.held
    }

    /// True while at least one key is held.
    pub fn is_open(&self) -> bool {
        self.held > 0
    }
}

/// Drives one selected synth out of a fixed set from note events.
///
/// Down: count the key, set the selected synth's frequency from the note
/// number (skipped for unresolved notes), then `set_active(held > 0)`.
/// Up: uncount the key, then `set_active(held > 0)`.
#[derive(Debug)]
pub struct NoteDispatcher<S> {
    synths: Vec<S>,
    selected: usize,
    gate: VoiceGate,
}

impl<S: Synthesizer> NoteDispatcher<S> {
    /// Dispatcher over `synths`, with the first one selected.
    pub fn new(synths: Vec<S>) -> Self {
        Self {
            synths,
            selected: 0,
            gate: VoiceGate::new(),
        }
    }

    /// Select the synth that receives note events.
    ///
    /// The previously selected synth is deactivated. Selecting the current
    /// synth, or an index out of range, changes nothing. Returns whether the
    /// selection changed. The held-key count carries over.
    pub fn select(&mut self, index: usize) -> bool {
        if index == self.selected || index >= self.synths.len() {
            return false;
        }
        if let Some(previous) = self.synths.get_mut(self.selected) {
            previous.set_active(false);
        }
        tracing::debug!(from = self.selected, to = index, "switched active synth");
        self.selected = index;
        true
    }

    /// Index of the selected synth.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The selected synth, if any synth exists.
    pub fn active_synth(&self) -> Option<&S> {
        self.synths.get(self.selected)
    }

    /// A synth by index.
    pub fn synth(&self, index: usize) -> Option<&S> {
        self.synths.get(index)
    }

    /// A synth by index, for control changes such as duty presets.
    pub fn synth_mut(&mut self, index: usize) -> Option<&mut S> {
        self.synths.get_mut(index)
    }

    /// The held-key counter.
    pub fn gate(&self) -> VoiceGate {
        self.gate
    }

    /// Handle a Down event.
    pub fn note_down(&mut self, event: &NoteEvent) {
        let open = self.gate.press();
        if let Some(synth) = self.synths.get_mut(self.selected) {
            if event.has_note_number() {
                synth.set_frequency(midi_to_freq(event.note_number));
            }
            synth.set_active(open);
        }
    }

    /// Handle an Up event.
    pub fn note_up(&mut self, _event: &NoteEvent) {
        let open = self.gate.release();
        if let Some(synth) = self.synths.get_mut(self.selected) {
            synth.set_active(open);
        }
    }

    /// Handle an event of either phase.
    pub fn handle(&mut self, event: &NoteEvent) {
        match event.phase {
            NotePhase::Down => self.note_down(event),
            NotePhase::Up => self.note_up(event),
        }
    }
}

/// Subscriptions tying a shared dispatcher to a router's aggregate streams.
#[derive(Debug)]
pub struct DispatchSubscription {
    any_down: (EventStream, SubscriptionId),
    any_up: (EventStream, SubscriptionId),
}

impl DispatchSubscription {
    /// Subscribe `dispatcher` to every Down and Up event of `router`.
    pub fn connect<S>(router: &NoteRouter, dispatcher: &Arc<Mutex<NoteDispatcher<S>>>) -> Self
    where
        S: Synthesizer + Send + 'static,
    {
        let any_down = router.on_any_down();
        let target = Arc::clone(dispatcher);
        let down_id = any_down.subscribe(move |e| target.lock().note_down(e));

        let any_up = router.on_any_up();
        let target = Arc::clone(dispatcher);
        let up_id = any_up.subscribe(move |e| target.lock().note_up(e));

        Self {
            any_down: (any_down, down_id),
            any_up: (any_up, up_id),
        }
    }

    /// Stop dispatching.
    pub fn disconnect(self) {
        self.any_down.0.unsubscribe(self.any_down.1);
        self.any_up.0.unsubscribe(self.any_up.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every façade call.
    #[derive(Debug, Default)]
    struct Probe {
        calls: Vec<String>,
        active: bool,
    }

    impl Synthesizer for Probe {
        fn set_frequency(&mut self, hz: f32) {
            self.calls.push(format!("freq {hz:.2}"));
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
            self.calls.push(format!("active {active}"));
        }
    }

    fn event(name: &str, phase: NotePhase) -> NoteEvent {
        NoteEvent {
            name: name.to_string(),
            note_number: crate::note_name::resolve_note_number(name),
            value: 1.0,
            phase,
            timestamp: 0.0,
        }
    }

    #[test]
    fn gate_never_goes_negative() {
        let mut gate = VoiceGate::new();
        assert!(!gate.release());
        assert_eq!(gate.held(), 0);
        assert!(gate.press());
        assert!(!gate.release());
        assert!(!gate.release());
        assert_eq!(gate.held(), 0);
    }

    #[test]
    fn overlapping_keys_keep_voice_active() {
        let mut d = NoteDispatcher::new(vec![Probe::default()]);
        d.handle(&event("C4", NotePhase::Down));
        d.handle(&event("D4", NotePhase::Down));
        d.handle(&event("C4", NotePhase::Up));
        assert_eq!(d.gate().held(), 1);
        assert!(d.active_synth().unwrap().active);

        d.handle(&event("D4", NotePhase::Up));
        assert_eq!(d.gate().held(), 0);
        assert!(!d.active_synth().unwrap().active);

        d.handle(&event("D4", NotePhase::Up));
        assert_eq!(d.gate().held(), 0);
        assert!(!d.active_synth().unwrap().active);
    }

    #[test]
    fn down_sets_pitch_before_gate() {
        let mut d = NoteDispatcher::new(vec![Probe::default()]);
        d.handle(&event("A4", NotePhase::Down));
        assert_eq!(d.synth(0).unwrap().calls, vec!["freq 440.00", "active true"]);
    }

    #[test]
    fn unresolved_note_counts_without_pitch() {
        let mut d = NoteDispatcher::new(vec![Probe::default()]);
        d.handle(&event("Pedal", NotePhase::Down));
        assert_eq!(d.gate().held(), 1);
        assert_eq!(d.synth(0).unwrap().calls, vec!["active true"]);
    }

    #[test]
    fn switching_deactivates_previous_synth() {
        let mut d = NoteDispatcher::new(vec![Probe::default(), Probe::default()]);
        d.handle(&event("C4", NotePhase::Down));
        assert!(d.synth(0).unwrap().active);

        assert!(!d.select(0));
        assert!(!d.select(5));
        assert!(d.select(1));
        assert!(!d.synth(0).unwrap().active);
        assert_eq!(d.selected(), 1);

        // the held count carries over to the new synth
        d.handle(&event("E4", NotePhase::Down));
        assert_eq!(d.gate().held(), 2);
        assert!(d.synth(1).unwrap().active);
        assert_eq!(d.synth(0).unwrap().calls.len(), 3);
    }

    #[test]
    fn empty_dispatcher_still_counts() {
        let mut d: NoteDispatcher<Probe> = NoteDispatcher::new(Vec::new());
        d.handle(&event("C4", NotePhase::Down));
        assert_eq!(d.gate().held(), 1);
        assert!(d.active_synth().is_none());
    }
}
