//! Per-key stream registry.

use crate::event::{NoteEvent, NotePhase};
use crate::stream::EventStream;
use std::collections::HashMap;

/// Down/Up streams per note name, plus the two aggregate streams.
///
/// Per-name streams are created on first reference, whether that reference is
/// a lookup or a publish, so device notes with no static binding still get
/// streams. A name maps to one Down and one Up stream for the registry's
/// lifetime.
#[derive(Debug, Default)]
pub struct KeyStreamRegistry {
    down: HashMap<String, EventStream>,
    up: HashMap<String, EventStream>,
    any_down: EventStream,
    any_up: EventStream,
    closed: bool,
}

impl KeyStreamRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The Down stream for `name`, created if needed.
    pub fn down(&mut self, name: &str) -> EventStream {
        Self::stream_for(&mut self.down, name, self.closed)
    }

    /// The Up stream for `name`, created if needed.
    pub fn up(&mut self, name: &str) -> EventStream {
        Self::stream_for(&mut self.up, name, self.closed)
    }

    /// The stream for `name` in the given phase, created if needed.
    pub fn stream(&mut self, name: &str, phase: NotePhase) -> EventStream {
        match phase {
            NotePhase::Down => self.down(name),
            NotePhase::Up => self.up(name),
        }
    }

    /// Aggregate stream of every Down event.
    pub fn any_down(&self) -> EventStream {
        self.any_down.clone()
    }

    /// Aggregate stream of every Up event.
    pub fn any_up(&self) -> EventStream {
        self.any_up.clone()
    }

    /// Publish to the event's per-name stream, then to the matching aggregate.
    pub fn publish(&mut self, event: &NoteEvent) {
        if self.closed {
            return;
        }
        self.stream(&event.name, event.phase).emit(event);
        match event.phase {
            NotePhase::Down => self.any_down.emit(event),
            NotePhase::Up => self.any_up.emit(event),
        }
    }

    /// True if a Down or Up stream exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.down.contains_key(name) || self.up.contains_key(name)
    }

    /// Number of distinct names with at least one stream.
    pub fn len(&self) -> usize {
        self.down.len() + self.up.keys().filter(|k| !self.down.contains_key(*k)).count()
    }

    /// True if no per-name stream exists.
    pub fn is_empty(&self) -> bool {
        self.down.is_empty() && self.up.is_empty()
    }

    /// Complete every stream. Streams created afterwards start completed.
    pub fn complete_all(&mut self) {
        self.closed = true;
        for stream in self.down.values().chain(self.up.values()) {
            stream.complete();
        }
        self.any_down.complete();
        self.any_up.complete();
    }

    /// Whether [`complete_all`](Self::complete_all) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn stream_for(map: &mut HashMap<String, EventStream>, name: &str, closed: bool) -> EventStream {
        if let Some(stream) = map.get(name) {
            return stream.clone();
        }
        let stream = EventStream::new();
        if closed {
            stream.complete();
        }
        map.insert(name.to_string(), stream.clone());
        stream
    }
}
