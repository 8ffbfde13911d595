use serde::Serialize;
use uuid::Uuid;

use crate::DurationConfig;

/// A single timed exercise in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseEntry {
    id: Uuid,
    name: String,
    duration_seconds: u32,
    spoken: bool,
}

impl ExerciseEntry {
    fn new(name: String, duration_seconds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            duration_seconds,
            spoken: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Text handed to the announcer when this exercise becomes current.
    pub fn instruction(&self) -> String {
        format!("{} for {} seconds", self.name, self.duration_seconds)
    }

    /// Whether the instruction has been announced at least once.
    pub fn has_been_spoken(&self) -> bool {
        self.spoken
    }

    pub(crate) fn mark_spoken(&mut self) {
        self.spoken = true;
    }
}

/// Ordered list of exercises edited before a session starts.
///
/// Editing is forgiving: adding an empty name, removing a missing index, or
/// touching a locked catalog are ignored instead of reported.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bounds: DurationConfig,
    entries: Vec<ExerciseEntry>,
    locked: bool,
}

impl Catalog {
    pub fn new(bounds: DurationConfig) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            locked: false,
        }
    }

    /// Appends an exercise, clamping its duration into the configured range.
    /// Returns `true` when the entry was added.
    pub fn add(&mut self, name: &str, duration_seconds: u32) -> bool {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("ignoring exercise with empty name");
            return false;
        }
        if self.locked {
            tracing::debug!(name, "catalog is locked, ignoring add");
            return false;
        }

        let duration = self.bounds.clamp(duration_seconds);
        self.entries.push(ExerciseEntry::new(name.to_string(), duration));
        tracing::debug!(name, duration, "exercise added");
        true
    }

    /// Removes the entry at `index`, keeping the others in order.
    pub fn remove(&mut self, index: usize) -> Option<ExerciseEntry> {
        if self.locked || index >= self.entries.len() {
            tracing::debug!(index, locked = self.locked, "ignoring remove");
            return None;
        }
        Some(self.entries.remove(index))
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Drops every entry and reopens the catalog for editing.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Sum of all durations, saturating at `u32::MAX`.
    pub fn total_duration(&self) -> u32 {
        self.entries
            .iter()
            .map(ExerciseEntry::duration_seconds)
            .fold(0, u32::saturating_add)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ExerciseEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ExerciseEntry> {
        self.entries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ExerciseEntry> {
        self.entries.get_mut(index)
    }
}

/// Transient add-exercise input: a name field and a duration stepper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDraft {
    bounds: DurationConfig,
    name: String,
    duration_seconds: u32,
}

impl ExerciseDraft {
    pub fn new(bounds: DurationConfig) -> Self {
        Self {
            bounds,
            name: String::new(),
            duration_seconds: bounds.min_seconds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn clear_name(&mut self) {
        self.name.clear();
    }

    pub fn set_duration(&mut self, seconds: u32) {
        self.duration_seconds = self.bounds.clamp(seconds);
    }

    pub fn increment(&mut self) {
        let next = self.duration_seconds.saturating_add(self.bounds.step_seconds);
        self.set_duration(next);
    }

    pub fn decrement(&mut self) {
        let next = self.duration_seconds.saturating_sub(self.bounds.step_seconds);
        self.set_duration(next);
    }
}
