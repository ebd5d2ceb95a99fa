//! Append-only store of half-open time intervals.
//!
//! Each entry maps `[start, end)` to the per-agent states produced for that
//! interval. Entries are never mutated or merged once written; overlapping
//! entries are reconciled at read time by [`TemporalStore::read_merged`].
//! The whole history is kept for the lifetime of a run and exported
//! verbatim as the run's result.

use modsim_types::Universe;
use serde::{Deserialize, Serialize};

/// Wire form of an entry: `[start, end, payload]`.
type RawEntry = (f64, f64, Universe);

/// One committed interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct StoreEntry {
    /// Inclusive start of the interval.
    pub start: f64,
    /// Exclusive end of the interval.
    pub end: f64,
    /// Agent states valid over the interval.
    pub payload: Universe,
}

impl StoreEntry {
    /// Whether `t` falls inside `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

impl From<RawEntry> for StoreEntry {
    fn from((start, end, payload): RawEntry) -> Self {
        Self {
            start,
            end,
            payload,
        }
    }
}

impl From<StoreEntry> for RawEntry {
    fn from(entry: StoreEntry) -> Self {
        (entry.start, entry.end, entry.payload)
    }
}

/// The temporal store.
///
/// Serializes as the raw sequence of `[start, end, payload]` records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemporalStore {
    entries: Vec<StoreEntry>,
}

impl TemporalStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry covering `[start, end)`. Overlaps are not checked.
    pub fn write(&mut self, start: f64, end: f64, payload: Universe) {
        self.entries.push(StoreEntry {
            start,
            end,
            payload,
        });
    }

    /// Payloads of every entry containing `t`, by ascending start.
    ///
    /// Entries with equal starts keep insertion order. Returns an empty
    /// vector when nothing matches.
    pub fn point_lookup(&self, t: f64) -> Vec<&Universe> {
        let mut hits: Vec<&StoreEntry> = self.entries.iter().filter(|e| e.contains(t)).collect();
        hits.sort_by(|a, b| a.start.total_cmp(&b.start));
        hits.into_iter().map(|e| &e.payload).collect()
    }

    /// Fold the payloads at `t` left to right, later agents' entries winning.
    ///
    /// Merging is per agent: an agent's whole state is replaced by the
    /// latest entry that mentions it.
    pub fn read_merged(&self, t: f64) -> Universe {
        self.point_lookup(t)
            .into_iter()
            .fold(Universe::new(), |mut merged, payload| {
                merged.extend(payload.iter().map(|(id, state)| (id.clone(), state.clone())));
                merged
            })
    }

    /// The raw entry collection, in insertion order.
    pub fn entries(&self) -> &[StoreEntry] {
        &self.entries
    }

    /// Number of entries written.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use modsim_types::{AgentId, State, Value};

    use super::*;

    fn payload(agent: &str, field: &str, value: f64) -> Universe {
        let mut state = State::new();
        state.insert(field.to_owned(), Value::Number(value));
        Universe::from([(AgentId::from(agent), state)])
    }

    #[test]
    fn lookup_is_half_open() {
        let mut store = TemporalStore::new();
        store.write(0.0, 1.0, payload("A", "x", 1.0));

        assert_eq!(store.point_lookup(0.0).len(), 1);
        assert_eq!(store.point_lookup(0.999).len(), 1);
        assert!(store.point_lookup(1.0).is_empty());
        assert!(store.point_lookup(-0.001).is_empty());
    }

    #[test]
    fn single_interval_returns_its_payload() {
        let mut store = TemporalStore::new();
        store.write(0.0, 1.0, payload("A", "x", 1.0));
        store.write(1.0, 2.0, payload("A", "x", 2.0));

        assert_eq!(store.point_lookup(1.5), vec![&payload("A", "x", 2.0)]);
    }

    #[test]
    fn overlaps_are_ordered_by_start_then_insertion() {
        let mut store = TemporalStore::new();
        store.write(5.0, 10.0, payload("A", "x", 3.0));
        store.write(0.0, 10.0, payload("A", "x", 1.0));
        store.write(0.0, 10.0, payload("A", "x", 2.0));

        let hits = store.point_lookup(6.0);
        assert_eq!(
            hits,
            vec![
                &payload("A", "x", 1.0),
                &payload("A", "x", 2.0),
                &payload("A", "x", 3.0),
            ]
        );
        assert_eq!(store.read_merged(6.0), payload("A", "x", 3.0));
        assert_eq!(store.read_merged(1.0), payload("A", "x", 2.0));
    }

    #[test]
    fn merge_keeps_agents_from_every_entry() {
        let mut store = TemporalStore::new();
        store.write(0.0, 10.0, payload("A", "x", 1.0));
        store.write(2.0, 10.0, payload("B", "x", 2.0));

        let merged = store.read_merged(3.0);
        assert_eq!(merged.len(), 2);
        assert!(store.read_merged(11.0).is_empty());
    }

    #[test]
    fn serializes_as_raw_records() {
        let mut store = TemporalStore::new();
        store.write(-1.0, 0.0, payload("A", "mass", 1.0));

        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json, serde_json::json!([[-1.0, 0.0, {"A": {"mass": 1.0}}]]));
    }

    #[test]
    fn exported_entries_rebuild_identical_lookups() {
        let mut store = TemporalStore::new();
        store.write(-999_999_999.0, 0.0, payload("A", "x", 0.0));
        store.write(0.0, 100.0, payload("A", "x", 1.0));
        store.write(0.0, 100.0, payload("B", "x", 2.0));
        store.write(50.0, 150.0, payload("A", "x", 3.0));

        let json = serde_json::to_string(&store).unwrap();
        let rebuilt: TemporalStore = serde_json::from_str(&json).unwrap();

        for t in [-5.0, -0.001, 0.0, 49.9, 50.0, 99.99, 100.0, 149.0, 150.0] {
            assert_eq!(rebuilt.point_lookup(t), store.point_lookup(t), "t = {t}");
        }
        assert_eq!(rebuilt, store);
    }
}
