//! Named path registry and overlay combination.
//!
//! Replaces the globally shared, temporarily mutated path table with an
//! explicit registry object handed to the orchestrator. Overlay display
//! is expressed as the pure [`combine`] function instead of injecting
//! "combined" entries into shared state.

use crate::helio_timeline::AnglePair;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hour-keyed angle pairs for one segment, as found in the raw data.
pub type RawSegment = BTreeMap<String, AnglePair>;

/// Raw angle data for one named path: a mapping from segment name to its
/// hour-keyed `[vertical, horizontal]` samples.
///
/// This mirrors the external data-preparation contract; keys may be
/// sparse and irregularly spaced, with at least one entry per segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPath {
    pub segments: BTreeMap<String, RawSegment>,
}

impl RawPath {
    /// Creates a single-segment path.
    pub fn single(segment_name: impl Into<String>, keyframes: RawSegment) -> Self {
        let mut segments = BTreeMap::new();
        segments.insert(segment_name.into(), keyframes);
        Self { segments }
    }
}

/// Registry of named paths available to an animation session.
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    paths: BTreeMap<String, RawPath>,
}

impl PathRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a registry from the raw-angle JSON contract:
    /// path name → segment name → hour key → `[vertical, horizontal]`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let paths: BTreeMap<String, RawPath> = serde_json::from_str(json)?;
        Ok(Self { paths })
    }

    /// Registers or replaces a path.
    pub fn register(&mut self, name: impl Into<String>, path: RawPath) {
        self.paths.insert(name.into(), path);
    }

    /// Looks up a path by name.
    pub fn get(&self, name: &str) -> Option<&RawPath> {
        self.paths.get(name)
    }

    /// Removes a path, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<RawPath> {
        self.paths.remove(name)
    }

    /// Registered path names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// One labeled segment of a combined dataset.
#[derive(Debug, Clone)]
pub struct CombinedEntry {
    /// Segment name, prefixed with its path name for overlay segments
    pub label: String,

    /// The segment's raw keyframes
    pub keyframes: RawSegment,

    /// True when the segment came from an overlay path
    pub overlay: bool,
}

/// The flattened input a segment orchestrator animates.
#[derive(Debug, Clone, Default)]
pub struct CombinedDataset {
    pub entries: Vec<CombinedEntry>,
}

impl CombinedDataset {
    /// Number of segments across main path and overlays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the dataset has no segments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Combines a main path with overlay paths into one flat dataset.
///
/// Main segments keep their names; overlay segments are labeled
/// `"{path}/{segment}"` so same-named segments from different overlays
/// stay distinct. Inputs are borrowed and never mutated.
pub fn combine(main: &RawPath, overlays: &[(&str, &RawPath)]) -> CombinedDataset {
    let mut entries = Vec::new();

    for (name, keyframes) in &main.segments {
        entries.push(CombinedEntry {
            label: name.clone(),
            keyframes: keyframes.clone(),
            overlay: false,
        });
    }

    for (path_name, path) in overlays {
        for (name, keyframes) in &path.segments {
            entries.push(CombinedEntry {
                label: format!("{path_name}/{name}"),
                keyframes: keyframes.clone(),
                overlay: true,
            });
        }
    }

    CombinedDataset { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(hours: &[&str]) -> RawSegment {
        hours
            .iter()
            .map(|h| (h.to_string(), [-0.5, 0.1]))
            .collect()
    }

    #[test]
    fn test_combine_labels_and_order() {
        let main = RawPath::single("arc", segment(&["6", "18"]));
        let overlay = RawPath::single("arc", segment(&["0", "12"]));

        let dataset = combine(&main, &[("winter", &overlay)]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.entries[0].label, "arc");
        assert!(!dataset.entries[0].overlay);
        assert_eq!(dataset.entries[1].label, "winter/arc");
        assert!(dataset.entries[1].overlay);
    }

    #[test]
    fn test_combine_does_not_mutate_inputs() {
        let main = RawPath::single("arc", segment(&["6"]));
        let overlay = RawPath::single("arc", segment(&["12"]));
        let before = format!("{main:?}{overlay:?}");

        let _ = combine(&main, &[("o", &overlay)]);

        assert_eq!(format!("{main:?}{overlay:?}"), before);
    }

    #[test]
    fn test_registry_round_trip_json() {
        let json = r#"{
            "summer": { "arc": { "6": [-0.9, -0.3], "18.5": [-0.4, 0.5] } }
        }"#;
        let registry = PathRegistry::from_json(json).unwrap();

        assert_eq!(registry.len(), 1);
        let path = registry.get("summer").unwrap();
        assert_eq!(path.segments["arc"].len(), 2);
        assert_eq!(path.segments["arc"]["18.5"], [-0.4, 0.5]);
    }

    #[test]
    fn test_registry_register_and_remove() {
        let mut registry = PathRegistry::new();
        registry.register("a", RawPath::single("s", segment(&["0"])));
        assert!(!registry.is_empty());
        assert!(registry.remove("a").is_some());
        assert!(registry.get("a").is_none());
    }
}
