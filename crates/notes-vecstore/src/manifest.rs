//! Index manifest: the set of note ids currently embedded.
//!
//! The manifest is the authority for "what is in the index"; membership is
//! equivalent to a retrievable vector existing for that id. Diffing it
//! against the record store's active set drives the incremental-add and
//! prune decisions.

use std::collections::BTreeSet;

use notes_types::NoteId;

/// Ordered set of note ids currently represented in the vector index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexManifest {
    ids: Vec<NoteId>,
}

/// Result of diffing the manifest against the active note set.
#[derive(Debug, Clone, Default)]
pub struct ManifestDiff {
    /// Active ids with no vector yet (candidates for incremental add).
    pub missing: BTreeSet<NoteId>,
    /// Indexed ids no longer active (orphans; pruned by full rebuild).
    pub stale: BTreeSet<NoteId>,
}

impl ManifestDiff {
    /// True when the index already matches the active set exactly.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }
}

impl IndexManifest {
    /// Build a manifest from note ids in index order.
    pub fn from_ids(ids: Vec<NoteId>) -> Self {
        Self { ids }
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in index order.
    pub fn ids(&self) -> &[NoteId] {
        &self.ids
    }

    /// Membership as a set, for diffing.
    pub fn id_set(&self) -> BTreeSet<NoteId> {
        self.ids.iter().cloned().collect()
    }

    /// Diff against the record store's active id set.
    ///
    /// `missing` = active ids not in the manifest; `stale` = manifest ids
    /// not in the active set.
    pub fn diff_against(&self, active: &BTreeSet<NoteId>) -> ManifestDiff {
        let indexed = self.id_set();
        ManifestDiff {
            missing: active.difference(&indexed).cloned().collect(),
            stale: indexed.difference(active).cloned().collect(),
        }
    }
}
