//! Deduplicated entity index.
//!
//! Merges raw extractor tuples into [`Entity`] records: occurrences with the
//! same category and display text share one entity, the first one discovered
//! becomes the primary occurrence and the rest become aliases. The finished
//! index is stable-sorted by `(category rank, search key, sort rank)` so
//! repeated builds over the same input are byte-for-byte identical —
//! ordering never depends on hash iteration.

use crate::extract::{self, Category, RawEntity, Tab};
use crate::model::Project;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One searchable entity: a deduplicated block shape, a variable, a list,
/// a broadcast receiver, a costume or a sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub category: Category,
    pub display_text: String,
    /// Lowercase form of `display_text`; never mutated after creation.
    pub search_key: String,
    /// Occurrence id of the first discovery (block id, variable id, asset id).
    pub primary_id: String,
    /// Further structurally-identical occurrences, in discovery order.
    pub alias_ids: Vec<String>,
    /// Deterministic tiebreak for otherwise-identical sort keys.
    pub sort_rank: f64,
    /// Category-specific payload: the event name for broadcast receivers.
    pub auxiliary: Option<String>,
}

impl Entity {
    /// Total number of known occurrences.
    pub fn occurrence_count(&self) -> usize {
        1 + self.alias_ids.len()
    }

    /// True when `id` is the primary occurrence or one of the aliases.
    pub fn matches_occurrence(&self, id: &str) -> bool {
        self.primary_id == id || self.alias_ids.iter().any(|a| a == id)
    }
}

/// An immutable, ordered entity index. Built fresh on every search-panel
/// open; entities are never removed, the whole index is discarded and
/// rebuilt instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    pub entities: Vec<Entity>,
}

impl Index {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Entity> {
        self.entities.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }
}

/// Builder merging raw tuples into entities. The `(category, display text)`
/// map is scoped to one build and discarded by [`IndexBuilder::finish`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    by_key: IndexMap<(Category, String), usize>,
    entities: Vec<Entity>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, raw: RawEntity) {
        let key = (raw.category, raw.display_text.clone());
        if let Some(&idx) = self.by_key.get(&key) {
            let entity = &mut self.entities[idx];
            if !entity.matches_occurrence(&raw.occurrence_id) {
                entity.alias_ids.push(raw.occurrence_id);
            }
            return;
        }
        let search_key = raw.display_text.to_lowercase();
        self.by_key.insert(key, self.entities.len());
        self.entities.push(Entity {
            category: raw.category,
            display_text: raw.display_text,
            search_key,
            primary_id: raw.occurrence_id,
            alias_ids: Vec::new(),
            sort_rank: raw.sort_hint,
            auxiliary: raw.auxiliary,
        });
    }

    pub fn finish(mut self) -> Index {
        self.entities.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.search_key.cmp(&b.search_key))
                .then_with(|| a.sort_rank.total_cmp(&b.sort_rank))
        });
        Index {
            entities: self.entities,
        }
    }
}

/// Build the index for one target and editor tab.
pub fn build_index(project: &Project, target_idx: usize, tab: Tab) -> Index {
    let mut builder = IndexBuilder::new();
    for raw in extract::extract_entities(project, target_idx, tab) {
        builder.add(raw);
    }
    builder.finish()
}
