//! Cross-reference resolution: from an activated entity to the ordered
//! list of concrete occurrence locations to cycle through.
//!
//! Variables/lists are traced through the owning target, procedure
//! definitions through their call sites, broadcasts across **all** targets.
//! Occurrence ids that no longer resolve (the project changed under a stale
//! index) are silently dropped; a stale index degrades to fewer results,
//! never to an error.

use crate::extract::Category;
use crate::index::Entity;
use crate::model::{Block, InputValue, Project, Target};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Stand-in event name for broadcast senders whose event is a computed
/// expression rather than a menu selection. All such senders share this
/// bucket; see DESIGN.md.
pub const COMPLEX_BROADCAST: &str = "(complex broadcast)";

/// A concrete occurrence the presentation layer can scroll to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Index of the owning target in `Project::targets`.
    pub target: usize,
    pub target_name: String,
    /// Block id or asset id inside that target.
    pub id: String,
}

/// Resolve a single occurrence id within one target: block ids first, then
/// costume/sound asset ids. `None` when the id no longer exists.
pub fn resolve_occurrence(project: &Project, target_idx: usize, id: &str) -> Option<Location> {
    let target = project.targets.get(target_idx)?;
    let known = target.blocks.contains_key(id)
        || target.costumes.iter().any(|a| a.asset_id == id)
        || target.sounds.iter().any(|a| a.asset_id == id);
    known.then(|| Location {
        target: target_idx,
        target_name: target.name.clone(),
        id: id.to_string(),
    })
}

/// All blocks of one target that reference the variable or list `var_id`,
/// in program traversal order.
pub fn variable_uses(project: &Project, target_idx: usize, var_id: &str) -> Vec<Location> {
    let Some(target) = project.targets.get(target_idx) else {
        return Vec::new();
    };
    target
        .blocks_in_order()
        .into_iter()
        .filter(|(_, block)| block.referenced_variable_ids().contains(&var_id))
        .map(|(id, _)| Location {
            target: target_idx,
            target_name: target.name.clone(),
            id: id.to_string(),
        })
        .collect()
}

/// The defining block first, then every call whose signature matches the
/// definition's, in traversal order.
pub fn procedure_callers(project: &Project, target_idx: usize, definition_id: &str) -> Vec<Location> {
    let Some(target) = project.targets.get(target_idx) else {
        return Vec::new();
    };
    let Some(definition) = target.block(definition_id) else {
        // The definition went away under a stale index.
        return Vec::new();
    };
    let Some(proccode) = crate::extract::definition_proccode(target, definition) else {
        return vec![Location {
            target: target_idx,
            target_name: target.name.clone(),
            id: definition_id.to_string(),
        }];
    };

    let mut uses = vec![Location {
        target: target_idx,
        target_name: target.name.clone(),
        id: definition_id.to_string(),
    }];
    for (id, block) in target.blocks_in_order() {
        if block.opcode == "procedures_call"
            && block
                .mutation
                .as_ref()
                .and_then(|m| m.proccode.as_deref())
                == Some(proccode)
        {
            uses.push(Location {
                target: target_idx,
                target_name: target.name.clone(),
                id: id.to_string(),
            });
        }
    }
    uses
}

/// The event name a broadcast sender fires, resolved from its input
/// sub-block: a menu selection or inline broadcast reference yields its
/// literal value, anything else falls into the [`COMPLEX_BROADCAST`] bucket.
/// `None` when the input slot is empty (the sender is skipped entirely).
pub fn sender_event_name(target: &Target, block: &Block) -> Option<String> {
    let input = block.input("BROADCAST_INPUT")?;
    match &input.value {
        InputValue::Broadcast { name, .. } => Some(name.clone()),
        InputValue::Block(child_id) => match target.block(child_id) {
            Some(child) if child.opcode == "event_broadcast_menu" => Some(
                child
                    .field("BROADCAST_OPTION")
                    .map(|f| f.value.clone())
                    .unwrap_or_default(),
            ),
            Some(_) => Some(COMPLEX_BROADCAST.to_string()),
            None => None,
        },
        InputValue::Empty => None,
        _ => Some(COMPLEX_BROADCAST.to_string()),
    }
}

fn is_broadcast_sender(opcode: &str) -> bool {
    opcode == "event_broadcast" || opcode == "event_broadcastandwait"
}

/// Every receiver of, and sender resolving to, `event_name` — across all
/// targets, in target order then in-target traversal order. The per-target
/// sweeps are independent and run in parallel; collection preserves target
/// order, so the result is deterministic.
pub fn broadcast_uses(project: &Project, event_name: &str) -> Vec<Location> {
    let per_target: Vec<Vec<Location>> = project
        .targets
        .par_iter()
        .enumerate()
        .map(|(idx, target)| {
            let mut found = Vec::new();
            for (id, block) in target.blocks_in_order() {
                let hit = if block.opcode == "event_whenbroadcastreceived" {
                    block
                        .field("BROADCAST_OPTION")
                        .is_some_and(|f| f.value == event_name)
                } else if is_broadcast_sender(&block.opcode) {
                    sender_event_name(target, block).as_deref() == Some(event_name)
                } else {
                    false
                };
                if hit {
                    found.push(Location {
                        target: idx,
                        target_name: target.name.clone(),
                        id: id.to_string(),
                    });
                }
            }
            found
        })
        .collect();
    per_target.into_iter().flatten().collect()
}

/// The full navigation sequence for an activated entity.
///
/// Categories with dedicated tracing get it; alias-bearing generic entities
/// cycle through `[primary] ++ aliases`; everything else resolves to its
/// single location. Stale ids are dropped along the way.
pub fn resolve_locations(project: &Project, target_idx: usize, entity: &Entity) -> Vec<Location> {
    match entity.category {
        Category::VariableLocal
        | Category::VariableGlobal
        | Category::ListLocal
        | Category::ListGlobal => variable_uses(project, target_idx, &entity.primary_id),
        Category::Definition => procedure_callers(project, target_idx, &entity.primary_id),
        Category::BroadcastReceive => {
            broadcast_uses(project, entity.auxiliary.as_deref().unwrap_or(""))
        }
        _ => std::iter::once(entity.primary_id.as_str())
            .chain(entity.alias_ids.iter().map(String::as_str))
            .filter_map(|id| resolve_occurrence(project, target_idx, id))
            .collect(),
    }
}
