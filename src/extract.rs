//! Entity extraction and classification.
//!
//! Walks a target's block graph plus its variable/list tables (or its
//! costume/sound lists, depending on the active editor tab) and produces the
//! raw `(category, display text, occurrence id, sort hint)` tuples the index
//! builder deduplicates. Extraction is read-only: it never touches the
//! project model it walks.

use crate::catalog;
use crate::model::{Block, InputValue, Project, Target};
use serde::{Deserialize, Serialize};

/// Occurrence id the editor emits for malformed blocks; never indexed.
pub const INVALID_BLOCK_ID: &str = "@";

/// Entity categories, declared in display rank order: the index sorts
/// categories by this declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    FlagEvent,
    BroadcastReceive,
    GenericEvent,
    Definition,
    VariableLocal,
    VariableGlobal,
    ListLocal,
    ListGlobal,
    Motion,
    Looks,
    SoundOp,
    Control,
    Sensing,
    Operator,
    Data,
    Extension,
    Costume,
    Sound,
    Other,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::FlagEvent => "flag-event",
            Category::BroadcastReceive => "broadcast-receive",
            Category::GenericEvent => "generic-event",
            Category::Definition => "definition",
            Category::VariableLocal => "variable-local",
            Category::VariableGlobal => "variable-global",
            Category::ListLocal => "list-local",
            Category::ListGlobal => "list-global",
            Category::Motion => "motion",
            Category::Looks => "looks",
            Category::SoundOp => "sound-op",
            Category::Control => "control",
            Category::Sensing => "sensing",
            Category::Operator => "operator",
            Category::Data => "data",
            Category::Extension => "extension",
            Category::Costume => "costume",
            Category::Sound => "sound",
            Category::Other => "other",
        }
    }
}

/// Opcode prefixes of the known extension palettes.
const EXTENSION_PREFIXES: &[&str] = &[
    "argument_",
    "music_",
    "pen_",
    "text2speech_",
    "translate_",
    "videoSensing_",
    "ev3_",
    "microbit_",
    "wedo2_",
    "boost_",
    "gdxfor_",
    "makeymakey_",
];

/// Classify an opcode into its category. Fixed prefix rules, first match wins.
pub fn classify(opcode: &str) -> Category {
    if opcode == "procedures_definition" {
        return Category::Definition;
    }
    if opcode == "event_whenflagclicked" {
        return Category::FlagEvent;
    }
    if opcode == "event_whenbroadcastreceived" {
        return Category::BroadcastReceive;
    }
    if opcode.starts_with("event_when") || opcode == "control_start_as_clone" {
        return Category::GenericEvent;
    }
    if opcode.starts_with("motion_") {
        return Category::Motion;
    }
    if opcode.starts_with("looks_") {
        return Category::Looks;
    }
    if opcode.starts_with("sound_") {
        return Category::SoundOp;
    }
    if opcode.starts_with("control_") {
        return Category::Control;
    }
    if opcode.starts_with("sensing_") {
        return Category::Sensing;
    }
    if opcode.starts_with("operator_") {
        return Category::Operator;
    }
    if opcode.starts_with("data_") {
        return Category::Data;
    }
    if EXTENSION_PREFIXES.iter().any(|p| opcode.starts_with(p)) {
        return Category::Extension;
    }
    Category::Other
}

/// Editor tab context: only the code tab extracts blocks; the costume and
/// sound tabs each produce one entity per asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    Code,
    Costumes,
    Sounds,
}

/// One raw extractor tuple; consumed by the index builder.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    pub category: Category,
    pub display_text: String,
    pub occurrence_id: String,
    pub sort_hint: f64,
    /// Category-specific payload: the event name for broadcast receivers.
    pub auxiliary: Option<String>,
}

/// Strip input placeholders (`%s`, `%b`, `%n`, `%d`) from a canonical block
/// text and collapse the leftover whitespace.
pub fn strip_placeholders(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' && matches!(chars.peek(), Some('s') | Some('b') | Some('n') | Some('d')) {
            chars.next();
        } else {
            cleaned.push(c);
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A label is meaningful unless it is empty, purely numeric, or purely a
/// run of `?` placeholder glyphs: those are literal input values that were
/// traversed as blocks, not labels anyone would search for.
pub fn is_meaningful_label(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if text.chars().all(|c| c == '?') {
        return false;
    }
    true
}

/// Render the human-readable label for a block.
///
/// Fixed labels for the control-flow headliners, "variable: NAME" /
/// "list: NAME" for the variable reporters and setters, the canonical
/// signature for procedure definitions/calls; everything else renders its
/// catalog text with placeholders stripped. Blocks outside the catalog show
/// their sole dropdown value (menus, argument reporters) or a text derived
/// from the opcode.
pub fn display_text(target: &Target, block: &Block) -> String {
    match block.opcode.as_str() {
        "control_if" => return "if then".to_string(),
        "control_if_else" => return "if then else".to_string(),
        "control_repeat" => return "repeat".to_string(),
        "control_forever" => return "forever".to_string(),
        "data_variable" | "data_setvariableto" | "data_changevariableby" => {
            if let Some(field) = block.field("VARIABLE") {
                return format!("variable: {}", field.value);
            }
        }
        "data_listcontents" => {
            if let Some(field) = block.field("LIST") {
                return format!("list: {}", field.value);
            }
        }
        "event_whenbroadcastreceived" => {
            if let Some(field) = block.field("BROADCAST_OPTION") {
                return format!("when I receive {}", field.value);
            }
        }
        "procedures_definition" => {
            let signature = definition_proccode(target, block).unwrap_or_default();
            return format!("define {}", strip_placeholders(&signature))
                .trim_end()
                .to_string();
        }
        "procedures_call" | "procedures_prototype" => {
            if let Some(proccode) = block
                .mutation
                .as_ref()
                .and_then(|m| m.proccode.as_deref())
            {
                return strip_placeholders(proccode);
            }
        }
        _ => {}
    }
    if let Some(text) = catalog::block_text(&block.opcode) {
        return strip_placeholders(text);
    }
    // Menus and argument reporters carry their visible text in their sole field.
    if block.fields.len() == 1 {
        if let Some(field) = block.fields.values().next() {
            return field.value.clone();
        }
    }
    catalog::derive_block_text(&block.opcode)
}

/// The canonical signature of a procedure definition, read from its
/// prototype child.
pub fn definition_proccode<'a>(target: &'a Target, definition: &Block) -> Option<&'a str> {
    let input = definition.input("custom_block")?;
    let InputValue::Block(prototype_id) = &input.value else {
        return None;
    };
    target
        .block(prototype_id)?
        .mutation
        .as_ref()?
        .proccode
        .as_deref()
}

/// Extract all raw entities for one target and tab.
pub fn extract_entities(project: &Project, target_idx: usize, tab: Tab) -> Vec<RawEntity> {
    let Some(target) = project.targets.get(target_idx) else {
        return Vec::new();
    };
    match tab {
        Tab::Code => extract_code_entities(project, target),
        Tab::Costumes => extract_asset_entities(&target.costumes, Category::Costume),
        Tab::Sounds => extract_asset_entities(&target.sounds, Category::Sound),
    }
}

fn extract_code_entities(project: &Project, target: &Target) -> Vec<RawEntity> {
    let mut out = Vec::new();

    for (id, block) in target.blocks_in_order() {
        if block.opcode.is_empty() || id == INVALID_BLOCK_ID {
            continue;
        }
        let text = display_text(target, block);
        if !is_meaningful_label(&text) {
            continue;
        }
        let category = classify(&block.opcode);
        let auxiliary = if block.opcode == "event_whenbroadcastreceived" {
            block.field("BROADCAST_OPTION").map(|f| f.value.clone())
        } else {
            None
        };
        out.push(RawEntity {
            category,
            display_text: text,
            occurrence_id: id.to_string(),
            sort_hint: target.sort_hint(id),
            auxiliary,
        });
    }

    // Variable and list tables: the edited target's own entries are the
    // local ones, the stage's are the project-global ones.
    let stage = project.stage();
    push_variable_entities(&mut out, Some(target), false);
    push_list_entities(&mut out, Some(target), false);
    if !target.is_stage {
        push_variable_entities(&mut out, stage, true);
        push_list_entities(&mut out, stage, true);
    }

    out
}

fn push_variable_entities(out: &mut Vec<RawEntity>, table_owner: Option<&Target>, global: bool) {
    let Some(owner) = table_owner else {
        return;
    };
    for (i, (id, var)) in owner.variables.iter().enumerate() {
        let (category, label) = if global || owner.is_stage {
            (Category::VariableGlobal, format!("global variable: {}", var.name))
        } else {
            (Category::VariableLocal, format!("variable: {}", var.name))
        };
        out.push(RawEntity {
            category,
            display_text: label,
            occurrence_id: id.clone(),
            sort_hint: i as f64,
            auxiliary: None,
        });
    }
}

fn push_list_entities(out: &mut Vec<RawEntity>, table_owner: Option<&Target>, global: bool) {
    let Some(owner) = table_owner else {
        return;
    };
    for (i, (id, list)) in owner.lists.iter().enumerate() {
        let (category, label) = if global || owner.is_stage {
            (Category::ListGlobal, format!("global list: {}", list.name))
        } else {
            (Category::ListLocal, format!("list: {}", list.name))
        };
        out.push(RawEntity {
            category,
            display_text: label,
            occurrence_id: id.clone(),
            sort_hint: i as f64,
            auxiliary: None,
        });
    }
}

fn extract_asset_entities(assets: &[crate::model::Asset], category: Category) -> Vec<RawEntity> {
    assets
        .iter()
        .enumerate()
        .map(|(i, asset)| RawEntity {
            category,
            display_text: asset.name.clone(),
            occurrence_id: asset.asset_id.clone(),
            sort_hint: i as f64,
            auxiliary: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exact_matches_win_over_prefixes() {
        assert_eq!(classify("procedures_definition"), Category::Definition);
        assert_eq!(classify("event_whenflagclicked"), Category::FlagEvent);
        assert_eq!(
            classify("event_whenbroadcastreceived"),
            Category::BroadcastReceive
        );
        assert_eq!(classify("event_whenkeypressed"), Category::GenericEvent);
        assert_eq!(classify("control_start_as_clone"), Category::GenericEvent);
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(classify("motion_movesteps"), Category::Motion);
        assert_eq!(classify("looks_say"), Category::Looks);
        assert_eq!(classify("sound_play"), Category::SoundOp);
        assert_eq!(classify("control_wait"), Category::Control);
        assert_eq!(classify("sensing_timer"), Category::Sensing);
        assert_eq!(classify("operator_add"), Category::Operator);
        assert_eq!(classify("data_addtolist"), Category::Data);
        assert_eq!(classify("pen_stamp"), Category::Extension);
        assert_eq!(classify("music_getTempo"), Category::Extension);
        assert_eq!(classify("event_broadcast"), Category::Other);
        assert_eq!(classify("procedures_call"), Category::Other);
    }

    #[test]
    fn test_category_rank_order() {
        assert!(Category::FlagEvent < Category::BroadcastReceive);
        assert!(Category::BroadcastReceive < Category::GenericEvent);
        assert!(Category::GenericEvent < Category::Definition);
        assert!(Category::Definition < Category::VariableLocal);
        assert!(Category::ListGlobal < Category::Motion);
        assert!(Category::Extension < Category::Other);
    }

    #[test]
    fn test_strip_placeholders() {
        assert_eq!(strip_placeholders("move %n steps"), "move steps");
        assert_eq!(strip_placeholders("glide %n secs to x: %n y: %n"), "glide secs to x: y:");
        assert_eq!(strip_placeholders("%s of %s"), "of");
        assert_eq!(strip_placeholders("100%"), "100%");
        assert_eq!(strip_placeholders(""), "");
    }

    #[test]
    fn test_meaningful_label() {
        assert!(is_meaningful_label("move steps"));
        assert!(is_meaningful_label("3.14"));
        assert!(!is_meaningful_label("42"));
        assert!(!is_meaningful_label("???"));
        assert!(!is_meaningful_label(""));
    }
}
