use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ────────────────────────────────────────────────────────────────────────────
// ProjectDoc – binary serialization wrapper
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDoc {
    pub project: Project,
}

impl ProjectDoc {
    /// Save the ProjectDoc to a binary file with magic bytes and versioning.
    pub fn save_to_binary<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        std::io::Write::write_all(&mut writer, b"BLOCKFIND")?;
        std::io::Write::write_all(&mut writer, &1u32.to_le_bytes())?;
        bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        Ok(())
    }

    /// Load a ProjectDoc from a binary file, checking magic bytes and version.
    pub fn load_from_binary<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let mut magic = [0u8; 9];
        std::io::Read::read_exact(&mut reader, &mut magic)?;
        if &magic != b"BLOCKFIND" {
            anyhow::bail!("Invalid magic bytes: expected 'BLOCKFIND'");
        }
        let mut version_bytes = [0u8; 4];
        std::io::Read::read_exact(&mut reader, &mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != 1 {
            anyhow::bail!("Unsupported version: {}", version);
        }
        let doc: ProjectDoc =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;
        Ok(doc)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Project
// ────────────────────────────────────────────────────────────────────────────

/// A Scratch project: the stage plus all sprites, in file order.
///
/// Every map in the model is an [`IndexMap`] preserving the key order of
/// `project.json`; that order defines program traversal order and must not
/// be replaced by a hash order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub targets: Vec<Target>,
    /// Extension ids declared by the project (e.g. "pen", "music").
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Editor/VM versions recorded at save time.
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    pub semver: Option<String>,
    pub vm: Option<String>,
    pub agent: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Target
// ────────────────────────────────────────────────────────────────────────────

/// One actor of the project: the stage or a sprite.
///
/// `variables`, `lists`, `broadcasts` and `blocks` are keyed by their
/// serialized ids. The stage's variables and lists are the project-global
/// ones; broadcasts live on the stage only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub is_stage: bool,
    pub variables: IndexMap<String, Variable>,
    pub lists: IndexMap<String, Variable>,
    /// Broadcast id → broadcast (event) name.
    pub broadcasts: IndexMap<String, String>,
    pub blocks: IndexMap<String, Block>,
    pub costumes: Vec<Asset>,
    pub sounds: Vec<Asset>,
    /// Index into `costumes` of the currently shown costume.
    #[serde(default)]
    pub current_costume: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Serialized scalar value ("0", "hello"); lists keep `None` here.
    pub value: Option<String>,
    #[serde(default)]
    pub is_cloud: bool,
}

/// A costume or sound entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub asset_id: String,
    /// Payload file name inside the archive (e.g. "83a9…67.wav").
    pub md5ext: Option<String>,
    pub data_format: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Block
// ────────────────────────────────────────────────────────────────────────────

/// One block of a target's script graph.
///
/// `inputs` and `fields` preserve their serialized order. Shadow blocks
/// (dropdown menus and the like) are regular entries with `shadow` set;
/// they are reachable through their parent's input slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub opcode: String,
    /// Id of the block below this one in the script, if any.
    pub next: Option<String>,
    pub parent: Option<String>,
    pub inputs: IndexMap<String, Input>,
    pub fields: IndexMap<String, Field>,
    pub shadow: bool,
    pub top_level: bool,
    /// Canvas position; only top-level blocks carry one.
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Present on procedure definitions/prototypes/calls; carries the
    /// canonical procedure signature (`proccode`).
    #[serde(default)]
    pub mutation: Option<Mutation>,
}

impl Block {
    /// Ids of all variables and lists this block references, in slot order:
    /// variable/list dropdown fields first, then inline reporter inputs.
    pub fn referenced_variable_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for (name, field) in &self.fields {
            if name == "VARIABLE" || name == "LIST" {
                if let Some(id) = field.id.as_deref() {
                    ids.push(id);
                }
            }
        }
        for input in self.inputs.values() {
            match &input.value {
                InputValue::Variable { id, .. } | InputValue::List { id, .. } => {
                    ids.push(id.as_str())
                }
                _ => {}
            }
        }
        ids
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }
}

/// One input slot of a block: the active value plus the shadow block a
/// dragged-in reporter may be obscuring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub value: InputValue,
    /// Id of the obscured shadow block, when a non-shadow block covers one.
    #[serde(default)]
    pub obscured: Option<String>,
}

/// The serialized forms an input value can take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum InputValue {
    /// Reference to a child block (including shadow menu blocks).
    Block(String),
    /// Inline literal: number, text, color.
    Literal(String),
    /// Inline broadcast reference.
    Broadcast { name: String, id: String },
    /// Inline variable reporter.
    Variable { name: String, id: String },
    /// Inline list reporter.
    List { name: String, id: String },
    /// Empty slot.
    Empty,
}

/// A dropdown field: the shown value plus the id of the referenced
/// variable/list/broadcast where one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub value: String,
    pub id: Option<String>,
}

/// Procedure metadata (`mutation` in the serialization).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Mutation {
    /// Canonical procedure signature, e.g. "jump %s times".
    pub proccode: Option<String>,
    /// Remaining mutation attributes (argumentids, warp, …) in original order.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Traversal helpers
// ────────────────────────────────────────────────────────────────────────────

impl Target {
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All blocks in program order: top-level blocks in table order, each
    /// expanded depth-first through input children (active value first, then
    /// the obscured shadow) and the `next` chain.
    ///
    /// Blocks reachable from no script root (corrupt parent links) are not
    /// visited; a cycle in the graph is cut at the repeated id.
    pub fn blocks_in_order(&self) -> Vec<(&str, &Block)> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for (id, block) in &self.blocks {
            if block.top_level {
                self.push_subtree(id, &mut out, &mut seen);
            }
        }
        out
    }

    fn push_subtree<'a>(
        &'a self,
        id: &'a str,
        out: &mut Vec<(&'a str, &'a Block)>,
        seen: &mut HashSet<&'a str>,
    ) {
        if !seen.insert(id) {
            return;
        }
        let Some(block) = self.blocks.get(id) else {
            return;
        };
        out.push((id, block));
        for input in block.inputs.values() {
            if let InputValue::Block(child) = &input.value {
                self.push_subtree(child.as_str(), out, seen);
            }
            if let Some(shadow) = &input.obscured {
                self.push_subtree(shadow.as_str(), out, seen);
            }
        }
        if let Some(next) = &block.next {
            self.push_subtree(next.as_str(), out, seen);
        }
    }

    /// The top-level block owning `id`, following parent links.
    /// Returns `id` itself when it is already top-level.
    pub fn script_top<'a>(&'a self, id: &str) -> Option<(&'a str, &'a Block)> {
        let mut seen: HashSet<&str> = HashSet::new();
        let (mut cur_id, mut cur) = self.blocks.get_key_value(id)?;
        while !cur.top_level {
            if !seen.insert(cur_id) {
                return None;
            }
            let parent = cur.parent.as_deref()?;
            let (pid, pblock) = self.blocks.get_key_value(parent)?;
            cur_id = pid;
            cur = pblock;
        }
        Some((cur_id.as_str(), cur))
    }

    /// Vertical position used as a sort tiebreak: the owning script's canvas
    /// y coordinate, or 0 when the block floats free of any positioned root.
    pub fn sort_hint(&self, id: &str) -> f64 {
        self.script_top(id)
            .and_then(|(_, top)| top.y)
            .unwrap_or(0.0)
    }
}

impl Project {
    pub fn stage(&self) -> Option<&Target> {
        self.targets.iter().find(|t| t.is_stage)
    }

    /// Walk all blocks of all targets in program order, calling `cb` for
    /// every block.
    pub fn walk_blocks<F>(&self, cb: &mut F)
    where
        F: FnMut(usize, &Target, &str, &Block),
    {
        for (idx, target) in self.targets.iter().enumerate() {
            for (id, block) in target.blocks_in_order() {
                cb(idx, target, id, block);
            }
        }
    }

    /// Find all blocks with a given opcode, returning `(target index, block id)` pairs.
    pub fn find_blocks_by_opcode(&self, opcode: &str) -> Vec<(usize, String)> {
        let mut result = Vec::new();
        self.walk_blocks(&mut |idx, _target, id, block| {
            if block.opcode == opcode {
                result.push((idx, id.to_string()));
            }
        });
        result
    }
}
