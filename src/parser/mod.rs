//! Scratch `project.json` parser.
//!
//! Provides [`ProjectParser`] to load and parse Scratch project descriptions
//! into strongly-typed Rust structures. Sub-modules split the parser into
//! focused areas:
//!
//! - [`source`] – File I/O abstraction (filesystem vs. ZIP)
//! - [`helpers`] – JSON key access and scalar rendering
//!
//! The document is walked by hand rather than derived, so a malformed
//! variable, block or asset entry degrades to a warning and a skipped entry
//! instead of failing the whole project.

pub mod helpers;
pub mod source;

pub use helpers::*;
pub use source::*;

use crate::model::*;
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde_json::Value;

/// Core project parser. Generic over [`ContentSource`] so it can read from
/// the filesystem ([`FsSource`]) or from an `.sb3` archive ([`ZipSource`]).
pub struct ProjectParser<S: ContentSource> {
    source: S,
}

impl<S: ContentSource> ProjectParser<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Parse a `project.json` file into a [`Project`] and audit that the
    /// costume/sound payloads it references are actually present next to it.
    pub fn parse_project_file(&mut self, path: impl AsRef<Utf8Path>) -> Result<Project> {
        let path = path.as_ref();
        let text = self.source.read_to_string(path)?;
        let project =
            parse_project_json(&text).with_context(|| format!("Failed to parse {}", path))?;
        let base_dir: Utf8PathBuf = path.parent().map(|p| p.to_owned()).unwrap_or_default();
        self.audit_assets(&project, &base_dir);
        Ok(project)
    }

    /// Warn about referenced asset payloads missing from the source.
    /// Missing payloads never fail the parse; the model stays usable.
    fn audit_assets(&mut self, project: &Project, base_dir: &Utf8Path) {
        for target in &project.targets {
            for asset in target.costumes.iter().chain(target.sounds.iter()) {
                if let Some(md5ext) = &asset.md5ext {
                    let p = base_dir.join(md5ext);
                    if !self.source.contains(&p) {
                        eprintln!(
                            "[blockfind] Warning: asset '{}' of target '{}' is missing payload {}",
                            asset.name, target.name, md5ext
                        );
                    }
                }
            }
        }
    }
}

/// Parse the text of a `project.json` document.
pub fn parse_project_json(text: &str) -> Result<Project> {
    let doc: Value = serde_json::from_str(text).context("Failed to parse project JSON")?;
    let targets_value = doc
        .get("targets")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("No 'targets' array in project document"))?;

    let mut targets = Vec::new();
    for tv in targets_value {
        match parse_target(tv) {
            Ok(t) => targets.push(t),
            Err(err) => eprintln!("[blockfind] Warning: failed to parse target: {}", err),
        }
    }

    let extensions = doc
        .get("extensions")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();

    let meta = doc.get("meta").map(|m| Meta {
        semver: get_opt_string(m, "semver"),
        vm: get_opt_string(m, "vm"),
        agent: get_opt_string(m, "agent"),
    });

    Ok(Project {
        targets,
        extensions,
        meta,
    })
}

pub fn parse_target(node: &Value) -> Result<Target> {
    let name = get_str(node, "name")
        .ok_or_else(|| anyhow!("Target without a name"))?
        .to_string();
    let is_stage = get_bool(node, "isStage");

    let variables = node
        .get("variables")
        .map(|v| parse_variable_table(v, &name, false))
        .unwrap_or_default();
    let lists = node
        .get("lists")
        .map(|v| parse_variable_table(v, &name, true))
        .unwrap_or_default();
    let broadcasts = node
        .get("broadcasts")
        .map(parse_broadcast_table)
        .unwrap_or_default();
    let blocks = node
        .get("blocks")
        .map(|v| parse_block_table(v, &name))
        .unwrap_or_default();
    let costumes = node
        .get("costumes")
        .map(|v| parse_asset_list(v, &name, "costume"))
        .unwrap_or_default();
    let sounds = node
        .get("sounds")
        .map(|v| parse_asset_list(v, &name, "sound"))
        .unwrap_or_default();
    let current_costume = node
        .get("currentCostume")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    if let Some(obj) = node.as_object() {
        for key in obj.keys() {
            match key.as_str() {
                // Modeled above.
                "name" | "isStage" | "variables" | "lists" | "broadcasts" | "blocks"
                | "costumes" | "sounds" | "currentCostume" => {}
                // Standard presentation state the engine has no use for.
                "comments" | "volume" | "layerOrder" | "tempo" | "videoTransparency"
                | "videoState" | "textToSpeechLanguage" | "x" | "y" | "size" | "direction"
                | "draggable" | "rotationStyle" | "visible" => {}
                other => {
                    println!("Unknown key in target '{}': {}", name, other);
                }
            }
        }
    }

    Ok(Target {
        name,
        is_stage,
        variables,
        lists,
        broadcasts,
        blocks,
        costumes,
        sounds,
        current_costume,
    })
}

/// Parse a `variables` or `lists` table: id → `[name, value]`, with an
/// optional trailing cloud flag on variables.
fn parse_variable_table(node: &Value, target: &str, is_list: bool) -> IndexMap<String, Variable> {
    let mut out = IndexMap::new();
    let Some(obj) = node.as_object() else {
        return out;
    };
    for (id, entry) in obj {
        let Some(arr) = entry.as_array() else {
            eprintln!(
                "[blockfind] Warning: malformed variable entry '{}' in target '{}'",
                id, target
            );
            continue;
        };
        let Some(name) = arr.first().and_then(Value::as_str) else {
            eprintln!(
                "[blockfind] Warning: variable '{}' in target '{}' has no name",
                id, target
            );
            continue;
        };
        let value = if is_list {
            None
        } else {
            arr.get(1).map(scalar_to_string)
        };
        let is_cloud = arr.get(2).and_then(Value::as_bool).unwrap_or(false);
        out.insert(
            id.clone(),
            Variable {
                name: name.to_string(),
                value,
                is_cloud,
            },
        );
    }
    out
}

fn parse_broadcast_table(node: &Value) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    if let Some(obj) = node.as_object() {
        for (id, name) in obj {
            if let Some(n) = name.as_str() {
                out.insert(id.clone(), n.to_string());
            }
        }
    }
    out
}

/// Parse a `blocks` table. Entries are either full block objects or the
/// compact top-level reporter encoding (`[12, name, id, x, y]` for a
/// variable, `[13, …]` for a list) which decodes into a synthetic reporter
/// block so it participates in indexing and cross-reference.
fn parse_block_table(node: &Value, target: &str) -> IndexMap<String, Block> {
    let mut out = IndexMap::new();
    let Some(obj) = node.as_object() else {
        return out;
    };
    for (id, entry) in obj {
        let parsed = match entry {
            Value::Object(_) => parse_block_node(entry),
            Value::Array(_) => parse_reporter_primitive(entry),
            _ => Err(anyhow!("neither an object nor an array")),
        };
        match parsed {
            Ok(block) => {
                out.insert(id.clone(), block);
            }
            Err(err) => eprintln!(
                "[blockfind] Warning: skipping malformed block '{}' in target '{}': {}",
                id, target, err
            ),
        }
    }
    out
}

pub fn parse_block_node(node: &Value) -> Result<Block> {
    let opcode = get_str(node, "opcode").unwrap_or("").to_string();
    let next = get_opt_string(node, "next");
    let parent = get_opt_string(node, "parent");
    let shadow = get_bool(node, "shadow");
    let top_level = get_bool(node, "topLevel");
    let x = get_f64(node, "x");
    let y = get_f64(node, "y");

    let mut inputs = IndexMap::new();
    if let Some(obj) = node.get("inputs").and_then(Value::as_object) {
        for (name, slot) in obj {
            inputs.insert(name.clone(), parse_input_slot(slot));
        }
    }

    let mut fields = IndexMap::new();
    if let Some(obj) = node.get("fields").and_then(Value::as_object) {
        for (name, entry) in obj {
            fields.insert(name.clone(), parse_field(entry));
        }
    }

    let mutation = node.get("mutation").map(parse_mutation_node);

    Ok(Block {
        opcode,
        next,
        parent,
        inputs,
        fields,
        shadow,
        top_level,
        x,
        y,
        mutation,
    })
}

/// Input slot: `[1, inner]` shadow, `[2, inner]` plain, `[3, inner, shadow]`
/// block obscuring a shadow.
fn parse_input_slot(node: &Value) -> Input {
    let Some(arr) = node.as_array() else {
        return Input {
            value: InputValue::Empty,
            obscured: None,
        };
    };
    let value = arr.get(1).map(decode_input_value).unwrap_or(InputValue::Empty);
    // The third element is only an id when an inserted block hides a shadow;
    // an inline primitive there carries no reachable block.
    let obscured = arr.get(2).and_then(Value::as_str).map(String::from);
    Input { value, obscured }
}

fn decode_input_value(node: &Value) -> InputValue {
    match node {
        Value::Null => InputValue::Empty,
        Value::String(id) => InputValue::Block(id.clone()),
        Value::Array(prim) => decode_input_primitive(prim),
        other => {
            println!("Unknown input value shape: {}", other);
            InputValue::Empty
        }
    }
}

/// Inline primitives: `[4..8, num]` numbers, `[9, color]`, `[10, text]`,
/// `[11, name, id]` broadcast, `[12, name, id]` variable, `[13, name, id]` list.
fn decode_input_primitive(prim: &[Value]) -> InputValue {
    let kind = prim.first().and_then(Value::as_u64).unwrap_or(0);
    let text = prim.get(1).map(scalar_to_string).unwrap_or_default();
    let id = prim
        .get(2)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    match kind {
        4..=10 => InputValue::Literal(text),
        11 => InputValue::Broadcast { name: text, id },
        12 => InputValue::Variable { name: text, id },
        13 => InputValue::List { name: text, id },
        other => {
            println!("Unknown input primitive kind: {}", other);
            InputValue::Empty
        }
    }
}

/// Field entry: `[value]` or `[value, id]`.
fn parse_field(node: &Value) -> Field {
    match node {
        Value::Array(arr) => Field {
            value: arr.first().map(scalar_to_string).unwrap_or_default(),
            id: arr.get(1).and_then(Value::as_str).map(String::from),
        },
        other => Field {
            value: scalar_to_string(other),
            id: None,
        },
    }
}

fn parse_mutation_node(node: &Value) -> Mutation {
    let mut mutation = Mutation::default();
    if let Some(obj) = node.as_object() {
        for (key, value) in obj {
            match key.as_str() {
                "proccode" => mutation.proccode = value.as_str().map(String::from),
                "tagName" | "children" => {}
                other => {
                    mutation
                        .properties
                        .insert(other.to_string(), scalar_to_string(value));
                }
            }
        }
    }
    mutation
}

/// Compact top-level reporter: a bare `[12, name, id, x, y]` / `[13, …]`
/// entry in the blocks table.
fn parse_reporter_primitive(node: &Value) -> Result<Block> {
    let arr = node.as_array().ok_or_else(|| anyhow!("not an array"))?;
    let kind = arr.first().and_then(Value::as_u64).unwrap_or(0);
    let (opcode, field_name) = match kind {
        12 => ("data_variable", "VARIABLE"),
        13 => ("data_listcontents", "LIST"),
        other => return Err(anyhow!("unsupported reporter primitive kind {}", other)),
    };
    let name = arr
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("reporter primitive without a name"))?;
    let id = arr.get(2).and_then(Value::as_str).map(String::from);

    let mut fields = IndexMap::new();
    fields.insert(
        field_name.to_string(),
        Field {
            value: name.to_string(),
            id,
        },
    );

    Ok(Block {
        opcode: opcode.to_string(),
        next: None,
        parent: None,
        inputs: IndexMap::new(),
        fields,
        shadow: false,
        top_level: true,
        x: arr.get(3).and_then(Value::as_f64),
        y: arr.get(4).and_then(Value::as_f64),
        mutation: None,
    })
}

fn parse_asset_list(node: &Value, target: &str, kind: &str) -> Vec<Asset> {
    let mut out = Vec::new();
    let Some(arr) = node.as_array() else {
        return out;
    };
    for entry in arr {
        let Some(name) = get_str(entry, "name") else {
            eprintln!(
                "[blockfind] Warning: {} without a name in target '{}'",
                kind, target
            );
            continue;
        };
        let Some(asset_id) = get_str(entry, "assetId") else {
            eprintln!(
                "[blockfind] Warning: {} '{}' in target '{}' has no assetId",
                kind, name, target
            );
            continue;
        };
        out.push(Asset {
            name: name.to_string(),
            asset_id: asset_id.to_string(),
            md5ext: get_opt_string(entry, "md5ext"),
            data_format: get_opt_string(entry, "dataFormat"),
        });
    }
    out
}
