use blockfind::extract::{Category, Tab};
use blockfind::finder::Finder;
use blockfind::model::Project;
use blockfind::navigate::{CursorState, FocusSink};
use blockfind::parser::parse_project_json;
use blockfind::xref::Location;

/// Sink recording focused occurrence ids.
#[derive(Default)]
struct Recorder(Vec<String>);

impl FocusSink for Recorder {
    fn focus(&mut self, location: &Location) {
        self.0.push(location.id.clone());
    }
}

fn fixture() -> Project {
    parse_project_json(
        r#"{
  "targets": [
    {
      "isStage": true,
      "name": "Stage",
      "variables": { "gv": ["score", 0] },
      "lists": {},
      "broadcasts": { "b1": "go" },
      "blocks": {},
      "currentCostume": 0, "costumes": [], "sounds": []
    },
    {
      "isStage": false,
      "name": "Player",
      "variables": {},
      "lists": {},
      "broadcasts": {},
      "blocks": {
        "flag1": {
          "opcode": "event_whenflagclicked",
          "next": "mv1", "parent": null,
          "inputs": {}, "fields": {},
          "shadow": false, "topLevel": true, "x": 0, "y": 0
        },
        "mv1": {
          "opcode": "motion_movesteps",
          "next": "mv2", "parent": "flag1",
          "inputs": { "STEPS": [1, [4, 10]] }, "fields": {},
          "shadow": false, "topLevel": false
        },
        "mv2": {
          "opcode": "motion_movesteps",
          "next": null, "parent": "mv1",
          "inputs": { "STEPS": [1, [4, 10]] }, "fields": {},
          "shadow": false, "topLevel": false
        },
        "mv3": {
          "opcode": "motion_movesteps",
          "next": null, "parent": null,
          "inputs": { "STEPS": [1, [4, 30]] }, "fields": {},
          "shadow": false, "topLevel": true, "x": 0, "y": 100
        },
        "setv": {
          "opcode": "data_setvariableto",
          "next": null, "parent": null,
          "inputs": { "VALUE": [1, [4, 0]] },
          "fields": { "VARIABLE": ["score", "gv"] },
          "shadow": false, "topLevel": true, "x": 0, "y": 200
        }
      },
      "currentCostume": 0,
      "costumes": [
        { "name": "stand", "assetId": "aaa", "md5ext": "aaa.svg", "dataFormat": "svg" }
      ],
      "sounds": []
    }
  ],
  "extensions": [],
  "meta": null
}"#,
    )
    .unwrap()
}

#[test]
fn test_defaults_to_first_sprite() {
    let finder = Finder::new(fixture());
    assert_eq!(finder.target(), 1);
}

#[test]
fn test_activate_deduplicated_blocks_cycles_aliases() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    let mut sink = Recorder::default();

    let view = finder.filter("move").clone();
    assert_eq!(view.matches.len(), 1);
    let entity_pos = view.matches[0].entity;
    assert_eq!(
        finder.index().entities[entity_pos].occurrence_count(),
        3
    );

    finder.activate(entity_pos, None, &mut sink);
    finder.step(1, &mut sink);
    finder.step(1, &mut sink);
    finder.step(1, &mut sink);
    assert_eq!(sink.0, vec!["mv1", "mv2", "mv3", "mv1"]);
}

#[test]
fn test_activate_with_preferred_occurrence() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    let mut sink = Recorder::default();

    let entity_pos = finder.entity_matching_occurrence("mv2").unwrap();
    finder.activate(entity_pos, Some("mv2"), &mut sink);
    assert_eq!(sink.0, vec!["mv2"]);
    match finder.cursor() {
        CursorState::Active { position, .. } => assert_eq!(*position, 1),
        CursorState::Idle => panic!("cursor must be active"),
    }
}

#[test]
fn test_variable_entity_navigates_to_uses() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    let mut sink = Recorder::default();

    let pos = finder
        .index()
        .iter()
        .position(|e| e.category == Category::VariableGlobal)
        .unwrap();
    finder.activate(pos, None, &mut sink);
    // The only block referencing the global variable.
    assert_eq!(sink.0, vec!["setv"]);
}

#[test]
fn test_activation_without_locations_is_noop() {
    let mut project = fixture();
    // A second global variable no block refers to.
    project.targets[0].variables.insert(
        "gv2".to_string(),
        blockfind::model::Variable {
            name: "unused".to_string(),
            value: Some("0".to_string()),
            is_cloud: false,
        },
    );
    let mut finder = Finder::new(project);
    finder.rebuild_index(Tab::Code);
    let mut sink = Recorder::default();

    let pos = finder
        .index()
        .iter()
        .position(|e| e.display_text == "global variable: unused")
        .unwrap();
    finder.activate(pos, None, &mut sink);
    assert_eq!(finder.cursor(), &CursorState::Idle);
    assert!(sink.0.is_empty());
}

#[test]
fn test_rebuild_drops_cursor_and_query() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    let mut sink = Recorder::default();

    let entity_pos = finder.entity_matching_occurrence("mv1").unwrap();
    finder.activate(entity_pos, None, &mut sink);
    assert!(matches!(finder.cursor(), CursorState::Active { .. }));

    finder.rebuild_index(Tab::Code);
    assert_eq!(finder.cursor(), &CursorState::Idle);
    // The view is recomputed rather than served from the stale cache.
    assert_eq!(finder.filter("move").matches.len(), 1);
}

#[test]
fn test_costume_tab_session() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Costumes);
    assert_eq!(finder.index().len(), 1);
    let mut sink = Recorder::default();
    finder.activate(0, None, &mut sink);
    assert_eq!(sink.0, vec!["aaa"]);
}

#[test]
fn test_entity_matching_occurrence_covers_aliases() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    let by_primary = finder.entity_matching_occurrence("mv1");
    let by_alias = finder.entity_matching_occurrence("mv3");
    assert_eq!(by_primary, by_alias);
    assert_eq!(finder.entity_matching_occurrence("nope"), None);
}

#[test]
fn test_close_returns_to_idle() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    let mut sink = Recorder::default();
    let entity_pos = finder.entity_matching_occurrence("mv1").unwrap();
    finder.activate(entity_pos, None, &mut sink);
    finder.close();
    assert_eq!(finder.cursor(), &CursorState::Idle);
}

#[test]
fn test_set_target_rebuilds_for_stage() {
    let mut finder = Finder::new(fixture());
    finder.rebuild_index(Tab::Code);
    assert!(finder.index().len() > 1);
    finder.set_target(0);
    // The stage has no blocks; only the global variable remains.
    assert_eq!(finder.index().len(), 1);
    assert_eq!(
        finder.index().entities[0].category,
        Category::VariableGlobal
    );
}
