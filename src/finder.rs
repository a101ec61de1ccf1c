//! Search session façade.
//!
//! [`Finder`] owns a parsed project plus the per-session state — the entity
//! index, the query matcher and the navigation cursor — and exposes the
//! operations a search panel drives: rebuild, filter, activate, step, close.
//!
//! The index is rebuilt and atomically replaced on every open and whenever
//! the edited target changes; a rebuild always resets the matcher and drops
//! the cursor back to idle, so the last build wins.

use crate::extract::Tab;
use crate::index::{self, Index};
use crate::model::Project;
use crate::navigate::{CursorState, FocusSink, NavigationCursor};
use crate::search::{FilteredView, Matcher};
use crate::xref;

pub struct Finder {
    project: Project,
    target: usize,
    tab: Tab,
    index: Index,
    matcher: Matcher,
    cursor: NavigationCursor,
}

impl Finder {
    /// Create a session over `project`, editing the first sprite (or the
    /// stage when the project has no sprite). No index is built yet; call
    /// [`Finder::rebuild_index`] when the panel opens.
    pub fn new(project: Project) -> Self {
        let target = project
            .targets
            .iter()
            .position(|t| !t.is_stage)
            .unwrap_or(0);
        Self {
            project,
            target,
            tab: Tab::Code,
            index: Index::default(),
            matcher: Matcher::new(),
            cursor: NavigationCursor::new(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Switch the edited target and rebuild for the current tab.
    pub fn set_target(&mut self, target: usize) {
        if target < self.project.targets.len() {
            self.target = target;
            self.rebuild_index(self.tab);
        }
    }

    /// Build a fresh index for `tab` and replace the previous one. The
    /// matcher forgets its last query and the cursor drops to idle.
    pub fn rebuild_index(&mut self, tab: Tab) {
        self.tab = tab;
        self.index = index::build_index(&self.project, self.target, tab);
        self.matcher.reset();
        self.cursor.close();
    }

    /// Filter the current index; recomputes only when the query changed.
    pub fn filter(&mut self, query: &str) -> &FilteredView {
        self.matcher.filter(&self.index, query)
    }

    /// Activate the entity at `entity` (an index position), resolving its
    /// occurrence locations and focusing the first one — or the preferred
    /// occurrence when given and present. Unknown positions and entities
    /// with no remaining location leave the cursor untouched.
    pub fn activate(
        &mut self,
        entity: usize,
        preferred_occurrence: Option<&str>,
        sink: &mut dyn FocusSink,
    ) -> &CursorState {
        let Some(e) = self.index.get(entity) else {
            return self.cursor.state();
        };
        let locations = xref::resolve_locations(&self.project, self.target, e);
        self.cursor.activate(entity, locations, preferred_occurrence, sink)
    }

    /// Step the active cursor by `delta`, cyclically.
    pub fn step(&mut self, delta: i64, sink: &mut dyn FocusSink) -> &CursorState {
        self.cursor.step(delta, sink)
    }

    pub fn cursor(&self) -> &CursorState {
        self.cursor.state()
    }

    /// Dismiss the panel: cursor to idle, matcher cleared.
    pub fn close(&mut self) {
        self.cursor.close();
        self.matcher.reset();
    }

    /// Position of the entity whose primary or alias occurrences include
    /// `id`. Drives "open the search focused on the block under the mouse".
    pub fn entity_matching_occurrence(&self, id: &str) -> Option<usize> {
        self.index
            .iter()
            .position(|e| e.matches_occurrence(id))
    }
}
