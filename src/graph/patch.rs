//! Graph view override state machine
//!
//! Each open graph view is either `Unpatched` (the host draws its own
//! graph) or `Patched` (renders go through [`GraphPatchController::render`],
//! which draws the folder-aware graph while the override is enabled and
//! falls back to the view's native render otherwise).
//!
//! The host never hands over its render function. Instead every view
//! implements [`GraphView`], and the host routes render requests for
//! patched views through the controller.

use std::collections::BTreeSet;

use super::model::{Graph, RenderOptions};
use crate::settings::SettingsSnapshot;

/// Host-assigned identity of a graph view
pub type ViewId = u64;

/// Replaces the graph a view displays
pub trait GraphDataSink {
    /// Replace the displayed graph wholesale
    fn set_graph(&mut self, graph: &Graph);

    /// Show an empty graph
    fn clear(&mut self) {
        self.set_graph(&Graph::default());
    }
}

/// One open graph view
pub trait GraphView: GraphDataSink {
    fn id(&self) -> ViewId;

    /// The host's own render of this view
    fn native_render(&mut self);

    /// Display options currently selected in the view
    fn render_options(&self) -> RenderOptions;
}

/// Produces the override graph for a set of render options
pub trait GraphSource {
    fn graph_for(&self, options: &RenderOptions) -> Graph;
}

impl<F> GraphSource for F
where
    F: Fn(&RenderOptions) -> Graph,
{
    fn graph_for(&self, options: &RenderOptions) -> Graph {
        self(options)
    }
}

/// Patch state of one view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    Unpatched,
    Patched,
}

/// Tracks which views are patched and routes their renders
#[derive(Debug, Default)]
pub struct GraphPatchController {
    patched: BTreeSet<ViewId>,
    override_enabled: bool,
}

impl GraphPatchController {
    pub fn new(settings: &SettingsSnapshot) -> Self {
        Self {
            patched: BTreeSet::new(),
            override_enabled: settings.graph_override,
        }
    }

    pub fn override_enabled(&self) -> bool {
        self.override_enabled
    }

    pub fn state(&self, id: ViewId) -> PatchState {
        if self.patched.contains(&id) {
            PatchState::Patched
        } else {
            PatchState::Unpatched
        }
    }

    /// Number of views currently patched
    pub fn patched_count(&self) -> usize {
        self.patched.len()
    }

    // === Transitions ===

    /// Patch a view; returns false if it was already patched
    ///
    /// With the override enabled the view is cleared and rendered once.
    pub fn patch(&mut self, view: &mut dyn GraphView, source: &dyn GraphSource) -> bool {
        let id = view.id();
        if !self.patched.insert(id) {
            return false;
        }
        log::debug!("graph view {} patched", id);

        if self.override_enabled {
            view.clear();
            self.render(view, source);
        }
        true
    }

    /// Restore a view's native rendering; returns false if it was not patched
    pub fn unpatch(&mut self, view: &mut dyn GraphView) -> bool {
        let id = view.id();
        if !self.patched.remove(&id) {
            return false;
        }
        log::debug!("graph view {} unpatched", id);
        view.clear();
        view.native_render();
        true
    }

    /// Re-scan the open views after a layout change
    ///
    /// Newly opened views are patched once; views that are gone are forgotten.
    pub fn on_layout_change(&mut self, views: &mut [Box<dyn GraphView>], source: &dyn GraphSource) {
        self.patched
            .retain(|id| views.iter().any(|v| v.id() == *id));
        for view in views.iter_mut() {
            self.patch(view.as_mut(), source);
        }
    }

    /// Restore every view (plugin unload)
    pub fn unpatch_all(&mut self, views: &mut [Box<dyn GraphView>]) {
        for view in views.iter_mut() {
            self.unpatch(view.as_mut());
        }
        self.patched.clear();
    }

    /// Pick up a new settings snapshot; redraws every view if the override flag toggled
    pub fn on_settings_update(
        &mut self,
        settings: &SettingsSnapshot,
        views: &mut [Box<dyn GraphView>],
        source: &dyn GraphSource,
    ) {
        if settings.graph_override == self.override_enabled {
            return;
        }
        self.override_enabled = settings.graph_override;
        self.redraw_all(views, source);
    }

    // === Rendering ===

    /// Render one view through the override when it is patched
    pub fn render(&self, view: &mut dyn GraphView, source: &dyn GraphSource) {
        if self.override_enabled && self.patched.contains(&view.id()) {
            let graph = source.graph_for(&view.render_options());
            view.set_graph(&graph);
        } else {
            view.native_render();
        }
    }

    /// Clear and render every view
    pub fn redraw_all(&self, views: &mut [Box<dyn GraphView>], source: &dyn GraphSource) {
        for view in views.iter_mut() {
            view.clear();
            self.render(view.as_mut(), source);
        }
    }
}
