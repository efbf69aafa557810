//! FolderIndexEngine - host-facing orchestration
//!
//! Owns the vault snapshot, the settings channel and every live view, and
//! re-renders on each trigger:
//! - vault mutations (create, rename, delete)
//! - settings publishes
//! - layout changes (graph views opened or closed)
//!
//! Every trigger recomputes outputs from scratch; nothing is patched
//! incrementally.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::directive::OutlineDirective;
use crate::error::{Error, Result};
use crate::graph::{Graph, GraphModelBuilder, GraphPatchController, GraphView, RenderOptions, ViewId};
use crate::index_note::{self, IndexNoteAction};
use crate::markdown;
use crate::outline::OutlineRenderer;
use crate::settings::{SettingsChannel, SettingsSnapshot, Subscription};
use crate::vault::{split_path, VaultEvent, VaultSnapshot};

/// Handle of a mounted outline block
pub type OutlineId = u64;

// === OutlineView ===

/// One mounted `folder-index-content` block
#[derive(Debug, Clone)]
struct OutlineView {
    /// Document containing the block
    host_path: String,
    directive: OutlineDirective,
    output: String,
}

// === FolderIndexEngine ===

/// Core engine wiring the vault, settings and views together
pub struct FolderIndexEngine {
    vault: VaultSnapshot,
    settings: SettingsChannel,
    settings_changed: Rc<Cell<bool>>,
    _settings_subscription: Subscription,
    outlines: BTreeMap<OutlineId, OutlineView>,
    next_outline: OutlineId,
    graph: GraphPatchController,
    graph_views: Vec<Box<dyn GraphView>>,
    active: Option<String>,
}

impl FolderIndexEngine {
    /// Create an engine over a vault with an initial settings snapshot
    pub fn new(vault: VaultSnapshot, settings: SettingsSnapshot) -> Self {
        let graph = GraphPatchController::new(&settings);
        let channel = SettingsChannel::new(settings);
        let settings_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&settings_changed);
        let subscription = channel.subscribe(move |_| flag.set(true));

        Self {
            vault,
            settings: channel,
            settings_changed,
            _settings_subscription: subscription,
            outlines: BTreeMap::new(),
            next_outline: 0,
            graph,
            graph_views: Vec::new(),
            active: None,
        }
    }

    pub fn vault(&self) -> &VaultSnapshot {
        &self.vault
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Rc<SettingsSnapshot> {
        self.settings.current()
    }

    /// Handle for publishing settings from elsewhere; call [`sync`](Self::sync) afterwards
    pub fn settings_channel(&self) -> SettingsChannel {
        self.settings.clone()
    }

    // === Settings ===

    /// Publish a new snapshot and re-render everything
    pub fn update_settings(&mut self, settings: SettingsSnapshot) {
        self.settings.publish(settings);
        self.sync();
    }

    /// Re-render if a settings publish arrived since the last sync
    pub fn sync(&mut self) {
        if !self.settings_changed.replace(false) {
            return;
        }
        self.render_outlines();

        let settings = self.settings.current();
        let source = graph_source(&self.vault, &settings, self.active.as_deref());
        if settings.graph_override != self.graph.override_enabled() {
            self.graph
                .on_settings_update(&settings, &mut self.graph_views, &source);
        } else if self.graph.override_enabled() {
            // Exclusions and index names change the graph too
            self.graph.redraw_all(&mut self.graph_views, &source);
        }
    }

    // === Outlines ===

    /// Mount an outline block found in `host_path` and render it
    pub fn mount_outline(&mut self, host_path: &str, block: &str) -> OutlineId {
        let id = self.next_outline;
        self.next_outline += 1;

        let mut view = OutlineView {
            host_path: host_path.to_string(),
            directive: OutlineDirective::parse(block),
            output: String::new(),
        };
        view.output = render_outline(&self.vault, &self.settings.current(), &view);
        self.outlines.insert(id, view);
        id
    }

    /// Stop tracking an outline block
    pub fn unmount_outline(&mut self, id: OutlineId) -> bool {
        self.outlines.remove(&id).is_some()
    }

    /// Latest rendered text of an outline block
    pub fn outline(&self, id: OutlineId) -> Option<&str> {
        self.outlines.get(&id).map(|v| v.output.as_str())
    }

    /// Host document of an outline block
    pub fn outline_host(&self, id: OutlineId) -> Option<&str> {
        self.outlines.get(&id).map(|v| v.host_path.as_str())
    }

    fn render_outlines(&mut self) {
        let settings = self.settings.current();
        for view in self.outlines.values_mut() {
            view.output = render_outline(&self.vault, &settings, view);
        }
    }

    // === Vault Mutations ===

    /// Add or replace a document from its markdown source
    pub fn write_document(&mut self, path: &str, content: &str) -> Result<Vec<IndexNoteAction>> {
        let existed = self.vault.contains(path);
        self.vault.add_document(path, markdown::parse_document(content));
        if existed {
            self.refresh();
            return Ok(Vec::new());
        }
        self.on_vault_event(VaultEvent::Created {
            path: path.to_string(),
        })
    }

    /// Create a folder, planning its index note
    pub fn create_folder(&mut self, path: &str) -> Result<Vec<IndexNoteAction>> {
        self.vault.add_folder(path);
        self.on_vault_event(VaultEvent::Created {
            path: path.to_string(),
        })
    }

    /// Rename a document or folder
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<Vec<IndexNoteAction>> {
        self.vault.rename(old_path, new_path)?;
        self.on_vault_event(VaultEvent::Renamed {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
        })
    }

    /// Delete a document or folder
    pub fn delete(&mut self, path: &str) -> Result<Vec<IndexNoteAction>> {
        if !self.vault.delete(path) {
            return Err(Error::unresolved(path));
        }
        self.on_vault_event(VaultEvent::Deleted {
            path: path.to_string(),
        })
    }

    /// React to a mutation already applied to the vault
    ///
    /// Applies index-note follow-ups (auto-create, auto-rename) and
    /// re-renders every view. A conflicting follow-up is returned as an
    /// error after the views are refreshed; nothing is written for it.
    pub fn on_vault_event(&mut self, event: VaultEvent) -> Result<Vec<IndexNoteAction>> {
        let settings = self.settings.current();

        let planned = match &event {
            VaultEvent::Created { path } if self.vault.is_folder(path) => {
                index_note::plan_create(&self.vault, path, &settings)
            }
            VaultEvent::Renamed { old_path, new_path } => {
                self.rebase_hosts(old_path, new_path);
                index_note::plan_rename(&self.vault, old_path, new_path, &settings)
            }
            VaultEvent::Deleted { path } => {
                self.drop_hosts(path);
                Ok(None)
            }
            VaultEvent::Created { .. } => Ok(None),
        };

        let mut applied = Vec::new();
        let result = match planned {
            Ok(Some(action)) => self.apply(&action).map(|()| applied.push(action)),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        self.refresh();
        result.map(|()| applied)
    }

    fn apply(&mut self, action: &IndexNoteAction) -> Result<()> {
        match action {
            IndexNoteAction::CreateIndex { path, content } => {
                self.vault.add_document(path, markdown::parse_document(content));
                Ok(())
            }
            IndexNoteAction::RenameIndex { from, to } => {
                self.vault.rename(from, to)?;
                self.rebase_hosts(from, to);
                Ok(())
            }
        }
    }

    /// Follow renamed outline hosts
    fn rebase_hosts(&mut self, old_path: &str, new_path: &str) {
        for view in self.outlines.values_mut() {
            if let Some(rest) = view.host_path.strip_prefix(old_path) {
                if rest.is_empty() || rest.starts_with('/') {
                    view.host_path = format!("{}{}", new_path, rest);
                }
            }
        }
        if let Some(active) = &self.active {
            if let Some(rest) = active.strip_prefix(old_path) {
                if rest.is_empty() || rest.starts_with('/') {
                    self.active = Some(format!("{}{}", new_path, rest));
                }
            }
        }
    }

    /// Unmount outlines whose host was deleted
    fn drop_hosts(&mut self, path: &str) {
        self.outlines.retain(|_, view| {
            let (parent, _) = split_path(&view.host_path);
            view.host_path != path && parent != path && !parent.starts_with(&format!("{}/", path))
        });
    }

    /// Re-render every outline and graph view
    pub fn refresh(&mut self) {
        self.render_outlines();
        self.redraw_graphs();
    }

    // === Graph Views ===

    /// Set the focused document
    pub fn set_active(&mut self, path: Option<&str>) {
        self.active = path.map(str::to_string);
        self.redraw_graphs();
    }

    /// Build the override graph for `options`
    pub fn build_graph(&self, options: &RenderOptions) -> Graph {
        let settings = self.settings.current();
        let graph = graph_source(&self.vault, &settings, self.active.as_deref())(options);
        graph
    }

    /// Track a newly opened graph view
    pub fn open_graph_view(&mut self, view: Box<dyn GraphView>) {
        self.graph_views.push(view);
        self.on_layout_change();
    }

    /// Forget a closed graph view
    pub fn close_graph_view(&mut self, id: ViewId) {
        self.graph_views.retain(|v| v.id() != id);
        self.on_layout_change();
    }

    /// Patch views that appeared since the last layout change
    pub fn on_layout_change(&mut self) {
        let settings = self.settings.current();
        let source = graph_source(&self.vault, &settings, self.active.as_deref());
        self.graph.on_layout_change(&mut self.graph_views, &source);
    }

    /// Render a single graph view (the host's render entrypoint)
    pub fn render_graph_view(&mut self, id: ViewId) {
        let settings = self.settings.current();
        let source = graph_source(&self.vault, &settings, self.active.as_deref());
        if let Some(view) = self.graph_views.iter_mut().find(|v| v.id() == id) {
            self.graph.render(view.as_mut(), &source);
        }
    }

    fn redraw_graphs(&mut self) {
        let settings = self.settings.current();
        let source = graph_source(&self.vault, &settings, self.active.as_deref());
        self.graph.redraw_all(&mut self.graph_views, &source);
    }

    pub fn graph_controller(&self) -> &GraphPatchController {
        &self.graph
    }

    /// Restore every graph view's native rendering and drop all views
    pub fn unload(&mut self) {
        self.graph.unpatch_all(&mut self.graph_views);
        self.outlines.clear();
    }
}

/// The override graph for one vault state, as a render source
fn graph_source<'a>(
    vault: &'a VaultSnapshot,
    settings: &'a SettingsSnapshot,
    active: Option<&'a str>,
) -> impl Fn(&RenderOptions) -> Graph + 'a {
    move |options: &RenderOptions| GraphModelBuilder::new(vault, vault, settings).build(active, options)
}

fn render_outline(vault: &VaultSnapshot, settings: &SettingsSnapshot, view: &OutlineView) -> String {
    OutlineRenderer::new(vault, vault, settings)
        .with_directive(&view.directive)
        .render_for_document(&view.host_path)
}
