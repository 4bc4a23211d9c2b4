//! Per-action semantics.

use log::debug;

use super::PlanExecutor;
use crate::{
    error::{Result, StoreResultExt},
    models::{Action, ActionType},
    paths,
    store::bounded,
};

impl PlanExecutor {
    /// Applies one action, stashing prior content into `original_content`
    /// for modify and delete. Rollback reverses renames and moves through
    /// [`rename_pairs`].
    pub(crate) async fn apply_action(&self, root: &str, action: &mut Action) -> Result<()> {
        action.validate()?;
        let path = paths::resolve(root, &action.file_path);
        let timeout = self.config.action_timeout;

        match action.kind {
            ActionType::Create | ActionType::Modify => {
                if action.kind == ActionType::Modify {
                    action.original_content = bounded(timeout, self.store.read_file(&path))
                        .await
                        .ok();
                }
                let content = action.new_content.as_deref().unwrap_or_default();
                bounded(timeout, self.store.write_file(&path, content))
                    .await
                    .store_context(&format!("{} {path}", action.kind.as_str()))?;
                debug!("Wrote {path} ({} bytes)", content.len());
            }
            ActionType::Delete => {
                action.original_content = bounded(timeout, self.store.read_file(&path))
                    .await
                    .ok();
                bounded(timeout, self.store.delete(&path))
                    .await
                    .store_context(&format!("delete {path}"))?;
                debug!("Deleted {path}");
            }
            ActionType::Rename | ActionType::Move => {
                let target = paths::resolve(root, action.new_path.as_deref().unwrap_or_default());
                bounded(timeout, self.store.rename(&path, &target))
                    .await
                    .store_context(&format!("{} {path} -> {target}", action.kind.as_str()))?;
                debug!("Renamed {path} -> {target}");
            }
        }
        Ok(())
    }
}

/// Resolved paths a checkpoint for `actions` must cover.
pub(crate) fn checkpoint_paths(root: &str, actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .flat_map(|a| a.touched_paths())
        .map(|p| paths::resolve(root, p))
        .collect()
}

/// Resolved `(from, to)` pairs of the rename and move actions in `actions`.
pub(crate) fn rename_pairs(root: &str, actions: &[Action]) -> Vec<(String, String)> {
    actions
        .iter()
        .filter(|a| a.kind.needs_new_path())
        .filter_map(|a| {
            a.new_path
                .as_deref()
                .map(|to| (paths::resolve(root, &a.file_path), paths::resolve(root, to)))
        })
        .collect()
}
