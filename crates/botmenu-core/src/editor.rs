//! In-memory menu editing session.
//!
//! The editor owns one tenant's [`Menu`] between a wholesale load and a
//! wholesale save. Nodes are addressed by [`MenuPath`] and every path is
//! re-resolved on each call. A path that no longer resolves aborts the
//! operation, leaves the tree untouched, and sends the selection back home.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::{Menu, MenuError, MenuNode, MenuOption, MenuPath, Submenu};

/// Text the editor fills in for new nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDefaults {
    pub option_title: String,
    pub submenu_text: String,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            option_title: crate::DEFAULT_OPTION_TITLE.to_string(),
            submenu_text: crate::DEFAULT_SUBMENU_TEXT.to_string(),
        }
    }
}

/// Editable text fields of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Response,
}

#[derive(Debug, Clone, Default)]
pub struct MenuEditor {
    menu: Menu,
    /// `None` is the home view (welcome text and top-level actions).
    selection: Option<MenuPath>,
    /// Branches the user folded in the tree. Everything else is expanded.
    collapsed: HashSet<MenuPath>,
    defaults: EditorDefaults,
}

impl MenuEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: EditorDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Replace the whole menu. `None` (fetch failed, tenant has no menu yet)
    /// loads an empty menu.
    pub fn load(&mut self, menu: Option<Menu>) {
        self.menu = menu.unwrap_or_default();
        self.selection = None;
        self.collapsed.clear();
        debug!(options = self.menu.options.len(), "loaded menu");
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn selection(&self) -> Option<&MenuPath> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<&MenuOption> {
        self.selection.as_ref().and_then(|p| self.menu.get(p))
    }

    /// The document the host's save flow submits.
    pub fn save_payload(&self) -> Menu {
        self.menu.clone()
    }

    pub fn select(&mut self, path: Option<MenuPath>) -> Result<(), MenuError> {
        match path {
            None => {
                self.selection = None;
                Ok(())
            }
            Some(path) if self.menu.get(&path).is_some() => {
                self.selection = Some(path);
                Ok(())
            }
            Some(path) => Err(self.stale(&path)),
        }
    }

    pub fn update_field(
        &mut self,
        path: &MenuPath,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), MenuError> {
        let node = self.resolve_mut(path)?.normalize();
        match field {
            Field::Title => node.set_title(value),
            Field::Response => node.set_response(value),
        }
        Ok(())
    }

    /// Append a default leaf to the root list (`None`) or to the submenu of
    /// the branch at `parent`, and select it.
    pub fn add_option(&mut self, parent: Option<&MenuPath>) -> Result<MenuPath, MenuError> {
        let option = MenuOption::Node(MenuNode::leaf(self.defaults.option_title.clone(), ""));

        let path = match parent {
            None => {
                self.menu.options.push(option);
                MenuPath::root(self.menu.options.len() - 1)
            }
            Some(parent) => {
                let Some(submenu) = self.resolve_mut(parent)?.submenu_mut() else {
                    return Err(MenuError::InvalidParent(parent.clone()));
                };
                submenu.options.push(option);
                let path = parent.child(submenu.options.len() - 1);
                self.collapsed.remove(parent);
                path
            }
        };

        debug!(path = %path, "added menu option");
        self.selection = Some(path.clone());
        Ok(path)
    }

    /// Remove the node at `path`; later siblings shift down by one. The
    /// selection always returns home, since any remembered path may now be
    /// off by one.
    pub fn remove_option(&mut self, path: &MenuPath) -> Result<MenuOption, MenuError> {
        if self.menu.get(path).is_none() {
            return Err(self.stale(path));
        }
        let (list, index) = self
            .menu
            .siblings_mut(path)
            .ok_or_else(|| MenuError::InvalidPath(path.clone()))?;
        let removed = list.remove(index);

        debug!(path = %path, "removed menu option");
        self.selection = None;
        self.collapsed.clear();
        Ok(removed)
    }

    /// Turn a leaf into a branch with an empty submenu. Its response is
    /// emptied; its title stays.
    pub fn convert_to_submenu(&mut self, path: &MenuPath) -> Result<(), MenuError> {
        let text = self.defaults.submenu_text.clone();
        let option = self.resolve_mut(path)?;
        if option.is_branch() {
            return Err(MenuError::AlreadyBranch(path.clone()));
        }

        let node = option.normalize();
        node.set_response("");
        node.submenu = Some(Submenu::new(text));
        debug!(path = %path, "converted option to submenu");
        Ok(())
    }

    pub fn set_welcome_text(&mut self, text: impl Into<String>) -> Result<(), MenuError> {
        if self.selection.is_some() {
            return Err(MenuError::NotAtHome);
        }
        self.menu.text = Some(Some(text.into()));
        Ok(())
    }

    pub fn is_expanded(&self, path: &MenuPath) -> bool {
        !self.collapsed.contains(path)
    }

    /// Fold or unfold a branch in the tree view. Selection is untouched.
    /// Returns the new state, or `None` if `path` is not a branch.
    pub fn toggle_expanded(&mut self, path: &MenuPath) -> Option<bool> {
        if !self.menu.get(path)?.is_branch() {
            return None;
        }
        if self.collapsed.remove(path) {
            Some(true)
        } else {
            self.collapsed.insert(path.clone());
            Some(false)
        }
    }

    fn resolve_mut(&mut self, path: &MenuPath) -> Result<&mut MenuOption, MenuError> {
        if self.menu.get(path).is_none() {
            return Err(self.stale(path));
        }
        self.menu
            .get_mut(path)
            .ok_or_else(|| MenuError::InvalidPath(path.clone()))
    }

    fn stale(&mut self, path: &MenuPath) -> MenuError {
        warn!(path = %path, "menu path no longer resolves; returning to home view");
        self.selection = None;
        MenuError::InvalidPath(path.clone())
    }
}
