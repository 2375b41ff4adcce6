//! One command-line edit: load the tenant's menu, apply one editor
//! operation, save the whole document back.

use botmenu_core::editor::{Field, MenuEditor};
use botmenu_core::store::{parse_menu_or_empty, MenuStore};
use botmenu_core::view::{detail_panel, render_panel_text, render_tree_text, tree_view};
use botmenu_core::{MenuError, MenuPath};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Add { parent: Option<MenuPath> },
    Remove(MenuPath),
    Convert(MenuPath),
    Title(MenuPath, String),
    Response(MenuPath, String),
    Welcome(String),
}

/// Load a tenant's menu for viewing. A missing or unreadable menu opens as an
/// empty one.
pub fn open(store: &MenuStore, tenant: &str) -> Result<MenuEditor, MenuError> {
    let raw = match store.read_menu_raw(tenant) {
        Ok(raw) => raw,
        Err(e @ MenuError::InvalidTenant(_)) => return Err(e),
        Err(e) => {
            warn!(tenant, error = %e, "could not read menu; starting empty");
            None
        }
    };
    let mut editor = MenuEditor::new();
    editor.load(Some(parse_menu_or_empty(raw.as_deref())));
    Ok(editor)
}

pub fn apply(editor: &mut MenuEditor, edit: Edit) -> Result<(), MenuError> {
    match edit {
        Edit::Add { parent } => editor.add_option(parent.as_ref()).map(|_| ()),
        Edit::Remove(path) => editor.remove_option(&path).map(|_| ()),
        Edit::Convert(path) => {
            editor.convert_to_submenu(&path)?;
            editor.select(Some(path))
        }
        Edit::Title(path, text) => {
            editor.update_field(&path, Field::Title, text)?;
            editor.select(Some(path))
        }
        Edit::Response(path, text) => {
            editor.update_field(&path, Field::Response, text)?;
            editor.select(Some(path))
        }
        Edit::Welcome(text) => editor.set_welcome_text(text),
    }
}

/// Load a tenant's menu for editing. Only a missing menu opens empty; a stored
/// document that cannot be read or parsed is an error, so it is never
/// overwritten.
fn open_for_edit(store: &MenuStore, tenant: &str) -> Result<MenuEditor, MenuError> {
    let mut editor = MenuEditor::new();
    editor.load(store.read_menu(tenant)?);
    Ok(editor)
}

/// Open, apply, save. Nothing is written when the edit fails.
pub fn edit(store: &MenuStore, tenant: &str, edit: Edit) -> Result<MenuEditor, MenuError> {
    let mut editor = open_for_edit(store, tenant)?;
    apply(&mut editor, edit)?;
    store.write_menu(tenant, &editor.save_payload())?;
    Ok(editor)
}

pub fn render(editor: &MenuEditor) -> String {
    let mut out = render_tree_text(&tree_view(editor));
    out.push('\n');
    out.push_str(&render_panel_text(&detail_panel(editor)));
    out
}
