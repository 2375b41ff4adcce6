//! View models for the two editor panes: the navigable tree and the detail
//! panel of the selected node. Hosts draw these however they like.

use serde::Serialize;

use crate::editor::MenuEditor;
use crate::{MenuOption, MenuPath, NodeKind};

/// Label of the home row at the top of the tree.
pub const HOME_LABEL: &str = "Inicio";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub path: MenuPath,
    pub depth: usize,
    pub label: String,
    pub kind: NodeKind,
    pub selected: bool,
    pub expanded: bool,
    pub child_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub home_selected: bool,
    /// Depth-first; children of collapsed branches are left out.
    pub rows: Vec<TreeRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelAction {
    AddOption,
    AddChild,
    ConvertToSubmenu,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DetailPanel {
    Home {
        welcome_text: String,
        option_count: usize,
    },
    Leaf {
        path: MenuPath,
        title: String,
        response: String,
    },
    Branch {
        path: MenuPath,
        title: String,
        prompt: String,
        child_count: usize,
    },
}

impl DetailPanel {
    pub fn actions(&self) -> &'static [PanelAction] {
        match self {
            DetailPanel::Home { .. } => &[PanelAction::AddOption],
            DetailPanel::Leaf { .. } => &[PanelAction::ConvertToSubmenu, PanelAction::Delete],
            DetailPanel::Branch { .. } => &[PanelAction::AddChild, PanelAction::Delete],
        }
    }
}

/// Tree label for an option; untitled options show their position.
pub fn option_label(option: &MenuOption, index: usize) -> String {
    match option.title() {
        "" => format!("Opción {}", index + 1),
        title => title.to_string(),
    }
}

pub fn tree_view(editor: &MenuEditor) -> TreeView {
    let mut rows = Vec::new();
    push_rows(editor, &editor.menu().options, None, &mut rows);
    TreeView {
        home_selected: editor.selection().is_none(),
        rows,
    }
}

fn push_rows(
    editor: &MenuEditor,
    options: &[MenuOption],
    base: Option<&MenuPath>,
    rows: &mut Vec<TreeRow>,
) {
    for (index, option) in options.iter().enumerate() {
        let path = match base {
            Some(base) => base.child(index),
            None => MenuPath::root(index),
        };
        let children = option.submenu().map(|s| s.options.as_slice());
        let expanded = children.is_some() && editor.is_expanded(&path);

        rows.push(TreeRow {
            depth: path.depth() - 1,
            label: option_label(option, index),
            kind: option.kind(),
            selected: editor.selection() == Some(&path),
            expanded,
            child_count: children.map(|c| c.len()).unwrap_or(0),
            path: path.clone(),
        });

        if let (Some(children), true) = (children, expanded) {
            push_rows(editor, children, Some(&path), rows);
        }
    }
}

pub fn detail_panel(editor: &MenuEditor) -> DetailPanel {
    let selected = editor
        .selection()
        .and_then(|path| editor.menu().get(path).map(|option| (path, option)));

    match selected {
        None => DetailPanel::Home {
            welcome_text: editor.menu().welcome_text().to_string(),
            option_count: editor.menu().options.len(),
        },
        Some((path, option)) => match option.submenu() {
            Some(submenu) => DetailPanel::Branch {
                path: path.clone(),
                title: option.title().to_string(),
                prompt: submenu.prompt().unwrap_or_default().to_string(),
                child_count: submenu.options.len(),
            },
            None => DetailPanel::Leaf {
                path: path.clone(),
                title: option.title().to_string(),
                response: option.response().to_string(),
            },
        },
    }
}

/// Plain-text tree for terminal hosts.
pub fn render_tree_text(view: &TreeView) -> String {
    let mut out = String::with_capacity(64 + view.rows.len() * 32);
    out.push_str(if view.home_selected { "> " } else { "  " });
    out.push_str(HOME_LABEL);
    out.push('\n');

    for row in &view.rows {
        out.push_str(if row.selected { "> " } else { "  " });
        out.push_str(&"  ".repeat(row.depth + 1));
        out.push_str(match (row.kind, row.expanded) {
            (NodeKind::Leaf, _) => "• ",
            (NodeKind::Branch, true) => "▾ ",
            (NodeKind::Branch, false) => "▸ ",
        });
        out.push_str(&row.label);
        if row.kind == NodeKind::Branch {
            out.push_str(&format!(" ({})", row.child_count));
        }
        out.push_str("  [");
        out.push_str(&row.path.to_string());
        out.push_str("]\n");
    }
    out
}

pub fn render_panel_text(panel: &DetailPanel) -> String {
    let mut out = String::new();
    match panel {
        DetailPanel::Home {
            welcome_text,
            option_count,
        } => {
            out.push_str("Welcome message:\n");
            out.push_str(if welcome_text.is_empty() { "(empty)" } else { welcome_text.as_str() });
            out.push_str(&format!("\n{} top-level option(s)\n", option_count));
        }
        DetailPanel::Leaf {
            path,
            title,
            response,
        } => {
            out.push_str(&format!("Option {}: {}\n", path, title));
            out.push_str("Response:\n");
            out.push_str(if response.is_empty() { "(empty)" } else { response.as_str() });
            out.push('\n');
        }
        DetailPanel::Branch {
            path,
            title,
            prompt,
            child_count,
        } => {
            out.push_str(&format!("Submenu {}: {}\n", path, title));
            out.push_str(&format!("Prompt: {}\n", prompt));
            out.push_str(&format!("{} child option(s)\n", child_count));
        }
    }
    let actions: Vec<&str> = panel
        .actions()
        .iter()
        .map(|a| match a {
            PanelAction::AddOption => "add option",
            PanelAction::AddChild => "add child",
            PanelAction::ConvertToSubmenu => "convert to submenu",
            PanelAction::Delete => "delete",
        })
        .collect();
    out.push_str("Actions: ");
    out.push_str(&actions.join(", "));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn editor() -> MenuEditor {
        let mut editor = MenuEditor::new();
        editor.load(Some(
            serde_json::from_value(json!({
                "text": "Hola",
                "options": [
                    "Servicios",
                    {"title": "Ventas", "response": "", "submenu": {"text": "Elige:", "options": [
                        {"title": "", "response": "a"},
                        "Crédito"
                    ]}},
                    {"title": "FAQ", "response": "Ver web"}
                ]
            }))
            .unwrap(),
        ));
        editor
    }

    #[test]
    fn test_tree_rows_depth_first() {
        let view = tree_view(&editor());
        assert!(view.home_selected);
        let labels: Vec<&str> = view.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Servicios", "Ventas", "Opción 1", "Crédito", "FAQ"]);
        assert_eq!(view.rows[2].depth, 1);
        assert_eq!(view.rows[2].path, MenuPath::new(vec![1, 0]));
        assert_eq!(view.rows[1].kind, NodeKind::Branch);
        assert_eq!(view.rows[1].child_count, 2);
        assert!(view.rows[1].expanded);
        assert!(!view.rows[0].expanded);
    }

    #[test]
    fn test_tree_marks_selection() {
        let mut editor = editor();
        editor.select(Some(MenuPath::new(vec![1, 1]))).unwrap();
        let view = tree_view(&editor);
        assert!(!view.home_selected);
        let selected: Vec<&TreeRow> = view.rows.iter().filter(|r| r.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "Crédito");
    }

    #[test]
    fn test_collapsed_branch_hides_children() {
        let mut editor = editor();
        editor.toggle_expanded(&MenuPath::root(1));
        let view = tree_view(&editor);
        assert_eq!(view.rows.len(), 3);
        assert!(!view.rows[1].expanded);
        assert_eq!(view.rows[1].child_count, 2);
    }

    #[test]
    fn test_home_panel() {
        let panel = detail_panel(&editor());
        assert_eq!(
            panel,
            DetailPanel::Home {
                welcome_text: "Hola".to_string(),
                option_count: 3
            }
        );
        assert_eq!(panel.actions(), &[PanelAction::AddOption]);
    }

    #[test]
    fn test_leaf_and_branch_panels() {
        let mut editor = editor();
        editor.select(Some(MenuPath::root(0))).unwrap();
        let leaf = detail_panel(&editor);
        assert_eq!(
            leaf,
            DetailPanel::Leaf {
                path: MenuPath::root(0),
                title: "Servicios".to_string(),
                response: String::new()
            }
        );
        assert!(leaf.actions().contains(&PanelAction::ConvertToSubmenu));

        editor.select(Some(MenuPath::root(1))).unwrap();
        let branch = detail_panel(&editor);
        assert_eq!(
            branch,
            DetailPanel::Branch {
                path: MenuPath::root(1),
                title: "Ventas".to_string(),
                prompt: "Elige:".to_string(),
                child_count: 2
            }
        );
        assert_eq!(branch.actions(), &[PanelAction::AddChild, PanelAction::Delete]);
    }

    #[test]
    fn test_panel_serializes_for_hosts() {
        let mut editor = editor();
        editor.select(Some(MenuPath::new(vec![1, 0]))).unwrap();
        let value = serde_json::to_value(detail_panel(&editor)).unwrap();
        assert_eq!(
            value,
            json!({"panel": "leaf", "path": [1, "submenu", "options", 0], "title": "", "response": "a"})
        );
    }

    #[test]
    fn test_render_tree_text() {
        let mut editor = editor();
        editor.select(Some(MenuPath::root(2))).unwrap();
        let text = render_tree_text(&tree_view(&editor));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  Inicio");
        assert_eq!(lines[2], "    ▾ Ventas (2)  [1]");
        assert_eq!(lines[3], "      • Opción 1  [1.0]");
        assert_eq!(lines[5], ">   • FAQ  [2]");
    }

    #[test]
    fn test_render_panel_text() {
        let text = render_panel_text(&detail_panel(&editor()));
        assert!(text.starts_with("Welcome message:\nHola\n3 top-level option(s)"));
        assert!(text.ends_with("Actions: add option\n"));
    }
}
