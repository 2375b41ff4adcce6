pub mod dispatch;
pub mod editor;
mod error;
pub mod path;
pub mod settings;
pub mod store;
pub mod view;

pub use error::MenuError;
pub use path::MenuPath;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Title given to options created from the editor.
pub const DEFAULT_OPTION_TITLE: &str = "Nueva Opción";
/// Prompt shown above the children of a freshly converted submenu.
pub const DEFAULT_SUBMENU_TEXT: &str = "Selecciona una opción:";

/// Legacy key some older menu documents use instead of `options`.
const LEGACY_OPTIONS_KEY: &str = "opciones";

// --- Types (matching the stored menu document) ---

/// A text field as stored: `None` when the key is absent, `Some(None)` for an
/// explicit `null`. Both read as empty text and are written back unchanged.
pub type StoredText = Option<Option<String>>;

fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StoredText, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

fn read_text(field: &StoredText) -> &str {
    field.as_ref().and_then(|t| t.as_deref()).unwrap_or("")
}

fn stored(text: impl Into<String>) -> StoredText {
    Some(Some(text.into()))
}

/// One entry of a menu. Older documents store plain leaf options as a bare
/// string; those stay as `Shorthand` until something edits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(untagged)]
pub enum MenuOption {
    Shorthand(String),
    Node(MenuNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct MenuNode {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub title: StoredText,
    /// Text the bot sends when a leaf is chosen. Emptied, not removed, when
    /// the node becomes a submenu.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub response: StoredText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submenu: Option<Submenu>,
    /// Keys we don't model (legacy `opciones`, host metadata). Kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Submenu {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub text: StoredText,
    #[serde(default)]
    pub options: Vec<MenuOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The root document: welcome text plus the top-level options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Menu {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub text: StoredText,
    #[serde(default)]
    pub options: Vec<MenuOption>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Leaf,
    Branch,
}

impl MenuNode {
    pub fn leaf(title: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            title: stored(title),
            response: stored(response),
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        read_text(&self.title)
    }

    pub fn response(&self) -> &str {
        read_text(&self.response)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = stored(title);
    }

    pub fn set_response(&mut self, response: impl Into<String>) {
        self.response = stored(response);
    }
}

impl Submenu {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: stored(text),
            ..Default::default()
        }
    }

    /// The prompt text, or `None` when the document has no `text` key.
    pub fn prompt(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.as_deref().unwrap_or(""))
    }
}

impl MenuOption {
    pub fn title(&self) -> &str {
        match self {
            MenuOption::Shorthand(title) => title,
            MenuOption::Node(node) => node.title(),
        }
    }

    pub fn response(&self) -> &str {
        match self {
            MenuOption::Shorthand(_) => "",
            MenuOption::Node(node) => node.response(),
        }
    }

    pub fn submenu(&self) -> Option<&Submenu> {
        match self {
            MenuOption::Shorthand(_) => None,
            MenuOption::Node(node) => node.submenu.as_ref(),
        }
    }

    pub fn submenu_mut(&mut self) -> Option<&mut Submenu> {
        match self {
            MenuOption::Shorthand(_) => None,
            MenuOption::Node(node) => node.submenu.as_mut(),
        }
    }

    pub fn is_branch(&self) -> bool {
        self.submenu().is_some()
    }

    pub fn kind(&self) -> NodeKind {
        if self.is_branch() {
            NodeKind::Branch
        } else {
            NodeKind::Leaf
        }
    }

    pub fn is_shorthand(&self) -> bool {
        matches!(self, MenuOption::Shorthand(_))
    }

    /// Rewrite shorthand into `{title, response: ""}` and hand back the node.
    /// Canonical nodes are returned untouched.
    pub fn normalize(&mut self) -> &mut MenuNode {
        if let MenuOption::Shorthand(title) = self {
            let title = std::mem::take(title);
            *self = MenuOption::Node(MenuNode::leaf(title, ""));
        }
        match self {
            MenuOption::Node(node) => node,
            MenuOption::Shorthand(_) => unreachable!("shorthand was rewritten above"),
        }
    }

    /// Children stored under the legacy `opciones` key, if any.
    pub fn legacy_options(&self) -> Option<Vec<MenuOption>> {
        match self {
            MenuOption::Shorthand(_) => None,
            MenuOption::Node(node) => legacy_options(&node.extra),
        }
    }
}

impl From<MenuNode> for MenuOption {
    fn from(node: MenuNode) -> Self {
        MenuOption::Node(node)
    }
}

impl Menu {
    pub fn with_options(text: impl Into<String>, options: Vec<MenuOption>) -> Self {
        Self {
            text: stored(text),
            options,
            ..Default::default()
        }
    }

    pub fn welcome_text(&self) -> &str {
        read_text(&self.text)
    }

    /// The welcome text, or `None` when the document has no `text` key.
    pub fn stored_welcome(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.as_deref().unwrap_or(""))
    }

    /// Resolve a path by walking submenu options from the root.
    pub fn get(&self, path: &MenuPath) -> Option<&MenuOption> {
        let (last, parents) = path.indices().split_last()?;
        let mut list = &self.options;
        for &i in parents {
            list = &list.get(i)?.submenu()?.options;
        }
        list.get(*last)
    }

    pub fn get_mut(&mut self, path: &MenuPath) -> Option<&mut MenuOption> {
        let (list, index) = self.siblings_mut(path)?;
        list.get_mut(index)
    }

    /// The list holding the node at `path`, and the node's index in it.
    pub fn siblings_mut(&mut self, path: &MenuPath) -> Option<(&mut Vec<MenuOption>, usize)> {
        let (&last, parents) = path.indices().split_last()?;
        let mut list = &mut self.options;
        for &i in parents {
            list = &mut list.get_mut(i)?.submenu_mut()?.options;
        }
        (last < list.len()).then_some((list, last))
    }

    /// Top-level options stored under the legacy `opciones` key, if any.
    pub fn legacy_options(&self) -> Option<Vec<MenuOption>> {
        legacy_options(&self.extra)
    }

    /// Total number of options in the tree, submenus included.
    pub fn count_options(&self) -> usize {
        fn count(options: &[MenuOption]) -> usize {
            options
                .iter()
                .map(|o| 1 + o.submenu().map(|s| count(&s.options)).unwrap_or(0))
                .sum()
        }
        count(&self.options)
    }
}

fn legacy_options(extra: &Map<String, Value>) -> Option<Vec<MenuOption>> {
    let raw = extra.get(LEGACY_OPTIONS_KEY)?;
    serde_json::from_value(raw.clone()).ok()
}

/// JSON Schema of the menu document, for hosts that validate before saving.
pub fn menu_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(Menu)).unwrap_or(Value::Null)
}
