//! How the bot answers an incoming WhatsApp message from a tenant's menu.
//!
//! Resolution order: an option whose title matches the message anywhere in
//! the tree, then the menu keywords, then nothing (the host hands the message
//! to its assistant).

use serde::Serialize;
use tracing::debug;

use crate::{Menu, MenuOption};

/// WhatsApp allows at most this many reply buttons; longer choice lists are
/// sent as an interactive list.
pub const MAX_BUTTONS: usize = 3;

/// Messages that ask for the top-level menu.
pub const MENU_KEYWORDS: [&str; 5] = ["hola", "menu", "menú", "inicio", "opciones"];

const CALENDLY_PLACEHOLDER: &str = "{{calendly_url}}";
const QUICK_REPLIES_MARKER: &str = "[OPCIONES]:";
const BOOKING_TITLE: &str = "agendar cita";
const FALLBACK_PROMPT: &str = "Opciones:";
const FALLBACK_CHOICE: &str = "Opción";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Presentation {
    Buttons,
    List,
}

impl Presentation {
    pub fn for_count(count: usize) -> Self {
        if count > MAX_BUTTONS {
            Presentation::List
        } else {
            Presentation::Buttons
        }
    }
}

/// Tenant details that shape a reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyContext<'a> {
    pub tenant_name: &'a str,
    pub calendly_url: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BotReply {
    /// A branch was chosen: show its children.
    Submenu {
        prompt: String,
        heading: String,
        choices: Vec<String>,
        presentation: Presentation,
    },
    /// A leaf was chosen: send its response, plus any inline quick replies.
    Text {
        body: String,
        quick_replies: Vec<String>,
        presentation: Option<Presentation>,
    },
    /// A menu keyword: send the welcome text with the top-level options.
    Menu {
        text: String,
        choices: Vec<String>,
        presentation: Presentation,
    },
}

fn matches_title(title: &str, text: &str) -> bool {
    title.trim().to_lowercase() == text.trim().to_lowercase()
}

/// Depth-first search for the first option titled `text`, case-insensitively.
pub fn find_option(options: &[MenuOption], text: &str) -> Option<MenuOption> {
    for option in options {
        if matches_title(option.title(), text) {
            return Some(option.clone());
        }
        let found = match option.submenu() {
            Some(submenu) if !submenu.options.is_empty() => find_option(&submenu.options, text),
            _ => option
                .legacy_options()
                .and_then(|legacy| find_option(&legacy, text)),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Button text for an option. Only a node with no `title` key at all gets
/// the generic label; an empty or null title is sent as empty text.
fn choice_title(option: &MenuOption) -> String {
    match option {
        MenuOption::Node(node) if node.title.is_none() => FALLBACK_CHOICE.to_string(),
        _ => option.title().to_string(),
    }
}

pub fn resolve_reply(menu: &Menu, incoming: &str, ctx: &ReplyContext<'_>) -> Option<BotReply> {
    let matched = find_option(&menu.options, incoming).or_else(|| {
        menu.legacy_options()
            .and_then(|legacy| find_option(&legacy, incoming))
    });

    if let Some(MenuOption::Node(node)) = &matched {
        match &node.submenu {
            Some(submenu) if !submenu.options.is_empty() => {
                let choices: Vec<String> = submenu.options.iter().map(choice_title).collect();
                debug!(title = node.title(), choices = choices.len(), "matched submenu");
                return Some(BotReply::Submenu {
                    prompt: submenu.prompt().unwrap_or(FALLBACK_PROMPT).to_string(),
                    heading: node.title().to_string(),
                    presentation: Presentation::for_count(choices.len()),
                    choices,
                });
            }
            _ => {}
        }
        if !node.response().is_empty() {
            debug!(title = node.title(), "matched predefined response");
            return Some(text_reply(node.title(), node.response(), ctx));
        }
    }

    if MENU_KEYWORDS.contains(&incoming.trim().to_lowercase().as_str()) {
        // An absent and an empty `options` list both fall back to `opciones`.
        let options = if menu.options.is_empty() {
            menu.legacy_options().unwrap_or_default()
        } else {
            menu.options.clone()
        };
        if options.is_empty() {
            debug!("menu keyword but no options; leaving message to the assistant");
            return None;
        }
        let choices: Vec<String> = options.iter().map(choice_title).collect();
        return Some(BotReply::Menu {
            text: menu
                .stored_welcome()
                .map(str::to_string)
                .unwrap_or_else(|| default_welcome(ctx.tenant_name)),
            presentation: Presentation::for_count(choices.len()),
            choices,
        });
    }

    None
}

pub fn default_welcome(tenant_name: &str) -> String {
    format!("¡Hola! Bienvenid@ a {}. 👋\n\n¿En qué puedo ayudarte?", tenant_name)
}

fn text_reply(title: &str, response: &str, ctx: &ReplyContext<'_>) -> BotReply {
    let mut body = response.to_string();
    if let Some(url) = ctx.calendly_url.filter(|u| !u.is_empty()) {
        body = body.replace(CALENDLY_PLACEHOLDER, url);
        if title.to_lowercase().contains(BOOKING_TITLE) && !body.contains(url) {
            body.push_str("\n\nLink: ");
            body.push_str(url);
        }
    }

    let (body, quick_replies) = split_quick_replies(&body);
    let presentation = (!quick_replies.is_empty()).then(|| Presentation::for_count(quick_replies.len()));
    BotReply::Text {
        body,
        quick_replies,
        presentation,
    }
}

/// Split `"text [OPCIONES]: a | b"` into the text and its quick replies.
pub fn split_quick_replies(text: &str) -> (String, Vec<String>) {
    match text.split_once(QUICK_REPLIES_MARKER) {
        Some((body, rest)) => {
            let rest = rest.split(QUICK_REPLIES_MARKER).next().unwrap_or("");
            let replies = rest
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (body.trim().to_string(), replies)
        }
        None => (text.to_string(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn menu() -> Menu {
        serde_json::from_value(json!({
            "text": "Bienvenido a Salón RM",
            "options": [
                "Contacto",
                {"title": "Servicios", "response": "", "submenu": {"text": "¿Qué servicio?", "options": [
                    {"title": "Cortes", "response": "Dama y caballero."},
                    {"title": "Color", "response": "Tintes y luces. [OPCIONES]: Precios | Agendar Cita"},
                    "Peinados",
                    {"title": "Uñas", "response": "Manicure"}
                ]}},
                {"title": "Agendar Cita", "response": "Reserva aquí: {{calendly_url}}"},
                {"title": "Ubicación", "response": "Zona centro"},
                {"title": "Vacío", "response": "", "submenu": {"options": []}}
            ]
        }))
        .unwrap()
    }

    fn ctx() -> ReplyContext<'static> {
        ReplyContext {
            tenant_name: "Salón RM",
            calendly_url: Some("https://cal.example/rm"),
        }
    }

    #[test]
    fn test_find_option_is_case_insensitive_and_nested() {
        let menu = menu();
        assert_eq!(find_option(&menu.options, "  cortes ").unwrap().title(), "Cortes");
        assert_eq!(find_option(&menu.options, "UBICACIÓN").unwrap().title(), "Ubicación");
        assert!(find_option(&menu.options, "nada").is_none());
    }

    #[test]
    fn test_find_option_in_legacy_children() {
        let options: Vec<MenuOption> = serde_json::from_value(json!([
            {"title": "Viejo", "opciones": [{"title": "Hijo", "response": "ok"}]}
        ]))
        .unwrap();
        assert_eq!(find_option(&options, "hijo").unwrap().response(), "ok");
    }

    #[test]
    fn test_submenu_reply_uses_list_past_three() {
        let reply = resolve_reply(&menu(), "servicios", &ctx()).unwrap();
        assert_eq!(
            reply,
            BotReply::Submenu {
                prompt: "¿Qué servicio?".to_string(),
                heading: "Servicios".to_string(),
                choices: vec!["Cortes", "Color", "Peinados", "Uñas"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                presentation: Presentation::List,
            }
        );
    }

    #[test]
    fn test_text_reply() {
        let reply = resolve_reply(&menu(), "Cortes", &ctx()).unwrap();
        assert_eq!(
            reply,
            BotReply::Text {
                body: "Dama y caballero.".to_string(),
                quick_replies: vec![],
                presentation: None,
            }
        );
    }

    #[test]
    fn test_text_reply_with_quick_replies() {
        let reply = resolve_reply(&menu(), "color", &ctx()).unwrap();
        assert_eq!(
            reply,
            BotReply::Text {
                body: "Tintes y luces.".to_string(),
                quick_replies: vec!["Precios".to_string(), "Agendar Cita".to_string()],
                presentation: Some(Presentation::Buttons),
            }
        );
    }

    #[test]
    fn test_calendly_substitution() {
        let reply = resolve_reply(&menu(), "agendar cita", &ctx()).unwrap();
        match reply {
            BotReply::Text { body, .. } => assert_eq!(body, "Reserva aquí: https://cal.example/rm"),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_booking_link_appended_when_missing() {
        let menu = Menu::with_options(
            "Hola",
            vec![crate::MenuNode::leaf("Agendar cita", "Escríbenos").into()],
        );
        let reply = resolve_reply(&menu, "agendar cita", &ctx()).unwrap();
        match reply {
            BotReply::Text { body, .. } => {
                assert_eq!(body, "Escríbenos\n\nLink: https://cal.example/rm")
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_placeholder_kept_without_url() {
        let reply = resolve_reply(&menu(), "agendar cita", &ReplyContext::default()).unwrap();
        match reply {
            BotReply::Text { body, .. } => assert!(body.contains("{{calendly_url}}")),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_and_empty_matches_fall_through() {
        assert_eq!(resolve_reply(&menu(), "contacto", &ctx()), None);
        assert_eq!(resolve_reply(&menu(), "vacío", &ctx()), None);
        assert_eq!(resolve_reply(&menu(), "peinados", &ctx()), None);
    }

    #[test]
    fn test_menu_keyword() {
        let reply = resolve_reply(&menu(), " Hola ", &ctx()).unwrap();
        match reply {
            BotReply::Menu {
                text,
                choices,
                presentation,
            } => {
                assert_eq!(text, "Bienvenido a Salón RM");
                assert_eq!(choices.len(), 5);
                assert_eq!(choices[0], "Contacto");
                assert_eq!(presentation, Presentation::List);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_menu_keyword_default_welcome_and_legacy_root() {
        let menu: Menu = serde_json::from_value(json!({"opciones": ["Uno", "Dos"]})).unwrap();
        let reply = resolve_reply(&menu, "menú", &ctx()).unwrap();
        assert_eq!(
            reply,
            BotReply::Menu {
                text: default_welcome("Salón RM"),
                choices: vec!["Uno".to_string(), "Dos".to_string()],
                presentation: Presentation::Buttons,
            }
        );
    }

    #[test]
    fn test_menu_keyword_without_options() {
        assert_eq!(resolve_reply(&Menu::default(), "hola", &ctx()), None);
    }

    #[test]
    fn test_generic_choice_label_only_for_missing_title() {
        let menu: Menu = serde_json::from_value(json!({
            "options": [
                {"title": "Más", "response": "", "submenu": {"options": [
                    {"response": "a"},
                    {"title": "", "response": "b"},
                    {"title": null, "response": "c"}
                ]}}
            ]
        }))
        .unwrap();
        match resolve_reply(&menu, "más", &ctx()).unwrap() {
            BotReply::Submenu { prompt, choices, .. } => {
                assert_eq!(prompt, "Opciones:");
                assert_eq!(choices, vec!["Opción".to_string(), String::new(), String::new()]);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_null_welcome_is_sent_as_is() {
        let menu: Menu = serde_json::from_value(json!({"text": null, "options": ["Uno"]})).unwrap();
        match resolve_reply(&menu, "hola", &ctx()).unwrap() {
            BotReply::Menu { text, .. } => assert_eq!(text, ""),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_split_quick_replies() {
        assert_eq!(
            split_quick_replies("Hola [OPCIONES]: a | | b "),
            ("Hola".to_string(), vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(split_quick_replies("sin marcador"), ("sin marcador".to_string(), vec![]));
    }

    #[test]
    fn test_presentation_threshold() {
        assert_eq!(Presentation::for_count(3), Presentation::Buttons);
        assert_eq!(Presentation::for_count(4), Presentation::List);
    }
}
