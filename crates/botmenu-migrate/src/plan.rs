//! Turning an exported JSON dump into an ordered list of Firestore writes.
//!
//! Layout:
//! - `clients/{phone_number_id}`: the tenant record
//! - `clients/{id}/config/menu`: the tenant's menu, split out of the record
//! - `clients/{id}/knowledge`: knowledge entries, under the last migrated client
//! - `citas`: appointments

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::value::encode_fields;

const CLIENTS: &str = "clients";
const MENU_DOC: &str = "config/menu";
const KNOWLEDGE: &str = "knowledge";
const APPOINTMENTS: &str = "citas";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MigrationData {
    #[serde(default)]
    pub clients: Vec<Map<String, Value>>,
    #[serde(default)]
    pub knowledge: Vec<Map<String, Value>>,
    #[serde(default)]
    pub appointments: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Create or overwrite the document at this path.
    Document(String),
    /// Create a document with a generated id in this collection.
    Collection(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Document(path) => write!(f, "{}", path),
            Target::Collection(path) => write!(f, "{}/*", path),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    /// Human-readable name for logs.
    pub label: String,
    pub target: Target,
    /// Already encoded as Firestore `fields`.
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub writes: Vec<DocumentWrite>,
    pub skipped_clients: usize,
}

fn client_id(client: &Map<String, Value>) -> Option<String> {
    match client.get("phone_number_id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn client_label(client: &Map<String, Value>, id: &str) -> String {
    match client.get("name").and_then(Value::as_str) {
        Some(name) => format!("{} ({})", name, id),
        None => id.to_string(),
    }
}

pub fn plan(data: MigrationData) -> Plan {
    let mut plan = Plan::default();
    let mut last_client = None;

    for mut client in data.clients {
        let Some(id) = client_id(&client) else {
            warn!("skipping client without phone_number_id");
            plan.skipped_clients += 1;
            continue;
        };
        let label = client_label(&client, &id);
        let menu = client.remove("menu");

        plan.writes.push(DocumentWrite {
            label: label.clone(),
            target: Target::Document(format!("{}/{}", CLIENTS, id)),
            fields: encode_fields(&client),
        });
        if let Some(Value::Object(menu)) = menu {
            plan.writes.push(DocumentWrite {
                label: format!("menu of {}", label),
                target: Target::Document(format!("{}/{}/{}", CLIENTS, id, MENU_DOC)),
                fields: encode_fields(&menu),
            });
        }
        last_client = Some(id);
    }

    let Some(owner) = last_client else {
        if !data.knowledge.is_empty() || !data.appointments.is_empty() {
            warn!("no clients migrated; skipping knowledge and appointments");
        }
        return plan;
    };

    for entry in data.knowledge {
        let mut kept = Map::new();
        for key in ["content", "source_file"] {
            if let Some(v) = entry.get(key) {
                kept.insert(key.to_string(), v.clone());
            }
        }
        let label = entry
            .get("source_file")
            .and_then(Value::as_str)
            .unwrap_or("knowledge entry")
            .to_string();
        plan.writes.push(DocumentWrite {
            label,
            target: Target::Collection(format!("{}/{}/{}", CLIENTS, owner, KNOWLEDGE)),
            fields: encode_fields(&kept),
        });
    }

    for appointment in data.appointments {
        plan.writes.push(DocumentWrite {
            label: "appointment".to_string(),
            target: Target::Collection(APPOINTMENTS.to_string()),
            fields: encode_fields(&appointment),
        });
    }

    plan
}
