//! File-backed menu store used when the editor runs outside the admin
//! console. One JSON document per tenant under `<root>/menus/`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::settings::Settings;
use crate::{Menu, MenuError, MenuNode, MenuOption};

/// Environment variable that moves the store away from `~/.botmenu`.
pub const HOME_ENV: &str = "BOTMENU_HOME";

const MENU_EXT: &str = "json";

#[derive(Debug, Clone)]
pub struct MenuStore {
    root: PathBuf,
}

impl MenuStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$BOTMENU_HOME`, else `~/.botmenu`.
    pub fn default_root() -> PathBuf {
        if let Some(dir) = std::env::var_os(HOME_ENV) {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".botmenu")
    }

    pub fn open_default() -> Self {
        Self::new(Self::default_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn menus_dir(&self) -> PathBuf {
        self.root.join("menus")
    }

    fn menu_path(&self, tenant: &str) -> Result<PathBuf, MenuError> {
        validate_tenant(tenant)?;
        Ok(self.menus_dir().join(format!("{}.{}", tenant, MENU_EXT)))
    }

    /// Tenant ids with a stored menu, sorted.
    pub fn list_menus(&self) -> Result<Vec<String>, MenuError> {
        let dir = self.menus_dir();
        if !dir.exists() {
            return Ok(vec![]);
        }
        let suffix = format!(".{}", MENU_EXT);
        let mut names: Vec<String> = fs::read_dir(&dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                name.strip_suffix(suffix.as_str()).map(|n| n.to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Raw stored document, `None` when the tenant has no menu yet.
    pub fn read_menu_raw(&self, tenant: &str) -> Result<Option<String>, MenuError> {
        let path = self.menu_path(tenant)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    pub fn read_menu(&self, tenant: &str) -> Result<Option<Menu>, MenuError> {
        match self.read_menu_raw(tenant)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Write through a temp file and rename, so readers never see a
    /// half-written menu.
    pub fn write_menu_raw(&self, tenant: &str, data: &str) -> Result<(), MenuError> {
        let path = self.menu_path(tenant)?;
        let dir = self.menus_dir();
        fs::create_dir_all(&dir)?;
        let tmp = dir.join(format!(".{}.{}.tmp", tenant, MENU_EXT));
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        debug!(tenant, "saved menu");
        Ok(())
    }

    pub fn write_menu(&self, tenant: &str, menu: &Menu) -> Result<(), MenuError> {
        let json = serde_json::to_string_pretty(menu)?;
        self.write_menu_raw(tenant, &json)
    }

    pub fn delete_menu(&self, tenant: &str) -> Result<(), MenuError> {
        let path = self.menu_path(tenant)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Missing or unreadable settings fall back to defaults.
    pub fn read_settings(&self) -> Settings {
        let path = self.settings_path();
        if !path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&path).map(|s| serde_json::from_str(&s)) {
            Ok(Ok(settings)) => settings,
            Ok(Err(e)) => {
                warn!(error = %e, "settings.json is not valid; using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "could not read settings.json; using defaults");
                Settings::default()
            }
        }
    }

    pub fn write_settings(&self, settings: &Settings) -> Result<(), MenuError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(self.settings_path(), json)?;
        Ok(())
    }
}

fn validate_tenant(tenant: &str) -> Result<(), MenuError> {
    let bad = tenant.trim().is_empty()
        || tenant.starts_with('.')
        || tenant.contains(['/', '\\'])
        || tenant.contains("..");
    if bad {
        Err(MenuError::InvalidTenant(tenant.to_string()))
    } else {
        Ok(())
    }
}

/// Turn whatever the backend returned into something the editor can load.
/// Absent or unparsable documents become the empty menu.
pub fn parse_menu_or_empty(raw: Option<&str>) -> Menu {
    let Some(raw) = raw else {
        return Menu::default();
    };
    match serde_json::from_str(raw) {
        Ok(menu) => menu,
        Err(e) => {
            warn!(error = %e, "stored menu is not valid; starting from an empty menu");
            Menu::default()
        }
    }
}

/// What the backend serves for a tenant that never saved a menu.
pub fn default_menu() -> Menu {
    Menu::with_options(
        "",
        ["Servicios", "Agendar Cita", "Contacto"]
            .into_iter()
            .map(|t| MenuOption::Shorthand(t.to_string()))
            .collect(),
    )
}

/// A ready-to-edit welcome menu for a new business.
pub fn starter_menu(business: &str) -> Menu {
    Menu::with_options(
        crate::dispatch::default_welcome(business),
        vec![
            MenuNode::leaf("Servicios", "Cuéntanos qué necesitas y te compartimos nuestros servicios.").into(),
            MenuNode::leaf("Agendar Cita", "Reserva tu espacio aquí: {{calendly_url}}").into(),
            MenuNode::leaf("Ubicación", "Escríbenos y te compartimos nuestra dirección.").into(),
        ],
    )
}
