mod session;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use botmenu_core::dispatch::{resolve_reply, ReplyContext};
use botmenu_core::settings::Settings;
use botmenu_core::store::{default_menu, starter_menu, MenuStore};
use botmenu_core::view::{detail_panel, tree_view};
use botmenu_core::MenuPath;
use botmenu_migrate::{FirestoreClient, FirestoreConfig, MigrationData};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::session::Edit;

#[derive(Parser, Debug)]
#[command(name = "botmenu", version, about = "Edit WhatsApp bot menus and migrate tenant records")]
struct Cli {
    /// Store directory (defaults to ~/.botmenu)
    #[arg(long, env = "BOTMENU_HOME", global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tenants with a stored menu
    List,
    /// Print a tenant's menu tree and detail panel
    Show {
        #[arg(short, long)]
        tenant: String,
        /// Node to open in the detail panel, e.g. 1.0
        #[arg(long)]
        select: Option<MenuPath>,
        /// Print the view models as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append a new option at the root or under a submenu
    Add {
        #[arg(short, long)]
        tenant: String,
        #[arg(long)]
        parent: Option<MenuPath>,
    },
    /// Remove an option and everything under it
    Remove {
        #[arg(short, long)]
        tenant: String,
        path: MenuPath,
    },
    /// Turn a leaf option into a submenu
    Convert {
        #[arg(short, long)]
        tenant: String,
        path: MenuPath,
    },
    /// Set an option's button title
    Title {
        #[arg(short, long)]
        tenant: String,
        path: MenuPath,
        text: String,
    },
    /// Set the text the bot sends for a leaf option
    Response {
        #[arg(short, long)]
        tenant: String,
        path: MenuPath,
        text: String,
    },
    /// Set the welcome message
    Welcome {
        #[arg(short, long)]
        tenant: String,
        text: String,
    },
    /// Create a menu for a tenant that has none
    Init {
        #[arg(short, long)]
        tenant: String,
        /// Business name for a starter welcome menu
        #[arg(long)]
        business: Option<String>,
        /// Overwrite an existing menu
        #[arg(long)]
        force: bool,
    },
    /// Delete a tenant's stored menu
    Delete {
        #[arg(short, long)]
        tenant: String,
    },
    /// Show how the bot would answer a message
    Reply {
        #[arg(short, long)]
        tenant: String,
        text: String,
        /// Tenant display name used in the default welcome
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        calendly: Option<String>,
    },
    /// Print the JSON Schema of the menu document
    Schema,
    /// Show or update the stored Firestore settings
    Config {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        database: Option<String>,
        /// Firestore REST endpoint, e.g. an emulator
        #[arg(long)]
        api_base: Option<String>,
    },
    /// Migrate an exported JSON dump into Firestore
    Migrate {
        file: PathBuf,
        #[arg(long, env = "BOTMENU_PROJECT")]
        project: Option<String>,
        #[arg(long, env = "BOTMENU_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Print the planned writes without sending them
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let store = cli
        .home
        .map(MenuStore::new)
        .unwrap_or_else(MenuStore::open_default);
    run(cli.command, &store).await
}

async fn run(command: Command, store: &MenuStore) -> Result<()> {
    let (tenant, edit) = match command {
        Command::List => {
            for name in store.list_menus()? {
                match store.read_menu(&name) {
                    Ok(Some(menu)) => println!("{}  ({} options)", name, menu.count_options()),
                    _ => println!("{}  (unreadable)", name),
                }
            }
            return Ok(());
        }
        Command::Show {
            tenant,
            select,
            json,
        } => {
            let mut editor = session::open(store, &tenant)?;
            editor
                .select(select)
                .with_context(|| format!("cannot select in menu of '{}'", tenant))?;
            if json {
                let views = serde_json::json!({
                    "tree": tree_view(&editor),
                    "panel": detail_panel(&editor),
                });
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print!("{}", session::render(&editor));
            }
            return Ok(());
        }
        Command::Init {
            tenant,
            business,
            force,
        } => {
            if !force && store.read_menu_raw(&tenant)?.is_some() {
                bail!("'{}' already has a menu; pass --force to replace it", tenant);
            }
            let menu = match business {
                Some(name) => starter_menu(&name),
                None => default_menu(),
            };
            store.write_menu(&tenant, &menu)?;
            info!(tenant = %tenant, "created menu");
            print!("{}", session::render(&session::open(store, &tenant)?));
            return Ok(());
        }
        Command::Delete { tenant } => {
            store.delete_menu(&tenant)?;
            info!(tenant = %tenant, "deleted menu");
            return Ok(());
        }
        Command::Reply {
            tenant,
            text,
            name,
            calendly,
        } => {
            let editor = session::open(store, &tenant)?;
            let ctx = ReplyContext {
                tenant_name: if name.is_empty() { tenant.as_str() } else { name.as_str() },
                calendly_url: calendly.as_deref(),
            };
            match resolve_reply(editor.menu(), &text, &ctx) {
                Some(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
                None => println!("No menu match; the message goes to the assistant."),
            }
            return Ok(());
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&botmenu_core::menu_schema())?);
            return Ok(());
        }
        Command::Config {
            project,
            token,
            database,
            api_base,
        } => {
            let mut settings = store.read_settings();
            let changed = project.is_some() || token.is_some() || database.is_some() || api_base.is_some();
            apply_overrides(&mut settings, project, token);
            if let Some(database) = database {
                settings.database = database;
            }
            if let Some(api_base) = api_base {
                settings.api_base = Some(api_base).filter(|b| !b.is_empty());
            }
            if changed {
                store.write_settings(&settings)?;
                info!(root = %store.root().display(), "saved settings");
            }
            print_settings(&settings);
            return Ok(());
        }
        Command::Migrate {
            file,
            project,
            token,
            dry_run,
        } => return run_migration(store, file, project, token, dry_run).await,

        Command::Add { tenant, parent } => (tenant, Edit::Add { parent }),
        Command::Remove { tenant, path } => (tenant, Edit::Remove(path)),
        Command::Convert { tenant, path } => (tenant, Edit::Convert(path)),
        Command::Title { tenant, path, text } => (tenant, Edit::Title(path, text)),
        Command::Response { tenant, path, text } => (tenant, Edit::Response(path, text)),
        Command::Welcome { tenant, text } => (tenant, Edit::Welcome(text)),
    };

    let editor = session::edit(store, &tenant, edit)
        .with_context(|| format!("failed to edit menu of '{}'", tenant))?;
    print!("{}", session::render(&editor));
    Ok(())
}

async fn run_migration(
    store: &MenuStore,
    file: PathBuf,
    project: Option<String>,
    token: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let data: MigrationData = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a migration dump", file.display()))?;
    let plan = botmenu_migrate::plan(data);

    if dry_run {
        for write in &plan.writes {
            println!("{}  {}", write.target, write.label);
        }
        println!(
            "{} write(s) planned, {} client(s) skipped",
            plan.writes.len(),
            plan.skipped_clients
        );
        return Ok(());
    }

    let mut settings = store.read_settings();
    apply_overrides(&mut settings, project, token);
    if !settings.migration_configured() {
        bail!("Firestore is not configured; run `botmenu config --project <id> --token <token>` or pass --project/--token");
    }
    let client = FirestoreClient::new(FirestoreConfig {
        project_id: settings.project_id,
        database: settings.database,
        access_token: settings.access_token,
        api_base: settings.api_base,
    })?;

    let report = botmenu_migrate::migrate(&client, &plan).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.failed > 0 {
        bail!("{} write(s) failed", report.failed);
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, project: Option<String>, token: Option<String>) {
    if let Some(project) = project {
        settings.project_id = project;
    }
    if let Some(token) = token {
        settings.access_token = token;
    }
}

fn print_settings(settings: &Settings) {
    let token = if settings.access_token.is_empty() { "(unset)" } else { "(set)" };
    println!("project:  {}", settings.project_id);
    println!("database: {}", settings.database);
    println!("token:    {}", token);
    if let Some(base) = &settings.api_base {
        println!("api base: {}", base);
    }
}
