//! CLI entry and dispatch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dashgate_core::api::{self, BackendConfig, HttpBackend};
use dashgate_core::config::{self, Config};
use dashgate_core::logging;
use dashgate_core::session_store::SessionStore;

mod commands;
mod prompt;

#[derive(Parser)]
#[command(name = "dashgate")]
#[command(version)]
#[command(about = "Dashboard server client: login, folders and datasource history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server base URL (overrides DASHGATE_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session cookie
    Login {
        /// Login name or email (prompted when omitted)
        #[arg(short, long)]
        user: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long, env = "DASHGATE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Email sent along with the login
        #[arg(long)]
        email: Option<String>,

        /// Password reset code; the password change uses the reset endpoint
        #[arg(long, value_name = "CODE")]
        code: Option<String>,
    },

    /// Log out and remove the stored session
    Logout,

    /// Search, create and pick dashboard folders
    Folders {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Browse and restore datasource versions
    Datasources {
        #[command(subcommand)]
        command: DatasourceCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum FolderCommands {
    /// List folders you can save into
    Search {
        /// Case-insensitive title filter
        #[arg(value_name = "QUERY", default_value = "")]
        query: String,
    },
    /// Create a folder
    Create {
        #[arg(value_name = "TITLE")]
        title: String,
    },
    /// Choose a folder interactively
    Pick(PickArgs),
}

/// Picker context, as a dashboard save dialog would provide it.
#[derive(clap::Args, Debug, Clone, Default)]
struct PickArgs {
    /// Folder currently holding the dashboard
    #[arg(long, value_name = "ID")]
    initial_id: Option<i64>,

    /// Title of the current folder, offered as a reset entry
    #[arg(long, value_name = "TITLE", default_value = "")]
    initial_title: String,

    /// Offer the current folder as a reset entry
    #[arg(long)]
    enable_reset: bool,

    /// Id of the dashboard being saved, if it exists
    #[arg(long, value_name = "ID")]
    dashboard_id: Option<i64>,
}

#[derive(clap::Subcommand)]
enum DatasourceCommands {
    /// List the saved versions of a datasource
    History {
        #[arg(value_name = "UID")]
        uid: String,
    },
    /// Show one version
    View {
        #[arg(value_name = "UID")]
        uid: String,
        #[arg(value_name = "VERSION")]
        version: String,
    },
    /// Restore a datasource to a saved version
    Restore {
        #[arg(value_name = "UID")]
        uid: String,
        #[arg(value_name = "VERSION")]
        version: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config from built-in defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, url } = cli;

    // config commands must work even when the file is broken
    if let Commands::Config { command } = command {
        return config_command(command);
    }

    let config = Config::load().context("load config")?;
    let _log_guard = logging::init(&config.log)?;
    let server = Server::resolve(url.as_deref(), &config)?;
    tracing::debug!(url = %server.url, "resolved server");

    match command {
        Commands::Login {
            user,
            password,
            email,
            code,
        } => {
            commands::auth::login(
                &server,
                &config,
                commands::auth::LoginArgs {
                    user,
                    password,
                    email,
                    code,
                },
            )
            .await
        }
        Commands::Logout => commands::auth::logout(&server).await,

        Commands::Folders { command } => match command {
            FolderCommands::Search { query } => {
                commands::folders::search(&server, &config, &query).await
            }
            FolderCommands::Create { title } => {
                commands::folders::create(&server, &config, &title).await
            }
            FolderCommands::Pick(args) => commands::folders::pick(&server, &config, &args).await,
        },

        Commands::Datasources { command } => match command {
            DatasourceCommands::History { uid } => {
                commands::datasources::history(&server, &uid).await
            }
            DatasourceCommands::View { uid, version } => {
                commands::datasources::view(&server, &uid, &version).await
            }
            DatasourceCommands::Restore { uid, version, yes } => {
                commands::datasources::restore(&server, &uid, &version, yes).await
            }
        },

        Commands::Config { command } => config_command(command),
    }
}

fn config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::Generate => commands::config::generate(),
    }
}

/// Resolved connection settings shared by the server-facing commands.
pub struct Server {
    pub url: String,
    timeout: Option<Duration>,
    store: SessionStore,
}

impl Server {
    fn resolve(flag_url: Option<&str>, config: &Config) -> Result<Self> {
        Ok(Self {
            url: api::resolve_base_url(flag_url, config.server.effective_url())?,
            timeout: config.server.timeout(),
            store: SessionStore::at(config::paths::session_path()),
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Backend carrying the stored session cookie for this server, if any.
    pub fn connect(&self) -> Result<HttpBackend> {
        let cookie = self.store.cookie_for(&self.url)?;
        self.backend(cookie)
    }

    /// Backend without any session cookie.
    pub fn connect_anonymous(&self) -> Result<HttpBackend> {
        self.backend(None)
    }

    fn backend(&self, cookie: Option<String>) -> Result<HttpBackend> {
        HttpBackend::new(BackendConfig {
            base_url: self.url.clone(),
            timeout: self.timeout,
            cookie,
        })
    }
}
