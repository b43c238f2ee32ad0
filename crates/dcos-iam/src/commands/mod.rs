//! Command dispatch: one `Action` set shared by the menu and subcommands.

pub mod backups;
pub mod check;
pub mod config_cmd;
pub mod sync;
pub mod util;

use std::fmt;
use std::path::PathBuf;

use secrecy::ExposeSecret;
use tracing::{debug, info};

use dcos_iam_config::Config;
use dcos_iam_core::{
    BackupStore, BufferStore, CoreError, Direction, Orchestrator, Resource, SessionConfig,
};

use crate::cli::{BackupsCommand, Command, ConfigCommand, GlobalOpts, Target};
use crate::error::CliError;
use crate::interrupt::Interrupts;

// ── Actions ──────────────────────────────────────────────────────────

/// Everything the tool can do once a config is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Get(Target),
    Put(Target),
    Check(Resource),
    ListBackups,
    /// `None` prompts for a name.
    SaveBackup(Option<String>),
    /// `None` offers a selection of existing backups.
    LoadBackup(Option<String>),
    ShowConfig,
}

impl Action {
    /// The action a subcommand stands for. `None` for commands handled
    /// before a context exists (menu, init, completions).
    pub fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::Get { target } => Some(Self::Get(target)),
            Command::Put { target } => Some(Self::Put(target)),
            Command::Check { resource } => Some(Self::Check(resource)),
            Command::Backups(args) => Some(match args.command {
                BackupsCommand::List => Self::ListBackups,
                BackupsCommand::Save { name } => Self::SaveBackup(Some(name)),
                BackupsCommand::Load { name } => Self::LoadBackup(Some(name)),
            }),
            Command::Config(args) => match args.command {
                ConfigCommand::Show => Some(Self::ShowConfig),
                ConfigCommand::Init => None,
            },
            Command::Menu | Command::Completions(_) => None,
        }
    }

    /// Writes to the cluster or overwrites the buffer. Putting a read-only
    /// resource writes nothing.
    pub fn is_destructive(&self) -> bool {
        match self {
            Self::Put(Target::One(resource)) => resource.is_publishable(),
            Self::Put(Target::All) | Self::LoadBackup(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get(target) => write!(f, "GET {target}"),
            Self::Put(target) => write!(f, "PUT {target}"),
            Self::Check(resource) => write!(f, "CHECK {resource}"),
            Self::ListBackups => f.write_str("list backups"),
            Self::SaveBackup(Some(name)) => write!(f, "save backup '{name}'"),
            Self::SaveBackup(None) => f.write_str("save backup"),
            Self::LoadBackup(Some(name)) => write!(f, "load backup '{name}'"),
            Self::LoadBackup(None) => f.write_str("load backup"),
            Self::ShowConfig => f.write_str("show config"),
        }
    }
}

// ── Context ──────────────────────────────────────────────────────────

/// Loaded configuration plus the stores and (once logged in) the
/// orchestrator that actions run against.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub session: SessionConfig,
    pub buffer: BufferStore,
    pub backups: BackupStore,
    pub interrupts: Interrupts,
    orchestrator: Option<Orchestrator>,
}

impl Context {
    /// Load the config file, running the first-run wizard when it is
    /// missing and `interactive` allows prompting.
    pub fn load(global: &GlobalOpts, interactive: bool) -> Result<Self, CliError> {
        let path = global.config.clone();
        let config = match dcos_iam_config::load_config(&path) {
            Ok(config) => config,
            Err(dcos_iam_config::ConfigError::NotFound { .. }) if interactive => {
                eprintln!("No configuration at {}, creating one.", path.display());
                config_cmd::init(&path)?;
                dcos_iam_config::load_config(&path)?
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_config(path, apply_overrides(config, global))
    }

    fn from_config(config_path: PathBuf, config: Config) -> Result<Self, CliError> {
        let session = dcos_iam_config::to_session_config(&config)?;
        debug!(
            url = %session.url,
            data_dir = %session.data_dir.display(),
            "configuration loaded"
        );
        Ok(Self {
            config_path,
            buffer: BufferStore::new(&session.data_dir),
            backups: BackupStore::new(&session.backup_dir),
            config,
            session,
            interrupts: Interrupts::default(),
            orchestrator: None,
        })
    }

    pub fn orchestrator(&self) -> Option<&Orchestrator> {
        self.orchestrator.as_ref()
    }

    /// The logged-in orchestrator, connecting on first use.
    ///
    /// A stored token the cluster still accepts is reused; otherwise the
    /// credentials are exchanged for a new one.
    pub async fn connect(&mut self) -> Result<&mut Orchestrator, CliError> {
        if let Some(orch) = self.orchestrator.take() {
            return Ok(self.orchestrator.insert(orch));
        }
        let orch = match dcos_iam_core::resume(&self.session).await? {
            Some(client) => Orchestrator::from_session(&self.session, client),
            None => self.login().await?,
        };
        Ok(self.orchestrator.insert(orch))
    }

    /// Exchange credentials for a token and persist it. Nothing is written
    /// when the login fails.
    async fn login(&mut self) -> Result<Orchestrator, CliError> {
        let (client, token) =
            dcos_iam_core::login(&self.session)
                .await
                .map_err(|e| match e {
                    CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                        message,
                        config: self.config_path.display().to_string(),
                    },
                    other => other.into(),
                })?;

        let secret = token.expose_secret().to_owned();
        dcos_iam_config::update_config(&self.config_path, |cfg| {
            cfg.token = Some(secret.clone());
        })?;
        self.config = self.config.with_token(secret);
        self.session = self.session.with_token(token);
        info!(url = %self.session.url, "logged in, token stored");

        Ok(Orchestrator::from_session(&self.session, client))
    }
}

/// Command-line flags win over the file for this run only.
fn apply_overrides(mut config: Config, global: &GlobalOpts) -> Config {
    if let Some(dir) = &global.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(dir) = &global.backup_dir {
        config.backup_dir.clone_from(dir);
    }
    if global.insecure {
        config.insecure = true;
    }
    if let Some(secs) = global.timeout {
        config.timeout_secs = secs;
    }
    if let Some(n) = global.concurrency {
        config.concurrency = usize::from(n);
    }
    config
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Run one action against `ctx`.
pub async fn dispatch(
    action: Action,
    ctx: &mut Context,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    debug!(%action, "dispatching");
    match action {
        Action::Get(target) => sync::handle(ctx, Direction::Get, target, global).await,
        Action::Put(target) => sync::handle(ctx, Direction::Put, target, global).await,
        Action::Check(resource) => check::handle(ctx, resource, global),
        Action::ListBackups => backups::list(ctx, global),
        Action::SaveBackup(name) => backups::save(ctx, name, global),
        Action::LoadBackup(name) => backups::load(ctx, name, global),
        Action::ShowConfig => config_cmd::show(&ctx.config, global),
    }
}
