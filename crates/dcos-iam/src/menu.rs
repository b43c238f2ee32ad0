//! Interactive menu.
//!
//! Single-key commands resolved through a registry built once from
//! [`MenuCommand`]. Every entry except exit maps onto an [`Action`], so the
//! menu runs exactly what the subcommands run.

use std::collections::HashMap;

use dialoguer::Input;
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

use dcos_iam_core::{Direction, Resource};

use crate::cli::{GlobalOpts, Target};
use crate::commands::{self, Action, Context, util};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum MenuCommand {
    GetUsers,
    GetGroups,
    GetAcls,
    GetLdap,
    GetServiceGroups,
    GetAgents,
    GetAll,
    PutUsers,
    PutGroups,
    PutAcls,
    PutLdap,
    PutServiceGroups,
    PutAll,
    CheckUsers,
    CheckGroups,
    CheckAcls,
    CheckLdap,
    CheckServiceGroups,
    CheckAgents,
    ListBackups,
    SaveBackup,
    LoadBackup,
    ShowConfig,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Get,
    Put,
    Check,
    Other,
}

impl Section {
    fn title(self) -> &'static str {
        match self {
            Self::Get => "GET  cluster -> buffer",
            Self::Put => "PUT  buffer -> cluster",
            Self::Check => "CHECK  buffer contents",
            Self::Other => "BACKUPS / CONFIG",
        }
    }
}

impl MenuCommand {
    pub fn key(self) -> char {
        match self {
            Self::GetUsers => '1',
            Self::GetGroups => '2',
            Self::GetAcls => '3',
            Self::GetLdap => '4',
            Self::GetServiceGroups => '5',
            Self::GetAgents => '6',
            Self::GetAll => '0',
            Self::PutUsers => 'q',
            Self::PutGroups => 'w',
            Self::PutAcls => 'e',
            Self::PutLdap => 'r',
            Self::PutServiceGroups => 't',
            Self::PutAll => 'p',
            Self::CheckUsers => 'a',
            Self::CheckGroups => 's',
            Self::CheckAcls => 'd',
            Self::CheckLdap => 'f',
            Self::CheckServiceGroups => 'g',
            Self::CheckAgents => 'h',
            Self::ListBackups => 'l',
            Self::SaveBackup => 'k',
            Self::LoadBackup => 'o',
            Self::ShowConfig => 'c',
            Self::Exit => 'x',
        }
    }

    /// `None` for exit, which the loop handles itself.
    pub fn action(self) -> Option<Action> {
        let get = |r| Action::Get(Target::One(r));
        let put = |r| Action::Put(Target::One(r));
        Some(match self {
            Self::GetUsers => get(Resource::Users),
            Self::GetGroups => get(Resource::Groups),
            Self::GetAcls => get(Resource::Acls),
            Self::GetLdap => get(Resource::Ldap),
            Self::GetServiceGroups => get(Resource::ServiceGroups),
            Self::GetAgents => get(Resource::Agents),
            Self::GetAll => Action::Get(Target::All),
            Self::PutUsers => put(Resource::Users),
            Self::PutGroups => put(Resource::Groups),
            Self::PutAcls => put(Resource::Acls),
            Self::PutLdap => put(Resource::Ldap),
            Self::PutServiceGroups => put(Resource::ServiceGroups),
            Self::PutAll => Action::Put(Target::All),
            Self::CheckUsers => Action::Check(Resource::Users),
            Self::CheckGroups => Action::Check(Resource::Groups),
            Self::CheckAcls => Action::Check(Resource::Acls),
            Self::CheckLdap => Action::Check(Resource::Ldap),
            Self::CheckServiceGroups => Action::Check(Resource::ServiceGroups),
            Self::CheckAgents => Action::Check(Resource::Agents),
            Self::ListBackups => Action::ListBackups,
            Self::SaveBackup => Action::SaveBackup(None),
            Self::LoadBackup => Action::LoadBackup(None),
            Self::ShowConfig => Action::ShowConfig,
            Self::Exit => return None,
        })
    }

    fn section(self) -> Section {
        match self.action() {
            Some(Action::Get(_)) => Section::Get,
            Some(Action::Put(_)) => Section::Put,
            Some(Action::Check(_)) => Section::Check,
            _ => Section::Other,
        }
    }

    /// The (resource, direction) whose state is shown next to this entry.
    fn tracked(self) -> Option<(Resource, Direction)> {
        match self.action()? {
            Action::Get(Target::One(r)) => Some((r, Direction::Get)),
            Action::Put(Target::One(r)) => Some((r, Direction::Put)),
            _ => None,
        }
    }

    fn label(self) -> String {
        match self.action() {
            Some(Action::Get(Target::One(r)) | Action::Put(Target::One(r)) | Action::Check(r)) => {
                r.label().to_owned()
            }
            Some(Action::Get(Target::All) | Action::Put(Target::All)) => "ALL".to_owned(),
            Some(other) => other.to_string(),
            None => "exit (deletes the buffer)".to_owned(),
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────

/// Hotkey → command, built once per session.
pub struct Registry {
    by_key: HashMap<char, MenuCommand>,
}

impl Registry {
    pub fn build() -> Self {
        Self {
            by_key: MenuCommand::iter().map(|c| (c.key(), c)).collect(),
        }
    }

    /// Look up trimmed, case-insensitive single-character input.
    pub fn resolve(&self, input: &str) -> Option<MenuCommand> {
        let mut chars = input.trim().chars();
        let key = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        self.by_key.get(&key).copied()
    }
}

// ── Loop ────────────────────────────────────────────────────────────

fn render_menu(ctx: &Context, color: bool) -> String {
    let mut out = String::new();
    let mut current = None;
    for command in MenuCommand::iter() {
        let section = command.section();
        if current != Some(section) {
            out.push_str(&format!("\n{}\n", section.title()));
            current = Some(section);
        }
        let state = match (command.tracked(), ctx.orchestrator()) {
            (Some((resource, direction)), Some(orch)) => {
                output::paint_state(orch.state().get(resource, direction), color)
            }
            _ => String::new(),
        };
        out.push_str(&format!("  {}  {:<20} {state}\n", command.key(), command.label()));
    }
    out
}

/// Log in, start from an empty buffer and serve commands until exit.
pub async fn run(ctx: &mut Context, global: &GlobalOpts) -> Result<(), CliError> {
    let registry = Registry::build();
    let color = output::should_color(global.color);

    // Login failure is fatal here; there is nothing to offer without a token.
    ctx.connect().await?;
    ctx.buffer.reset()?;
    info!(dir = %ctx.buffer.dir().display(), "buffer reset");

    loop {
        println!("{}", render_menu(ctx, color));
        let input: String = Input::new()
            .with_prompt("command")
            .allow_empty(true)
            .interact_text()
            .map_err(util::prompt_err)?;
        if input.trim().is_empty() {
            continue;
        }

        let Some(command) = registry.resolve(&input) else {
            eprintln!("Unknown command '{}'", input.trim());
            continue;
        };

        let Some(action) = command.action() else {
            if util::confirm("Exit and delete the buffer?", global.yes)? {
                ctx.buffer.destroy()?;
                info!("buffer deleted");
                return Ok(());
            }
            continue;
        };

        if !util::confirm(&format!("{action}?"), global.yes)? {
            continue;
        }
        if let Err(err) = commands::dispatch(action, ctx, global).await {
            eprintln!("{:?}", miette::Report::new(err));
        }
    }
}
