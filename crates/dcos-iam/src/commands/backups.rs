//! Named backup handlers.

use dialoguer::{Input, Select};
use tabled::Tabled;

use dcos_iam_core::BackupInfo;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Modified")]
    modified: String,
}

impl From<&BackupInfo> for BackupRow {
    fn from(b: &BackupInfo) -> Self {
        Self {
            name: b.name.clone(),
            files: b.files,
            modified: b.modified.map_or_else(String::new, |t| {
                t.format("%Y-%m-%d %H:%M").to_string()
            }),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn list(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let backups = ctx.backups.list()?;
    if backups.is_empty() && !global.quiet {
        eprintln!("No backups in {}", ctx.backups.dir().display());
        return Ok(());
    }
    let out = output::render_list(global.output, &backups, |b| BackupRow::from(b), |b| b.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn save(ctx: &Context, name: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Backup name")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    dcos_iam_core::store::backup::validate_name(&name)?;

    let exists = ctx.backups.list()?.iter().any(|b| b.name == name);
    if exists && !util::confirm(&format!("Backup '{name}' exists. Overwrite?"), global.yes)? {
        return Ok(());
    }

    let files = ctx.backups.save(&name, &ctx.buffer)?;
    if !global.quiet {
        eprintln!("Saved {files} buffer file(s) to backup '{name}'");
    }
    Ok(())
}

pub fn load(ctx: &Context, name: Option<String>, global: &GlobalOpts) -> Result<(), CliError> {
    let name = match name {
        Some(name) => name,
        None => {
            let backups = ctx.backups.list()?;
            if backups.is_empty() {
                return Err(CliError::NotFound {
                    what: "Backup".into(),
                    hint: "Save one first: dcos-iam backups save <name>".into(),
                });
            }
            let names: Vec<&str> = backups.iter().map(|b| b.name.as_str()).collect();
            let choice = Select::new()
                .with_prompt("Backup to load")
                .items(&names)
                .default(0)
                .interact()
                .map_err(util::prompt_err)?;
            backups
                .get(choice)
                .map_or_else(String::new, |b| b.name.clone())
        }
    };

    let files = ctx.backups.load(&name, &ctx.buffer)?;
    if !global.quiet {
        eprintln!("Loaded {files} file(s) from backup '{name}' into the buffer");
    }
    Ok(())
}
