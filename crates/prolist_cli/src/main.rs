//! Terminal front-end for the professional roster.
//!
//! # Responsibility
//! - Gate access behind the static access code.
//! - Map list/add/edit/delete/import commands onto `RosterService`.
//! - Wait for every write before exiting so changes outlive the process.
//!
//! # Invariants
//! - Storage problems never stop a command: an unusable database is logged
//!   and the session runs against an in-memory store instead.
//! - Failed writes are logged, never printed.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use prolist_core::{
    core_version, init_logging, shared_store, AccessGate, AppConfig, ConfigError, GateError,
    KvStore, Professional, ProfessionalId, RosterError, RosterService, SqliteKvStore, StoreError,
    WriteHandle,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "prolist", version, about = "Professional roster")]
struct Cli {
    /// Access code; prompted on stdin when omitted.
    #[arg(long, global = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List professionals in insertion order.
    List,
    /// Add a professional.
    Add { first_name: String, last_name: String },
    /// Rename an existing professional.
    Edit {
        id: ProfessionalId,
        first_name: String,
        last_name: String,
    },
    /// Delete a professional after confirmation.
    Delete {
        id: ProfessionalId,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Import `Prénom,Nom` lines from a CSV or text file.
    Import { file: PathBuf },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Mot de passe incorrect")]
    Gate(#[from] GateError),
    #[error("failed to prepare data directory `{}`: {source}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", user_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    let gate = AccessGate::new(config.access_code.clone());
    let password = match cli.password {
        Some(password) => password,
        None => prompt("Mot de passe : ")?,
    };
    gate.verify(&password)?;

    let store = open_store_or_memory(&config.db_path).await?;
    let service = RosterService::open(store, config.dataset_key.clone()).await;

    match cli.command {
        Command::List => print_list(&service.professionals()),
        Command::Add {
            first_name,
            last_name,
        } => {
            let applied = service.add(&first_name, &last_name)?;
            println!("Ajouté : {} ({})", applied.value.display_name(), applied.value.id);
            await_write(applied.write).await;
        }
        Command::Edit {
            id,
            first_name,
            last_name,
        } => {
            let applied = service.edit(id, &first_name, &last_name)?;
            println!("Modifié : {} ({})", applied.value.display_name(), applied.value.id);
            await_write(applied.write).await;
        }
        Command::Delete { id, yes } => {
            let Some(target) = service.get(id) else {
                return Err(RosterError::NotFound(id).into());
            };
            if !yes && !confirm(&format!(
                "Êtes-vous sûr de vouloir supprimer {} ? [o/N] ",
                target.display_name()
            ))? {
                println!("Suppression annulée.");
                return Ok(());
            }
            if let Some(applied) = service.delete(id) {
                println!("Supprimé : {}", applied.value.display_name());
                await_write(applied.write).await;
            }
        }
        Command::Import { file } => {
            let applied = service.import_file(&file).await?;
            println!("{} professionnel(s) importé(s).", applied.value);
            await_write(applied.write).await;
        }
    }

    Ok(())
}

async fn open_persistent(db_path: &Path) -> Result<Arc<SqliteKvStore>, CliError> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CliError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(shared_store(db_path).await?)
}

/// Opens the database at `db_path`, falling back to a session-only
/// in-memory store when it cannot be used.
async fn open_store_or_memory(db_path: &Path) -> Result<Arc<dyn KvStore>, CliError> {
    match open_persistent(db_path).await {
        Ok(store) => Ok(store as Arc<dyn KvStore>),
        Err(err) => {
            error!(
                "event=store_open module=cli status=error fallback=memory path={} error={}",
                db_path.display(),
                err
            );
            let store: Arc<dyn KvStore> = Arc::new(SqliteKvStore::open_in_memory().await?);
            Ok(store)
        }
    }
}

fn print_list(professionals: &[Professional]) {
    if professionals.is_empty() {
        println!("Aucun professionnel enregistré");
        println!("Commencez par ajouter votre premier professionnel");
        return;
    }
    for professional in professionals {
        println!(
            "{}  {}  (Ajouté le {})",
            professional.id,
            professional.display_name(),
            professional.created_on_label()
        );
    }
}

async fn await_write(write: WriteHandle) {
    if let Err(err) = write.wait().await {
        warn!("event=cli_write module=cli status=error error={err}");
    }
}

fn prompt(label: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> io::Result<bool> {
    let answer = prompt(question)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    ))
}

fn user_message(err: &CliError) -> String {
    match err {
        CliError::Roster(RosterError::NoValidRecords) => {
            "Aucun professionnel valide trouvé dans le fichier. Vérifiez le format : Prénom,Nom"
                .to_string()
        }
        CliError::Roster(RosterError::Validation(_)) => {
            format!("Saisie invalide : {err}")
        }
        other => format!("error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{open_store_or_memory, user_message, Cli, CliError, Command};
    use clap::Parser;
    use prolist_core::{RosterError, RosterService, ValidationError};

    #[test]
    fn parses_delete_with_confirmation_flag() {
        let id = "00000000-0000-4000-8000-000000000001";
        let cli = Cli::try_parse_from(["prolist", "--password", "2808", "delete", id, "--yes"])
            .unwrap();
        assert_eq!(cli.password.as_deref(), Some("2808"));
        match cli.command {
            Command::Delete { id: parsed, yes } => {
                assert_eq!(parsed.to_string(), id);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_id() {
        assert!(Cli::try_parse_from(["prolist", "edit", "nope", "Jean", "Dupont"]).is_err());
    }

    #[test]
    fn import_failure_uses_french_alert_text() {
        let message = user_message(&CliError::Roster(RosterError::NoValidRecords));
        assert!(message.starts_with("Aucun professionnel valide"));

        let message = user_message(&CliError::Roster(RosterError::Validation(
            ValidationError::EmptyLastName,
        )));
        assert!(message.contains("last name"));
    }

    #[tokio::test]
    async fn unusable_database_path_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let db_path = blocker.join("prolist.sqlite3");

        let store = open_store_or_memory(&db_path).await.unwrap();
        let service = RosterService::open(store, "professionals").await;
        let applied = service.add("Jean", "Dupont").unwrap();
        applied.write.wait().await.unwrap();

        assert_eq!(service.len(), 1);
        assert!(!db_path.exists());
    }
}
