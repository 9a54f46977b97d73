// src/main.rs
use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nightlife_client::api::{
    ApiClient, DeletionRequest, EmployeeListParams, EmployeeService, EstablishmentListParams,
    EstablishmentService, QueryCache, VoteType,
};
use nightlife_client::common::{ClientConfig, ClientError};
use nightlife_client::registration::{
    resume_step, DraftStore, FileDraftStore, ResumePolicy, REGISTER_DRAFT_KEY,
};
use nightlife_client::ui::presets_json;

/// Command-line access to the nightlife directory API
#[derive(Parser, Debug)]
#[command(name = "nightlife", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List establishment categories
    Categories,

    /// List establishments
    Establishments { search: Option<String> },

    /// List employees
    Employees { search: Option<String> },

    /// Search employees by name
    Search { query: String },

    /// Employee name suggestions
    Suggest { query: String },

    /// Validation vote stats for an employee
    Stats { employee_id: String },

    /// Vote on whether an employee profile exists
    Vote {
        employee_id: String,
        /// exists or not_exists
        #[arg(value_parser = parse_vote)]
        vote: VoteType,
    },

    /// Request removal of an employee profile
    Remove {
        employee_id: String,
        #[arg(required = true, num_args = 1..)]
        reason: Vec<String>,
    },

    /// Request deletion of an employee profile with a supporting document
    Deletion {
        employee_id: String,
        document: PathBuf,
        reason: String,
        contact_email: Option<String>,
    },

    /// Inspect or discard the saved registration draft
    Draft {
        #[command(subcommand)]
        action: Option<DraftAction>,
    },

    /// Print animation presets as JSON
    Presets {
        #[arg(long)]
        reduced_motion: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum DraftAction {
    /// Print the draft and the step it resumes at (default)
    Show,
    /// Delete the draft
    Clear,
}

fn parse_vote(value: &str) -> Result<VoteType, String> {
    VoteType::from_str_arg(value)
        .ok_or_else(|| format!("unknown vote '{}', expected exists or not_exists", value))
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env();

    // Local commands need no API client
    match cli.command {
        Commands::Draft { action } => {
            return draft_command(&config, action.unwrap_or(DraftAction::Show)).await
        }
        Commands::Presets { reduced_motion } => return print_json(&presets_json(reduced_motion)),
        command => {
            if let Err(e) = api_command(&config, command).await {
                if e
                    .downcast_ref::<ClientError>()
                    .is_some_and(ClientError::is_unauthorized)
                {
                    warn!("The API rejected the request; set API_TOKEN to an account token");
                }
                return Err(e);
            }
        }
    }

    Ok(())
}

async fn api_command(config: &ClientConfig, command: Commands) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    info!(api_base_url = %client.base_url(), command = ?command, "Calling directory API");

    let cache = QueryCache::new(config.query_stale_time);
    let employees = EmployeeService::new(client.clone(), cache.clone());
    let establishments = EstablishmentService::new(client, cache);

    match command {
        Commands::Categories => print_json(&establishments.categories().await?),
        Commands::Establishments { search } => {
            let params = EstablishmentListParams {
                search,
                ..Default::default()
            };
            print_json(&establishments.list(&params).await?)
        }
        Commands::Employees { search } => {
            let params = EmployeeListParams {
                search,
                ..Default::default()
            };
            print_json(&employees.list(&params).await?)
        }
        Commands::Search { query } => print_json(&employees.search(&query, None).await?),
        Commands::Suggest { query } => print_json(&employees.name_suggestions(&query).await?),
        Commands::Stats { employee_id } => {
            let stats = employees.validation_stats(&employee_id).await?;
            println!("{}% say this profile exists", stats.exists_ratio());
            print_json(&stats)
        }
        Commands::Vote { employee_id, vote } => {
            print_json(&employees.vote(&employee_id, vote).await?)
        }
        Commands::Remove {
            employee_id,
            reason,
        } => print_json(
            &employees
                .request_removal(&employee_id, &reason.join(" "))
                .await?,
        ),
        Commands::Deletion {
            employee_id,
            document,
            reason,
            contact_email,
        } => {
            let request = DeletionRequest {
                document,
                reason,
                contact_email,
            };
            print_json(&employees.deletion_request(&employee_id, &request).await?)
        }
        Commands::Draft { .. } | Commands::Presets { .. } => Ok(()),
    }
}

async fn draft_command(config: &ClientConfig, action: DraftAction) -> anyhow::Result<()> {
    let store = FileDraftStore::new(&config.draft_dir);

    match action {
        DraftAction::Show => match store.load(REGISTER_DRAFT_KEY).await? {
            Some(draft) => {
                println!(
                    "Saved {} (resumes at step {})",
                    draft.saved_at.to_rfc3339(),
                    resume_step(&draft, ResumePolicy::default())
                );
                print_json(&draft)
            }
            None => {
                println!("No registration draft");
                Ok(())
            }
        },
        DraftAction::Clear => {
            store
                .clear(REGISTER_DRAFT_KEY)
                .await
                .context("Failed to clear draft")?;
            println!("Draft cleared");
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_draft_and_presets() {
        let cli = Cli::try_parse_from(["nightlife", "draft"]).unwrap();
        assert!(matches!(cli.command, Commands::Draft { action: None }));

        let cli = Cli::try_parse_from(["nightlife", "draft", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Draft {
                action: Some(DraftAction::Clear)
            }
        ));

        let cli = Cli::try_parse_from(["nightlife", "presets", "--reduced-motion"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Presets {
                reduced_motion: true
            }
        ));
    }

    #[test]
    fn test_vote_and_removal_arguments() {
        let cli = Cli::try_parse_from(["nightlife", "vote", "e1", "down"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Vote {
                vote: VoteType::NotExists,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["nightlife", "vote", "e1", "maybe"]).is_err());

        let cli =
            Cli::try_parse_from(["nightlife", "remove", "e1", "This", "profile", "is", "fake"])
                .unwrap();
        match cli.command {
            Commands::Remove {
                employee_id,
                reason,
            } => {
                assert_eq!(employee_id, "e1");
                assert_eq!(reason.join(" "), "This profile is fake");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["nightlife", "remove", "e1"]).is_err());
    }
}
