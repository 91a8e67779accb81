use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod errors;
mod models;
mod sync;

use config::settings::{FileSettings, Overrides, Settings};
use errors::SyncError;

#[derive(Parser)]
#[command(name = "ttsync")]
#[command(version = "0.1.0")]
#[command(
    about = "Add your open Freshdesk tickets to Todoist and check them off once they're handled",
    long_about = None
)]
struct Cli {
    /// ____.freshdesk.com -- the domain for your support portal
    #[arg(long = "fd-domain", env = "FRESHDESK_DOMAIN")]
    fd_domain: Option<String>,

    /// The API key provided on your Freshdesk 'Profile Settings' page
    #[arg(long = "fd-apikey", env = "FRESHDESK_APIKEY", hide_env_values = true)]
    fd_apikey: Option<String>,

    /// Your Todoist API key
    #[arg(long = "todoist-apikey", env = "TODOIST_APIKEY", hide_env_values = true)]
    todoist_apikey: Option<String>,

    /// The list to which Freshdesk tickets should be added
    #[arg(long = "todoist-freshdesk-list", env = "TODOIST_FRESHDESK_LIST")]
    todoist_freshdesk_list: Option<String>,

    /// A custom domain to use for ticket links in tasks (needed if Freshdesk runs on a custom domain)
    #[arg(long = "fd-custom-domain", env = "FRESHDESK_CUSTOM_DOMAIN")]
    fd_custom_domain: Option<String>,

    /// Config file (defaults to ~/.ttsync/config.toml)
    #[arg(long, env = "TTSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// for debugging purposes
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            freshdesk_domain: self.fd_domain.clone(),
            freshdesk_api_key: self.fd_apikey.clone(),
            todoist_api_key: self.todoist_apikey.clone(),
            todoist_list: self.todoist_freshdesk_list.clone(),
            custom_domain: self.fd_custom_domain.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("\n{}", render_error(&e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("ttsync={level},freshdesk={level},todoist={level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let file = match cli.config.clone().or_else(Settings::default_config_path) {
        Some(path) => {
            debug!(config = %path.display(), "Loading config file");
            FileSettings::load(&path)?
        }
        None => FileSettings::default(),
    };
    let settings = Settings::resolve(cli.overrides(), file)?;
    debug!(
        domain = %settings.freshdesk_domain,
        link_domain = %settings.link_domain(),
        list = %settings.todoist_list,
        "Configuration resolved"
    );

    let freshdesk = api::freshdesk::FreshdeskClient::new(
        &settings.freshdesk_domain,
        &settings.freshdesk_api_key,
    );
    let mut todoist = api::todoist::TodoistClient::new(&settings.todoist_api_key);

    sync::run(&settings, &freshdesk, &mut todoist).await?;

    Ok(())
}

/// Shows a `SyncError` with its fix-it hints, prefixed by any context
/// that was attached on the way up.
fn render_error(err: &anyhow::Error) -> String {
    let mut context = Vec::new();
    for cause in err.chain() {
        if let Some(sync_err) = cause.downcast_ref::<SyncError>() {
            let mut out = String::new();
            for line in &context {
                out.push_str(&format!("{}\n", line).yellow().to_string());
            }
            out.push_str(&sync_err.to_string());
            return out;
        }
        context.push(cause.to_string());
    }

    format!("{}\n   {}", "Error".red().bold(), format!("{:#}", err).dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "ttsync",
            "--fd-domain",
            "acme",
            "--fd-apikey",
            "fd-key",
            "--todoist-apikey",
            "td-key",
            "--todoist-freshdesk-list",
            "Freshdesk",
            "--fd-custom-domain",
            "support.example.com",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let overrides = cli.overrides();
        assert_eq!(overrides.freshdesk_domain.as_deref(), Some("acme"));
        assert_eq!(overrides.todoist_list.as_deref(), Some("Freshdesk"));
        assert_eq!(overrides.custom_domain.as_deref(), Some("support.example.com"));
    }

    #[test]
    fn test_render_error_keeps_context() {
        colored::control::set_override(false);
        let err = anyhow::Error::from(SyncError::TaskNotFound("i1".to_string()))
            .context("Could not mark task completed!");

        let rendered = render_error(&err);
        assert!(rendered.starts_with("Could not mark task completed!\n"));
        assert!(rendered.contains("Task 'i1' is not in the local Todoist mirror"));
    }

    #[test]
    fn test_render_plain_error() {
        colored::control::set_override(false);
        let err = anyhow::anyhow!("boom").context("Failed to parse Todoist sync response");

        let rendered = render_error(&err);
        assert!(rendered.contains("Failed to parse Todoist sync response: boom"));
    }
}
