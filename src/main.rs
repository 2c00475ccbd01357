//! flux-desktop headless entry point.
//!
//! Drives the application shell from a terminal: every subcommand runs one
//! session operation to completion and prints the resulting repository state,
//! notifications and sidebar.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use flux_desktop::app::{FluxApp, NotificationLevel};
use flux_desktop::domain::RepositorySnapshot;
use flux_desktop::infra::app_config::{self, AppConfig};
use flux_desktop::infra::backend::LocalBackend;
use flux_desktop::infra::store::FluxStore;
use flux_desktop::navigation::render_tree;
use flux_desktop::session::SessionState;

#[derive(Parser, Debug)]
#[command(name = "flux-desktop")]
#[command(version)]
#[command(about = "Desktop shell for the flux version control system", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open a repository and show its state
    Open { path: PathBuf },

    /// Clone a repository from a local path or file:// URL
    Clone {
        url: String,
        /// Defaults to `<default_clone_dir>/<name>` from the app config
        destination: Option<PathBuf>,
    },

    /// Update user name, email and origin of a repository
    Config {
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        origin: Option<String>,
    },

    /// Create an empty repository with branch `main`
    Init { path: PathBuf },

    /// Print the sidebar, optionally activating nodes first
    Tree {
        path: PathBuf,
        /// Node ids to activate, in order
        #[arg(long = "toggle")]
        toggles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = app_config::load_config();
    init_logging(&config);

    let mut app = FluxApp::new(Arc::new(LocalBackend::new()));

    match args.command {
        Commands::Open { path } => {
            app.open(Some(path))?;
        }
        Commands::Clone { url, destination } => {
            let destination = destination
                .or_else(|| config.clone_destination(&repository_name(&url)))
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            app.clone_repository(&url, &destination)?;
        }
        Commands::Config {
            path,
            name,
            email,
            origin,
        } => {
            app.open(Some(path))?;
            app.settle().await;
            let mut form = app
                .settings_form()
                .context("Repository could not be opened")?;
            if let Some(name) = name {
                form.user_name = name;
            }
            if let Some(email) = email {
                form.user_email = email;
            }
            if let Some(origin) = origin {
                form.origin = origin;
            }
            app.submit_settings(form)?;
        }
        Commands::Init { path } => {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            FluxStore::init(&path)?;
            println!("Initialized empty flux repository in {}", path.display());
            app.open(Some(path))?;
        }
        Commands::Tree { path, toggles } => {
            app.open(Some(path))?;
            app.settle().await;
            for id in &toggles {
                let outcome = app.toggle_menu(id);
                log::debug!("toggle {id}: {outcome:?}");
            }
        }
    }

    let state = app.settle().await.clone();
    if let SessionState::Open(snapshot) = &state {
        remember(&mut config, snapshot.path());
    }
    report(&mut app, &state);

    if let Some(message) = state.error_message() {
        bail!("{message}");
    }
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let fallback = config.log_filter.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(fallback)).init();
}

fn remember(config: &mut AppConfig, path: &Path) {
    config.remember_repository(path);
    if let Err(e) = app_config::save_config(config) {
        log::warn!("Failed to save app config: {e}");
    }
}

/// Last path segment of a clone URL without a trailing `.flux`.
fn repository_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    last.strip_suffix(".flux").unwrap_or(last).to_string()
}

fn report(app: &mut FluxApp, state: &SessionState) {
    if let Some(snapshot) = state.snapshot() {
        print_snapshot(snapshot);
    }

    for note in app.take_notifications() {
        let prefix = match note.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        match note.detail {
            Some(detail) => eprintln!("[{prefix}] {}: {detail}", note.title),
            None => eprintln!("[{prefix}] {}", note.title),
        }
    }

    println!();
    print!("{}", render_tree(&app.tree()));
    println!("route: {}", app.current_route());
}

fn print_snapshot(snapshot: &RepositorySnapshot) {
    println!("repository: {} ({})", snapshot.name(), snapshot.path().display());
    println!("head:       {}", snapshot.head());
    println!("user:       {}", describe_user(snapshot));
    println!("origin:     {}", snapshot.origin().unwrap_or("-"));
    println!("staged:     {}", list_or_dash(snapshot.index()));
    println!("unstaged:   {}", list_or_dash(snapshot.uncommitted()));
}

fn describe_user(snapshot: &RepositorySnapshot) -> String {
    match (snapshot.user_name(), snapshot.user_email()) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(name), None) => name.to_string(),
        (None, Some(email)) => format!("<{email}>"),
        (None, None) => "-".to_string(),
    }
}

fn list_or_dash(paths: &[String]) -> String {
    if paths.is_empty() {
        "-".to_string()
    } else {
        paths.join(", ")
    }
}
