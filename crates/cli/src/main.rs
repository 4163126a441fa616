//! git-committers command-line host.
//!
//! Drives the committers plugin over a docs directory the way a static
//! site build would: load the author cache, collect the contributors of
//! every Markdown page, then persist the cache.

mod frontmatter;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use git_committers_core::config::PluginConfig;
use git_committers_core::identity::normalize_email;
use git_committers_core::CommittersPlugin;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Annotate documentation pages with their git contributors.
#[derive(Parser, Debug)]
#[command(
    name = "git-committers",
    version,
    about = "Resolve documentation page contributors to GitHub profiles"
)]
struct Cli {
    /// Path to the TOML plugin configuration. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the git repository.
    #[arg(short, long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Collect contributors for every Markdown page and print them as JSON.
    Build {
        /// Directory containing the Markdown sources.
        #[arg(short, long, default_value = "docs")]
        docs_dir: PathBuf,

        /// Write the JSON to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve one author name / email through the cache and GitHub.
    Lookup {
        /// Author name or GitHub user name.
        #[arg(long)]
        name: Option<String>,

        /// Author email (normalized before lookup).
        #[arg(long)]
        email: Option<String>,
    },

    /// Print the effective configuration.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Build { docs_dir, output } => {
            cmd_build(config, &cli.repo, &docs_dir, output.as_deref()).await
        }
        Commands::Lookup { name, email } => cmd_lookup(config, &cli.repo, name, email).await,
        Commands::Validate => cmd_validate(&config),
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<PluginConfig> {
    let mut config = match path {
        Some(path) => {
            PluginConfig::load_from_file(path).context("failed to load configuration file")?
        }
        None => PluginConfig::default(),
    };
    config.resolve_token();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_build(
    config: PluginConfig,
    repo: &Path,
    docs_dir: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mut plugin =
        CommittersPlugin::from_config(config, repo).context("failed to initialize plugin")?;
    plugin
        .on_pre_build()
        .context("failed to load authors cache")?;

    let mut pages = serde_json::Map::new();
    for src_path in markdown_pages(docs_dir)? {
        let markdown = std::fs::read_to_string(docs_dir.join(&src_path))
            .with_context(|| format!("failed to read page '{}'", src_path))?;
        let meta = frontmatter::page_meta(&markdown);
        let context = plugin
            .on_page_context(&src_path, &meta)
            .await
            .with_context(|| format!("failed to collect contributors for '{}'", src_path))?;
        debug!(page = %src_path, committers = context.committers.len(), "page collected");
        pages.insert(src_path, serde_json::to_value(&context)?);
    }

    plugin
        .on_post_build()
        .context("failed to save authors cache")?;
    info!(
        pages = pages.len(),
        total_secs = plugin.total_time().as_secs_f64(),
        "build complete"
    );

    let json = serde_json::to_string_pretty(&serde_json::Value::Object(pages))?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

async fn cmd_lookup(
    config: PluginConfig,
    repo: &Path,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    if name.is_none() && email.is_none() {
        anyhow::bail!("pass --name, --email, or both");
    }
    let mut plugin =
        CommittersPlugin::from_config(config, repo).context("failed to initialize plugin")?;
    if !plugin.is_enabled() {
        anyhow::bail!("plugin is disabled in the configuration");
    }
    plugin
        .on_pre_build()
        .context("failed to load authors cache")?;

    let email = email.map(|e| normalize_email(&e));
    let resolved = plugin
        .memo_mut()
        .resolve_author(name.as_deref(), email.as_deref())
        .await;

    match resolved {
        Some((key, identity)) => {
            println!("Author key : {}", key);
            println!("{}", serde_json::to_string_pretty(&identity)?);
            plugin
                .on_post_build()
                .context("failed to save authors cache")?;
        }
        None => println!("No GitHub user found."),
    }
    Ok(())
}

fn cmd_validate(config: &PluginConfig) -> Result<()> {
    println!("Configuration summary:");
    println!("  Enabled       : {}", config.enabled);
    println!("  API endpoint  : {}", config.api_endpoint());
    println!(
        "  Repository    : {}",
        if config.repository.is_empty() {
            "-"
        } else {
            config.repository.as_str()
        }
    );
    println!("  Branch        : {}", config.branch);
    println!("  Docs path     : {}", config.docs_path);
    println!(
        "  Token         : {}",
        if config.token().is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!("  Cache file    : {}", config.cache_file().display());
    println!();
    println!("Configuration is valid.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Markdown files under `docs_dir`, as sorted `/`-separated relative paths.
fn markdown_pages(docs_dir: &Path) -> Result<Vec<String>> {
    let mut pages = Vec::new();
    for entry in WalkDir::new(docs_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk '{}'", docs_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_markdown = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "md" || ext == "markdown");
        if !is_markdown {
            continue;
        }
        let relative = entry.path().strip_prefix(docs_dir)?;
        let src_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        pages.push(src_path);
    }
    Ok(pages)
}
