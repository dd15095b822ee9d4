//! gcl — command-line client for Google services.
//!
//! `sync` drives the bucket synchronization engine in `gcl-storage`; the
//! remaining subcommands are stateless request→serialize→print pipelines.

mod services;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use gcl_auth::supplier::{OauthConfig, OauthSupplier};
use gcl_storage::{AclPolicy, GcsClient, GpgCipher, SyncConfig, SyncEngine};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gcl")]
#[command(about = "Command-line client for Google services")]
#[command(version)]
struct Cli {
    /// Credentials file (client id/secret + refresh token)
    #[arg(
        long,
        env = "GCL_CREDENTIALS",
        default_value = "~/.config/gcl/credentials.json"
    )]
    credentials: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a local directory with a storage bucket
    Sync {
        /// Local directory to synchronize
        dir: PathBuf,
        /// Target bucket
        bucket: String,
        /// ACL applied to uploaded objects
        #[arg(long, default_value = "private")]
        acl: String,
        /// GnuPG recipient; repeat for multiple (enables encryption)
        #[arg(short = 'r', long = "recipient")]
        recipients: Vec<String>,
        /// File of newline-separated exclusion regexes
        #[arg(long)]
        exclude_from: Option<PathBuf>,
        /// Write an md5 manifest into the directory after the run
        #[arg(long)]
        md5_sums: bool,
        /// Delete remote objects with no local counterpart
        #[arg(long)]
        purge: bool,
        /// Bound on concurrent transfers
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },
    /// List saved bookmarks
    Bookmarks,
    /// List contacts
    Contacts,
    /// List library bookshelves
    Books,
    /// List photo albums
    Photos,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let supplier = Arc::new(load_supplier(&cli.credentials)?);

    match cli.command {
        Commands::Sync {
            dir,
            bucket,
            acl,
            recipients,
            exclude_from,
            md5_sums,
            purge,
            concurrency,
        } => {
            let mut config = SyncConfig::new(bucket, dir);
            config.acl = AclPolicy::from_str(&acl)?;
            config.recipients = recipients;
            config.exclude_file = exclude_from;
            config.write_manifest = md5_sums;
            config.purge = purge;
            config.concurrency = concurrency;

            let store = Arc::new(GcsClient::new(
                config.bucket.clone(),
                config.api_base_url.clone(),
            )?);
            let engine = SyncEngine::new(config, store, supplier, Arc::new(GpgCipher::new()));

            // Interrupt stops dispatching new transfers; in-flight ones finish.
            let cancel = engine.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, finishing in-flight transfers");
                    cancel.cancel();
                }
            });

            let report = engine.run().await?;
            if !report.is_success() {
                return Err(anyhow!(
                    "{} of {} planned actions failed",
                    report.summary.failed,
                    report.outcomes.len()
                ));
            }
        }
        Commands::Bookmarks => services::list_bookmarks(supplier.as_ref()).await?,
        Commands::Contacts => services::list_contacts(supplier.as_ref()).await?,
        Commands::Books => services::list_books(supplier.as_ref()).await?,
        Commands::Photos => services::list_photos(supplier.as_ref()).await?,
    }

    Ok(())
}

fn load_supplier(path: &str) -> anyhow::Result<OauthSupplier> {
    let path = expand_home(path);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read credentials file {}", path.display()))?;
    let config: OauthConfig =
        serde_json::from_str(&contents).context("malformed credentials file")?;
    Ok(OauthSupplier::new(config)?)
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
