use clap::{Args, Parser, Subcommand, ValueEnum};
use notesync_apiserver::{ApiServer, AppState, Config as ApiConfig};
use notesync_client::{EditOutcome, LocalDocument, PullOutcome, SyncClient};
use notesync_core::ObjectLocation;
use notesync_storage::{MemoryObjectStore, ObjectBackend, RedbObjectStore, S3Config, S3ObjectStore};
use notesync_versioning::VersionedObjectStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "notesync", about = "Single-document sync server and client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync server
    Serve {
        /// Address to listen on
        #[arg(long, env = "NOTESYNC_BIND", default_value = "0.0.0.0:8080")]
        bind: String,
        /// Path to the redb database file
        #[arg(long, env = "NOTESYNC_DATA", default_value = "./notesync.redb")]
        data_dir: String,
        /// Bucket holding the document
        #[arg(long, env = "NOTESYNC_BUCKET", default_value = "notesync")]
        bucket: String,
        /// Key of the document within the bucket
        #[arg(long, env = "NOTESYNC_KEY", default_value = "todo.md")]
        key: String,
        /// Shared secret clients must present (unset leaves the server open)
        #[arg(long, env = "NOTESYNC_TOKEN")]
        token: Option<String>,
        /// Where the document is stored
        #[arg(long, env = "NOTESYNC_BACKEND", value_enum, default_value_t = Backend::Redb)]
        backend: Backend,
        /// AWS region of the S3 bucket (defaults to the AWS environment)
        #[arg(long, env = "NOTESYNC_REGION")]
        region: Option<String>,
        /// Endpoint of an S3-compatible service
        #[arg(long, env = "NOTESYNC_S3_ENDPOINT")]
        endpoint: Option<String>,
    },
    /// Download the remote document if it is newer than the local file
    Pull {
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Upload the local file
    Push {
        #[command(flatten)]
        remote: RemoteArgs,
        /// Overwrite the remote document regardless of its version
        #[arg(long)]
        force: bool,
    },
    /// Sync, open the local file in an editor, then push it
    Edit {
        #[command(flatten)]
        remote: RemoteArgs,
        /// Editor command
        #[arg(long, env = "EDITOR", default_value = "vim")]
        editor: String,
    },
}

/// Document storage backend
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// redb file at --data-dir
    Redb,
    /// S3 bucket --bucket in --region
    S3,
    /// Process memory, lost on exit
    Memory,
}

#[derive(Args)]
struct RemoteArgs {
    /// Server address
    #[arg(long, env = "NOTESYNC_ADDR")]
    addr: String,
    /// Local copy of the document
    #[arg(long, env = "NOTESYNC_FILE")]
    file: String,
    /// Shared secret expected by the server
    #[arg(long, env = "NOTESYNC_TOKEN")]
    token: Option<String>,
}

impl RemoteArgs {
    fn open(self) -> (SyncClient, LocalDocument) {
        (
            SyncClient::new(&self.addr, self.token),
            LocalDocument::new(self.file),
        )
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            data_dir,
            bucket,
            key,
            token,
            backend,
            region,
            endpoint,
        } => {
            let location = ObjectLocation::new(bucket, key)?;
            let backend = create_backend(backend, &data_dir, S3Config { region, endpoint }).await?;
            run_serve(&bind, backend, location, token).await
        }
        Commands::Pull { remote } => run_pull(remote).await,
        Commands::Push { remote, force } => run_push(remote, force).await,
        Commands::Edit { remote, editor } => run_edit(remote, &editor).await,
    }
}

/// Run the sync server until ctrl-c
async fn run_serve(
    bind: &str,
    backend: Arc<dyn ObjectBackend>,
    location: ObjectLocation,
    auth_token: Option<String>,
) -> miette::Result<()> {
    info!("Serving {} from {}", location, bind);

    let store = Arc::new(VersionedObjectStore::new(backend, location));
    let state = Arc::new(AppState::new(store).with_auth_token(auth_token));

    let config = ApiConfig {
        listen_addr: bind
            .parse()
            .map_err(|e| miette::miette!("Invalid bind address '{}': {}", bind, e))?,
    };

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down gracefully...");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    ApiServer::new(config, state)
        .run(token)
        .await
        .map_err(|e| miette::miette!("API server error: {}", e))?;

    info!("Shutdown complete");
    Ok(())
}

async fn run_pull(remote: RemoteArgs) -> miette::Result<()> {
    let (client, doc) = remote.open();

    match notesync_client::pull(&client, &doc).await? {
        PullOutcome::Updated(version) => info!("Updated to version {}", version),
        PullOutcome::UpToDate(version) => info!("Already up to date at version {}", version),
        PullOutcome::LocalAhead => {
            warn!("Local file is newer than the remote one, push it to publish the changes")
        }
    }
    Ok(())
}

async fn run_push(remote: RemoteArgs, force: bool) -> miette::Result<()> {
    let (client, doc) = remote.open();

    let version = notesync_client::push(&client, &doc, force).await?;
    info!("Remote is now at version {}", version);
    Ok(())
}

async fn run_edit(remote: RemoteArgs, editor: &str) -> miette::Result<()> {
    let (client, doc) = remote.open();

    match notesync_client::edit(&client, &doc, editor).await? {
        EditOutcome::Pushed(version) => info!("Remote is now at version {}", version),
        EditOutcome::Unchanged => info!("No changes"),
    }
    Ok(())
}

/// Create the document backend
async fn create_backend(
    backend: Backend,
    data_dir: &str,
    s3: S3Config,
) -> miette::Result<Arc<dyn ObjectBackend>> {
    match backend {
        Backend::Redb => {
            let store = RedbObjectStore::new(std::path::Path::new(data_dir))
                .map_err(|e| miette::miette!("Failed to open storage at '{}': {}", data_dir, e))?;
            Ok(Arc::new(store))
        }
        Backend::S3 => Ok(Arc::new(S3ObjectStore::connect(s3).await?)),
        Backend::Memory => {
            warn!("Using the in-memory backend, the document is lost on exit");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
    }
}
