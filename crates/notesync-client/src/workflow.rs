use crate::{ClientError, FetchOutcome, LocalDocument, Result, SyncClient};
use notesync_core::VersionToken;
use tokio::process::Command;
use tracing::{info, warn};

/// Result of a pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The local file was replaced with this remote version
    Updated(VersionToken),
    /// The local file already matched the remote version
    UpToDate(VersionToken),
    /// The local file is newer than the remote one and was left alone
    LocalAhead,
}

/// Result of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The editor left the file untouched, nothing was pushed
    Unchanged,
    /// The edited file was pushed and stamped with this version
    Pushed(VersionToken),
}

/// Download the remote document if it is newer than the local file
pub async fn pull(client: &SyncClient, doc: &LocalDocument) -> Result<PullOutcome> {
    let since = doc.version()?.unwrap_or_else(VersionToken::zero);

    match client.fetch(since).await? {
        FetchOutcome::Document { version, body } => {
            doc.write(&body, version)?;
            info!("Pulled version {} into {}", version, doc.path().display());
            Ok(PullOutcome::Updated(version))
        }
        FetchOutcome::NotModified => Ok(PullOutcome::UpToDate(since)),
        FetchOutcome::LocalAhead => {
            warn!("{} is newer than the remote document", doc.path().display());
            Ok(PullOutcome::LocalAhead)
        }
    }
}

/// Upload the local file at its modification time
pub async fn push(client: &SyncClient, doc: &LocalDocument, force: bool) -> Result<VersionToken> {
    let (version, body) = doc.read()?;

    let stored = client.upload(version, body, force).await?;
    // A forced write is stamped by the server
    doc.set_version(stored)?;

    info!("Pushed {} as version {}", doc.path().display(), stored);
    Ok(stored)
}

/// Bring the local file up to date, open it in `editor`, then push it
///
/// Refuses to start when the local file is newer than the remote document,
/// since editing it would hide the unsynced change.
pub async fn edit(client: &SyncClient, doc: &LocalDocument, editor: &str) -> Result<EditOutcome> {
    let remote = client.remote_version().await?;
    let local = doc.version()?;

    match (local, remote) {
        (Some(local), Some(remote)) if local > remote => {
            return Err(ClientError::LocalAhead { local, remote });
        }
        (local, Some(remote)) if local.is_none_or(|local| local < remote) => {
            pull(client, doc).await?;
        }
        _ => {}
    }

    let before = doc.version()?;
    run_editor(editor, doc).await?;

    if doc.version()? == before {
        info!("{} unchanged, nothing to push", doc.path().display());
        return Ok(EditOutcome::Unchanged);
    }

    push(client, doc, false).await.map(EditOutcome::Pushed)
}

async fn run_editor(editor: &str, doc: &LocalDocument) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| ClientError::editor("no editor configured"))?;

    let status = Command::new(program)
        .args(parts)
        .arg(doc.path())
        .status()
        .await
        .map_err(|e| ClientError::editor(format!("unable to run {}: {}", program, e)))?;

    if !status.success() {
        return Err(ClientError::editor(format!("{} exited with {}", program, status)));
    }
    Ok(())
}
