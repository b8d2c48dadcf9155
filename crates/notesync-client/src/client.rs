use crate::{ClientError, Result};
use bytes::Bytes;
use notesync_core::{
    VersionToken, AUTH_HEADER, CLIENT_VERSION_HEADER, CONTENT_TYPE, FORCE_HEADER, VERSION_HEADER,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

/// Result of a conditional fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server holds a newer document
    Document { version: VersionToken, body: Bytes },
    /// The caller already has the stored version
    NotModified,
    /// The caller's version is newer than the stored one
    LocalAhead,
}

/// HTTP client for the document endpoint
pub struct SyncClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl SyncClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// HEAD / (None when the server has no document)
    pub async fn remote_version(&self) -> Result<Option<VersionToken>> {
        let url = self.document_url();
        debug!("HEAD {}", url);

        let resp = self.authorize(self.client.head(&url)).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response_version(&resp).map(Some),
            _ => Err(status_error(resp).await),
        }
    }

    /// GET / with the caller's version
    pub async fn fetch(&self, since: VersionToken) -> Result<FetchOutcome> {
        let url = self.document_url();
        debug!("GET {} since {}", url, since);

        let resp = self
            .authorize(self.client.get(&url))
            .header(CLIENT_VERSION_HEADER, since.to_header())
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_MODIFIED => Ok(FetchOutcome::NotModified),
            StatusCode::CONFLICT => Ok(FetchOutcome::LocalAhead),
            status if status.is_success() => {
                let version = response_version(&resp)?;
                let body = resp.bytes().await?;
                Ok(FetchOutcome::Document { version, body })
            }
            _ => Err(status_error(resp).await),
        }
    }

    /// PUT / and return the version the server stamped
    pub async fn upload(
        &self,
        version: VersionToken,
        body: impl Into<Bytes>,
        force: bool,
    ) -> Result<VersionToken> {
        let url = self.document_url();
        debug!("PUT {} at {} (force: {})", url, version, force);

        let mut request = self
            .authorize(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(VERSION_HEADER, version.to_header())
            .body(body.into());
        if force {
            request = request.header(FORCE_HEADER, "true");
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        response_version(&resp)
    }

    fn document_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTH_HEADER, token),
            None => request,
        }
    }
}

fn response_version(resp: &Response) -> Result<VersionToken> {
    let value = resp
        .headers()
        .get(VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Ok(VersionToken::parse(value)?)
}

async fn status_error(resp: Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    warn!("Request failed with status {}", status);

    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized { message: body },
        StatusCode::CONFLICT => ClientError::Conflict { message: body },
        _ => ClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeDelta;
    use notesync_apiserver::{ApiServer, AppState, Config};
    use notesync_core::ObjectLocation;
    use notesync_storage::MemoryObjectStore;
    use notesync_versioning::VersionedObjectStore;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    pub(crate) struct TestServer {
        pub url: String,
        pub store: Arc<VersionedObjectStore>,
        token: CancellationToken,
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            self.token.cancel();
        }
    }

    /// Serve a fresh in-memory document on an ephemeral port
    pub(crate) async fn spawn_server(auth: Option<&str>) -> TestServer {
        let store = Arc::new(VersionedObjectStore::new(
            Arc::new(MemoryObjectStore::new()),
            ObjectLocation::new("notes", "todo.md").unwrap(),
        ));
        let state =
            Arc::new(AppState::new(store.clone()).with_auth_token(auth.map(str::to_string)));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let token = CancellationToken::new();
        tokio::spawn(ApiServer::new(Config::default(), state).serve(listener, token.clone()));

        TestServer { url, store, token }
    }

    pub(crate) fn seed_version() -> VersionToken {
        VersionToken::from_unix_seconds(1_700_000_000).unwrap()
    }

    #[tokio::test]
    async fn test_remote_version() {
        let server = spawn_server(None).await;
        let client = SyncClient::new(&server.url, None);

        assert_eq!(client.remote_version().await.unwrap(), None);

        server.store.safe_put(seed_version(), "Hola").unwrap();
        assert_eq!(client.remote_version().await.unwrap(), Some(seed_version()));
    }

    #[tokio::test]
    async fn test_fetch_outcomes() {
        let server = spawn_server(None).await;
        server.store.safe_put(seed_version(), "Hola").unwrap();
        let client = SyncClient::new(&server.url, None);

        let outcome = client.fetch(VersionToken::zero()).await.unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Document {
                version: seed_version(),
                body: Bytes::from_static(b"Hola"),
            }
        );

        assert_eq!(
            client.fetch(seed_version()).await.unwrap(),
            FetchOutcome::NotModified
        );
        assert_eq!(
            client
                .fetch(seed_version() + TimeDelta::days(1))
                .await
                .unwrap(),
            FetchOutcome::LocalAhead
        );
    }

    #[tokio::test]
    async fn test_fetch_absent_document() {
        let server = spawn_server(None).await;
        let client = SyncClient::new(&server.url, None);

        let err = client.fetch(VersionToken::zero()).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound));
    }

    #[tokio::test]
    async fn test_upload() {
        let server = spawn_server(None).await;
        server.store.safe_put(seed_version(), "Hola").unwrap();
        let client = SyncClient::new(&server.url, None);

        let err = client
            .upload(seed_version(), "stale", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Conflict { .. }));

        let next = seed_version() + TimeDelta::hours(1);
        assert_eq!(client.upload(next, "adios", false).await.unwrap(), next);
        assert_eq!(server.store.view().unwrap().1.as_ref(), b"adios");

        let forced = client
            .upload(seed_version(), "forced", true)
            .await
            .unwrap();
        assert!(forced > next);
        assert_eq!(server.store.view().unwrap().1.as_ref(), b"forced");
    }

    #[tokio::test]
    async fn test_token_is_sent() {
        let server = spawn_server(Some("secret")).await;
        server.store.safe_put(seed_version(), "Hola").unwrap();

        let anonymous = SyncClient::new(&server.url, None);
        let err = anonymous.remote_version().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized { .. }));

        let client = SyncClient::new(&server.url, Some("secret".to_string()));
        assert_eq!(client.remote_version().await.unwrap(), Some(seed_version()));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = SyncClient::new("http://localhost:8080/", None);
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.document_url(), "http://localhost:8080/");
    }
}
