use crate::{ObjectBackend, ObjectData, ObjectMetadata, PutObject, Result, StorageError};
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use notesync_core::ObjectLocation;
use std::collections::HashMap;
use std::future::Future;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Connection settings for an S3-compatible store
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// Region override (otherwise taken from the AWS environment)
    pub region: Option<String>,
    /// Endpoint of an S3-compatible service, addressed path-style
    pub endpoint: Option<String>,
}

/// S3-backed object store
///
/// The bucket of each [`ObjectLocation`] is the S3 bucket and user metadata
/// travels as `x-amz-meta-*` headers. Calls block on the tokio runtime the
/// store was created on, so they must run on a blocking thread.
pub struct S3ObjectStore {
    client: Client,
    handle: Handle,
}

impl S3ObjectStore {
    /// Build a client from the AWS environment (credentials, profile, region)
    pub async fn connect(config: S3Config) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = config.endpoint.clone() {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            "Connecting to S3 (region: {}, endpoint: {})",
            shared.region().map(|r| r.as_ref()).unwrap_or("default"),
            config.endpoint.as_deref().unwrap_or("default")
        );

        Self::with_client(Client::from_conf(builder.build()))
    }

    /// Wrap an existing client; must be called inside a tokio runtime
    pub fn with_client(client: Client) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| {
            StorageError::remote_error("S3 backend needs a tokio runtime", Some(Box::new(e)))
        })?;
        Ok(Self { client, handle })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }
}

impl ObjectBackend for S3ObjectStore {
    fn head(&self, location: &ObjectLocation) -> Result<ObjectMetadata> {
        debug!("S3: head object {}", location);

        let output = self
            .block_on(
                self.client
                    .head_object()
                    .bucket(&location.bucket)
                    .key(&location.key)
                    .send(),
            )
            .map_err(|e| map_sdk_error(location, "head", e, |err| err.is_not_found()))?;

        Ok(metadata_from_parts(
            output.content_type(),
            output.content_length(),
            output.metadata(),
        ))
    }

    fn get(&self, location: &ObjectLocation) -> Result<ObjectData> {
        debug!("S3: get object {}", location);

        let output = self
            .block_on(
                self.client
                    .get_object()
                    .bucket(&location.bucket)
                    .key(&location.key)
                    .send(),
            )
            .map_err(|e| map_sdk_error(location, "get", e, |err| err.is_no_such_key()))?;

        let metadata = metadata_from_parts(
            output.content_type(),
            output.content_length(),
            output.metadata(),
        );
        let body = self
            .block_on(output.body.collect())
            .map_err(|e| {
                StorageError::remote_error(
                    format!("Failed to read {}: {}", location, e),
                    Some(Box::new(e)),
                )
            })?
            .into_bytes();

        Ok(ObjectData { body, metadata })
    }

    fn put(&self, location: &ObjectLocation, object: PutObject) -> Result<()> {
        object.validate()?;
        debug!(
            "S3: put object {} ({} bytes)",
            location, object.content_length
        );

        let (body, metadata) = object.into_parts();
        let ObjectMetadata {
            content_type,
            content_length,
            metadata,
        } = metadata;

        self.block_on(
            self.client
                .put_object()
                .bucket(&location.bucket)
                .key(&location.key)
                .content_type(content_type)
                .content_length(i64::try_from(content_length).unwrap_or(i64::MAX))
                .set_metadata(Some(metadata.into_iter().collect::<HashMap<_, _>>()))
                .body(ByteStream::from(body))
                .send(),
        )
        .map_err(|e| map_sdk_error(location, "put", e, |_| false))?;

        Ok(())
    }
}

/// Translate an SDK failure, reporting a missing key as `ObjectNotFound`
fn map_sdk_error<E, R>(
    location: &ObjectLocation,
    operation: &str,
    err: SdkError<E, R>,
    is_missing: impl Fn(&E) -> bool,
) -> StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if err.as_service_error().is_some_and(is_missing) {
        return StorageError::object_not_found(&location.bucket, &location.key);
    }

    StorageError::remote_error(
        format!(
            "S3 {} {} failed: {}",
            operation,
            location,
            DisplayErrorContext(&err)
        ),
        None,
    )
}

fn metadata_from_parts(
    content_type: Option<&str>,
    content_length: Option<i64>,
    user_metadata: Option<&HashMap<String, String>>,
) -> ObjectMetadata {
    ObjectMetadata {
        content_type: content_type.unwrap_or_default().to_string(),
        content_length: content_length
            .and_then(|len| u64::try_from(len).ok())
            .unwrap_or(0),
        // S3 reports user metadata names in lower case
        metadata: user_metadata
            .map(|m| {
                m.iter()
                    .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{
        Credentials, RequestChecksumCalculation, ResponseChecksumValidation,
    };
    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    type Objects = Arc<Mutex<HashMap<String, (Bytes, HeaderMap)>>>;

    /// Minimal path-style S3 endpoint: PUT stores, GET/HEAD read back
    async fn spawn_fake_s3() -> (String, Objects) {
        async fn get_object(
            State(objects): State<Objects>,
            Path((bucket, key)): Path<(String, String)>,
        ) -> Response {
            match objects.lock().get(&format!("{}/{}", bucket, key)) {
                Some((body, headers)) => (headers.clone(), body.clone()).into_response(),
                None => (
                    StatusCode::NOT_FOUND,
                    [("content-type", "application/xml")],
                    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                     <Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>",
                )
                    .into_response(),
            }
        }

        async fn put_object(
            State(objects): State<Objects>,
            Path((bucket, key)): Path<(String, String)>,
            headers: HeaderMap,
            body: Bytes,
        ) -> Response {
            let mut stored = HeaderMap::new();
            for (name, value) in headers.iter() {
                let name_str = name.as_str();
                if name_str == "content-type" || name_str.starts_with("x-amz-meta-") {
                    stored.insert(name.clone(), value.clone());
                }
            }
            objects
                .lock()
                .insert(format!("{}/{}", bucket, key), (body, stored));

            let mut response = StatusCode::OK.into_response();
            response
                .headers_mut()
                .insert("etag", HeaderValue::from_static("\"fake\""));
            response
        }

        let objects: Objects = Arc::default();
        let app = Router::new()
            .route("/{bucket}/{*key}", get(get_object).put(put_object))
            .with_state(objects.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (url, objects)
    }

    fn client(endpoint: &str) -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .endpoint_url(endpoint)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();
        Client::from_conf(config)
    }

    fn location() -> ObjectLocation {
        ObjectLocation::new("notes", "todo.md").unwrap()
    }

    #[test]
    fn test_metadata_from_parts() {
        let mut user = HashMap::new();
        user.insert("Version".to_string(), "Mon, 02 Jan 2006 15:04:05 GMT".to_string());

        let metadata = metadata_from_parts(Some("text/plain"), Some(4), Some(&user));
        assert_eq!(metadata.content_type, "text/plain");
        assert_eq!(metadata.content_length, 4);
        assert_eq!(metadata.get("version"), Some("Mon, 02 Jan 2006 15:04:05 GMT"));

        let bare = metadata_from_parts(None, Some(-1), None);
        assert_eq!(bare, ObjectMetadata::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_s3_store_round_trip() {
        let (url, objects) = spawn_fake_s3().await;
        let store = Arc::new(S3ObjectStore::with_client(client(&url)).unwrap());

        let backend = store.clone();
        let missing = tokio::task::spawn_blocking(move || {
            (
                backend.head(&location()).unwrap_err(),
                backend.get(&location()).unwrap_err(),
            )
        })
        .await
        .unwrap();
        assert!(missing.0.is_not_found());
        assert!(missing.1.is_not_found());

        let backend = store.clone();
        let (head, data) = tokio::task::spawn_blocking(move || {
            backend
                .put(
                    &location(),
                    PutObject::new("hola").metadata("version", "Mon, 02 Jan 2006 15:04:05 GMT"),
                )
                .unwrap();
            (
                backend.head(&location()).unwrap(),
                backend.get(&location()).unwrap(),
            )
        })
        .await
        .unwrap();

        assert_eq!(head.get("version"), Some("Mon, 02 Jan 2006 15:04:05 GMT"));
        assert_eq!(data.body, bytes::Bytes::from("hola"));
        assert_eq!(data.metadata.get("version"), head.get("version"));
        assert!(objects.lock().contains_key("notes/todo.md"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_s3_store_unreachable_is_remote_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let store = S3ObjectStore::with_client(client(&url)).unwrap();
        let err = tokio::task::spawn_blocking(move || store.head(&location()).unwrap_err())
            .await
            .unwrap();

        assert!(matches!(err, StorageError::RemoteError { .. }));
    }
}
