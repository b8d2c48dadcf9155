use axum::http::header::{CONTENT_TYPE, LAST_MODIFIED};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notesync_core::VersionToken;

/// Response carrying only the version header
pub fn version_response(version: VersionToken) -> Response {
    (StatusCode::OK, [(LAST_MODIFIED, version.to_header())]).into_response()
}

/// Response carrying the document and its version
pub fn document_response(version: VersionToken, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, notesync_core::CONTENT_TYPE.to_string()),
            (LAST_MODIFIED, version.to_header()),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_response_header() {
        let version = VersionToken::from_unix_seconds(1_136_214_245).unwrap();
        let response = version_response(version);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(LAST_MODIFIED).unwrap(),
            "Mon, 02 Jan 2006 15:04:05 GMT"
        );
    }

    #[test]
    fn test_document_response_headers() {
        let response = document_response(VersionToken::zero(), b"hola".to_vec());

        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            notesync_core::CONTENT_TYPE
        );
        assert_eq!(
            response.headers().get(LAST_MODIFIED).unwrap(),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }
}
