use crate::{ApiError, Result};
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use notesync_core::{VersionToken, CLIENT_VERSION_HEADER, FORCE_HEADER, VERSION_HEADER};

/// Version the client holds on a conditional read (zero when absent)
pub fn client_version(headers: &HeaderMap) -> Result<VersionToken> {
    match header_str(headers, CLIENT_VERSION_HEADER)? {
        Some(value) if !value.trim().is_empty() => parse_version(value),
        _ => Ok(VersionToken::zero()),
    }
}

/// Version the client proposes for a write
pub fn write_version(headers: &HeaderMap) -> Result<VersionToken> {
    match header_str(headers, VERSION_HEADER)? {
        Some(value) => parse_version(value),
        None => Err(ApiError::BadRequest(format!(
            "Missing {} header",
            VERSION_HEADER
        ))),
    }
}

/// Whether the client asked to bypass the version check
pub fn is_force(headers: &HeaderMap) -> bool {
    match headers.get(FORCE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(value) => {
            let value = value.trim();
            !value.is_empty() && !value.eq_ignore_ascii_case("false")
        }
        None => false,
    }
}

/// Reject empty bodies and bodies at or above the size ceiling
pub fn validate_body(headers: &HeaderMap, body: &[u8], size_limit: u64) -> Result<()> {
    let declared = match header_str(headers, CONTENT_LENGTH.as_str())? {
        Some(value) => Some(value.trim().parse::<u64>().map_err(|_| {
            ApiError::BadRequest(format!("Invalid Content-Length: {}", value))
        })?),
        None => None,
    };

    if declared == Some(0) || body.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing body or content length".to_string(),
        ));
    }

    let size = declared.unwrap_or(0).max(body.len() as u64);
    if size >= size_limit {
        return Err(ApiError::PayloadTooLarge(format!(
            "Body of {} bytes exceeds the {} byte limit",
            size, size_limit
        )));
    }

    Ok(())
}

fn parse_version(value: &str) -> Result<VersionToken> {
    VersionToken::parse(value)
        .map_err(|e| ApiError::BadRequest(format!("Unrecognized version date: {}", e)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Header {} is not valid text", name))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_client_version() {
        assert_eq!(client_version(&headers(&[])).unwrap(), VersionToken::zero());

        let version = client_version(&headers(&[(
            "if-modified-since",
            "Mon, 02 Jan 2006 15:04:05 GMT",
        )]))
        .unwrap();
        assert_eq!(version.unix_seconds(), 1_136_214_245);

        let err = client_version(&headers(&[("if-modified-since", "foo")])).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_write_version_is_required() {
        assert!(matches!(
            write_version(&headers(&[])).unwrap_err(),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            write_version(&headers(&[("last-modified", "yesterday")])).unwrap_err(),
            ApiError::BadRequest(_)
        ));
        assert!(write_version(&headers(&[("last-modified", "Mon, 02 Jan 2006 15:04:05 GMT")])).is_ok());
    }

    #[test]
    fn test_is_force() {
        assert!(!is_force(&headers(&[])));
        assert!(!is_force(&headers(&[("force", "")])));
        assert!(!is_force(&headers(&[("force", "false")])));
        assert!(!is_force(&headers(&[("force", "FALSE")])));
        assert!(is_force(&headers(&[("force", "true")])));
        assert!(is_force(&headers(&[("force", "1")])));
    }

    #[test]
    fn test_validate_body() {
        let none = headers(&[]);
        assert!(validate_body(&none, b"hola", 1024).is_ok());

        assert!(matches!(
            validate_body(&none, b"", 1024).unwrap_err(),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            validate_body(&headers(&[("content-length", "0")]), b"", 1024).unwrap_err(),
            ApiError::BadRequest(_)
        ));

        let exactly_limit = vec![b'x'; 1024];
        assert!(matches!(
            validate_body(&none, &exactly_limit, 1024).unwrap_err(),
            ApiError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            validate_body(&headers(&[("content-length", "4096")]), b"hola", 1024).unwrap_err(),
            ApiError::PayloadTooLarge(_)
        ));
    }
}
