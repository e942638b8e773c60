//! HTTP/transport error mapping shared by the two HTTP adapter variants.
//!
//! Grounded on the pack's per-provider `error.rs` modules
//! (`map_http_status`/`map_reqwest_error`), adapted to the router's
//! seven-variant [`ErrorKind`] instead of a provider-specific error enum.

use router_types::RouterError;

/// Map an HTTP response status/body to a [`RouterError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> RouterError {
    match status.as_u16() {
        404 => RouterError::model_unavailable(format!("model not found: {body}")),
        400..=499 => RouterError::backend(format!("HTTP {status}: {body}")),
        500..=599 => RouterError::backend(format!("HTTP {status}: {body}")),
        _ => RouterError::backend(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to a [`RouterError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RouterError {
    if err.is_timeout() {
        RouterError::timeout(err.to_string())
    } else {
        RouterError::backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_types::ErrorKind;

    #[test]
    fn status_404_maps_to_model_unavailable() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "no such model");
        assert_eq!(err.kind, ErrorKind::ModelUnavailable);
    }

    #[test]
    fn status_500_maps_to_backend() {
        let err = map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.kind, ErrorKind::Backend);
        assert!(err.kind.is_retryable());
    }

    #[test]
    fn status_400_maps_to_backend_not_validation() {
        // A malformed upstream request is a backend-integration fault, not a
        // caller-facing validation error — the router already validated its
        // own parameters before this call was ever made.
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad body");
        assert_eq!(err.kind, ErrorKind::Backend);
    }
}
