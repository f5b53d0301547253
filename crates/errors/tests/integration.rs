//! Integration tests for error types

#[cfg(test)]
mod tests {
    use nxfw_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            endpoint: "https://example.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_error_display() {
        let err = NetworkError::HttpError {
            endpoint: "https://cdn.example/t/s/0100000000000816/1".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "HTTP error 404 from https://cdn.example/t/s/0100000000000816/1"
        );
    }

    #[test]
    fn test_resolve_error_names_title() {
        let err = ResolveError::MetaFailed {
            title_id: "0100000000000809".into(),
            version: 450,
            source: Box::new(
                DecodeError::Malformed {
                    message: "bad magic".into(),
                }
                .into(),
            ),
        };
        let text = err.to_string();
        assert!(text.contains("0100000000000809"));
        assert!(text.contains("bad magic"));
        assert_eq!(err.user_code(), Some("resolve.meta_failed"));
    }

    #[test]
    fn test_aggregate_collapses_single_failure() {
        let one = ResolveError::DepthExceeded {
            title_id: "0100000000000001".into(),
            limit: 4,
        };
        assert!(ResolveError::aggregate(Vec::new()).is_none());
        assert!(matches!(
            ResolveError::aggregate(vec![one.clone()]),
            Some(ResolveError::DepthExceeded { .. })
        ));
        let many = ResolveError::aggregate(vec![one.clone(), one]).unwrap();
        assert!(many.to_string().starts_with("2 downloads failed"));
    }

    #[test]
    fn test_retryable_follows_cause() {
        let err = ResolveError::ContentFailed {
            content_id: "00112233445566778899aabbccddeeff".into(),
            title_id: "0100000000000809".into(),
            source: Box::new(
                NetworkError::HttpError {
                    endpoint: "x".into(),
                    status: 503,
                }
                .into(),
            ),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::PermissionDenied { .. }));
    }
}
