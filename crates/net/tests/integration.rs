//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use nxfw_errors::{Error, NetworkError};
    use nxfw_net::*;
    use nxfw_types::{ContentId, ContentType, MetaType, TitleId, TitleVersion};
    use std::time::Duration;

    const DEVICE_ID: &str = "6265ca8e4fe6b5a3";

    fn client_for(server: &MockServer) -> CdnClient {
        let endpoints = CdnEndpoints::new(&server.base_url(), &server.base_url()).unwrap();
        let config = TransportConfig::new(DEVICE_ID, "lp1", TitleVersion::from_parts(5, 1, 0))
            .with_endpoints(endpoints);
        CdnClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_get_latest_version() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/system_update_meta")
                .query_param("device_id", DEVICE_ID)
                .header(
                    "user-agent",
                    "NintendoSDK Firmware/5.1.0-1.0 (platform:NX; did:6265ca8e4fe6b5a3; eid:lp1)",
                );
            then.status(200).json_body(serde_json::json!({
                "timestamp": 1_600_000_000,
                "system_update_metas": [
                    {"title_id": "0100000000000816", "title_version": 738263040}
                ]
            }));
        });

        let client = client_for(&server);
        let info = client.get_latest_version().await.unwrap();

        mock.assert();
        let latest = info.latest().unwrap();
        assert_eq!(latest.title_id, TitleId::new(0x0100_0000_0000_0816));
        assert_eq!(latest.title_version, TitleVersion::new(738_263_040));
    }

    #[tokio::test]
    async fn test_malformed_version_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/system_update_meta");
            then.status(200).body("<html>maintenance</html>");
        });

        let error = client_for(&server).get_latest_version().await.unwrap_err();
        assert!(matches!(
            error,
            Error::Network(NetworkError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_meta_captures_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/t/s/0100000000000816/738263040")
                .query_param("device_id", DEVICE_ID);
            then.status(200)
                .header("X-Nintendo-Content-ID", "0123456789abcdef0123456789abcdef")
                .header("X-Nintendo-Content-Hash", "deadbeef")
                .body(b"meta blob");
        });

        let download = client_for(&server)
            .download_meta(
                TitleId::new(0x0100_0000_0000_0816),
                TitleVersion::new(738_263_040),
                MetaType::SystemUpdate,
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(
            download.content_id.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(download.content_hash.as_deref(), Some("deadbeef"));
        assert_eq!(&download.data[..], b"meta blob");
        assert!(!download.endpoint.contains("device_id"));
    }

    #[tokio::test]
    async fn test_download_content() {
        let server = MockServer::start();
        let id = ContentId::from_bytes([0x11; 16]);
        let path = format!("/c/c/{id}");
        let mock = server.mock(|when, then| {
            when.method(GET).path(path.as_str());
            then.status(200).body(b"content blob");
        });

        let download = client_for(&server)
            .download_content(&id, ContentType::Program)
            .await
            .unwrap();

        mock.assert();
        assert!(download.content_id.is_none());
        assert_eq!(&download.data[..], b"content blob");
    }

    #[tokio::test]
    async fn test_http_error_names_endpoint() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_contains("/t/a/");
            then.status(403).body("Forbidden");
        });

        let error = client_for(&server)
            .download_meta(
                TitleId::new(0x0100_0000_0000_0809),
                TitleVersion::new(1),
                MetaType::SystemTitle,
            )
            .await
            .unwrap_err();

        match error {
            Error::Network(NetworkError::HttpError { endpoint, status }) => {
                assert_eq!(status, 403);
                assert!(endpoint.ends_with("/t/a/0100000000000809/1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v1/system_update_meta");
            then.status(503);
        });

        let error = client_for(&server).get_latest_version().await.unwrap_err();
        mock.assert_hits(1);
        assert!(matches!(
            error,
            Error::Network(NetworkError::HttpError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/system_update_meta");
            then.status(200).delay(Duration::from_millis(500)).body("{}");
        });

        let endpoints = CdnEndpoints::new(&server.base_url(), &server.base_url()).unwrap();
        let mut config =
            TransportConfig::new(DEVICE_ID, "lp1", TitleVersion::new(0)).with_endpoints(endpoints);
        config.timeout = Duration::from_millis(50);
        let client = CdnClient::new(config).unwrap();

        let error = client.get_latest_version().await.unwrap_err();
        assert!(matches!(error, Error::Network(NetworkError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_missing_certificate_file() {
        let error = ClientIdentity::from_pkcs12_file(std::path::Path::new("/no/cert.pfx"), "")
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            Error::Auth(nxfw_errors::AuthError::CertificateUnreadable { .. })
        ));
    }
}
