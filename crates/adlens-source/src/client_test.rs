use super::*;

fn test_client(base_url: &str) -> AdLibraryClient {
    AdLibraryClient::with_base_url("test-token", 30, base_url, "v19.0")
        .expect("client construction should not fail")
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn search_url_targets_versioned_archive() {
    let client = test_client("https://graph.facebook.com");
    let url = client.build_search_url("running shoes", 25);
    assert_eq!(url.path(), "/v19.0/ads_archive");
    assert_eq!(query_value(&url, "access_token").as_deref(), Some("test-token"));
    assert_eq!(query_value(&url, "search_terms").as_deref(), Some("running shoes"));
    assert_eq!(query_value(&url, "ad_reached_countries").as_deref(), Some(r#"["US"]"#));
    assert_eq!(query_value(&url, "ad_active_status").as_deref(), Some("ALL"));
    assert_eq!(query_value(&url, "limit").as_deref(), Some("25"));
}

#[test]
fn search_url_strips_trailing_slash() {
    let client = test_client("https://graph.facebook.com/");
    let url = client.build_search_url("shoes", 10);
    assert!(url.as_str().starts_with("https://graph.facebook.com/v19.0/ads_archive?"));
}

#[test]
fn search_url_encodes_special_characters() {
    let client = test_client("https://graph.facebook.com");
    let url = client.build_search_url("socks & shoes", 10);
    assert!(
        url.as_str().contains("socks+%26+shoes") || url.as_str().contains("socks%20%26%20shoes"),
        "search terms should be percent-encoded: {url}"
    );
}

#[test]
fn countries_are_sent_as_json_array() {
    let client = test_client("https://graph.facebook.com")
        .with_countries(vec!["US".to_owned(), "GB".to_owned()]);
    let url = client.build_search_url("shoes", 10);
    assert_eq!(
        query_value(&url, "ad_reached_countries").as_deref(),
        Some(r#"["US","GB"]"#)
    );
}

#[test]
fn throttling_codes_map_to_rate_limited() {
    let body = serde_json::json!({
        "error": {"message": "Application request limit reached", "type": "OAuthException", "code": 4}
    });
    assert!(matches!(
        AdLibraryClient::graph_error(&body, Some(30)),
        Some(SourceError::RateLimited {
            retry_after_secs: Some(30)
        })
    ));
}

#[test]
fn other_graph_codes_map_to_api_error() {
    let body = serde_json::json!({
        "error": {"message": "", "type": "OAuthException", "code": 190}
    });
    match AdLibraryClient::graph_error(&body, None) {
        Some(SourceError::ApiError { code, message }) => {
            assert_eq!(code, 190);
            assert_eq!(message, "OAuthException");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(AdLibraryClient::graph_error(&serde_json::json!({"data": []}), None).is_none());
}
