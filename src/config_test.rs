use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_applies_defaults() {
    let cfg = BackendConfig::from_lookup(lookup_from(&[
        ("BACKEND_URL", "https://project.example.test/"),
        ("BACKEND_ANON_KEY", "anon"),
    ]))
    .unwrap();

    assert_eq!(cfg.url, "https://project.example.test");
    assert_eq!(cfg.anon_key, "anon");
    assert_eq!(cfg.media_bucket, DEFAULT_MEDIA_BUCKET);
    assert_eq!(cfg.timeouts, BackendTimeouts::default());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = BackendConfig::from_lookup(lookup_from(&[
        ("BACKEND_URL", "http://localhost:54321"),
        ("BACKEND_ANON_KEY", "anon"),
        ("MEDIA_BUCKET", "post-media"),
        ("BACKEND_REQUEST_TIMEOUT_SECS", "42"),
        ("BACKEND_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();

    assert_eq!(cfg.url, "http://localhost:54321");
    assert_eq!(cfg.media_bucket, "post-media");
    assert_eq!(cfg.timeouts, BackendTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn invalid_timeout_falls_back_to_default() {
    let cfg = BackendConfig::from_lookup(lookup_from(&[
        ("BACKEND_URL", "https://project.example.test"),
        ("BACKEND_ANON_KEY", "anon"),
        ("BACKEND_REQUEST_TIMEOUT_SECS", "soon"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn missing_url_is_reported_by_name() {
    let err = BackendConfig::from_lookup(lookup_from(&[("BACKEND_ANON_KEY", "anon")])).unwrap_err();
    assert!(matches!(err, ApiError::MissingEnv { ref var } if var == "BACKEND_URL"));
}

#[test]
fn blank_anon_key_counts_as_missing() {
    let err = BackendConfig::from_lookup(lookup_from(&[
        ("BACKEND_URL", "https://project.example.test"),
        ("BACKEND_ANON_KEY", "  "),
    ]))
    .unwrap_err();
    assert!(matches!(err, ApiError::MissingEnv { ref var } if var == "BACKEND_ANON_KEY"));
}

#[test]
fn non_http_url_is_rejected() {
    let err = BackendConfig::from_lookup(lookup_from(&[
        ("BACKEND_URL", "project.example.test"),
        ("BACKEND_ANON_KEY", "anon"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
}
