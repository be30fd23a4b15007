//! Integration tests for configuration resolution through the builder.

mod common;

use std::path::PathBuf;

use ebay_rest::config::{ConfigDocument, RecordSource};
use ebay_rest::{Api, ConfigError, Error};
use serde_json::json;

use common::{not_found, MockTransport};

fn two_applications() -> ConfigDocument {
    json!({
        "applications": {
            "sandbox_1": {"app_id": "cfg-sbx", "cert_id": "SBX-1", "redirect_uri": "r1"},
            "production_1": {"app_id": "cfg-prd", "cert_id": "PRD-2", "redirect_uri": "r2"}
        },
        "users": {
            "seller": {"email_or_username": "seller", "password": "pw"}
        },
        "headers": {
            "US": {"marketplace_id": "EBAY_US", "accept_language": "en-US"}
        }
    })
    .to_string()
    .parse()
    .unwrap()
}

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ebay-rest-{}-{name}.json", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_unset_section_with_two_records_is_ambiguous() {
    let error = Api::builder()
        .document(two_applications())
        .build()
        .unwrap_err();

    assert_eq!(error.number(), 99_004);
    assert_eq!(error.detail(), "production_1, sandbox_1");
    assert!(matches!(
        error,
        Error::Config(ConfigError::Ambiguous {
            section: "applications",
            ..
        })
    ));
}

#[test]
fn test_named_records_resolve_from_document() {
    let api = Api::builder()
        .document(two_applications())
        .application("sandbox_1")
        .transport(MockTransport::new(not_found))
        .build()
        .unwrap();

    assert!(api.is_sandbox());
    assert_eq!(api.headers().marketplace_id.as_deref(), Some("EBAY_US"));
    assert_eq!(api.token_store().application().app_id(), "cfg-sbx");
}

#[test]
fn test_unknown_record_name_lists_available_records() {
    let error = Api::builder()
        .document(two_applications())
        .application("staging")
        .build()
        .unwrap_err();

    assert_eq!(error.number(), 99_003);
    assert_eq!(error.detail(), "production_1, sandbox_1");
}

#[test]
fn test_document_is_read_from_path() {
    let path = temp_config(
        "path",
        &json!({
            "applications": {"only": {"app_id": "cfg-file", "cert_id": "SBX-9", "redirect_uri": "r"}},
            "users": {"only": {"email_or_username": "u", "password": "p", "scopes": ["https://api.ebay.com/oauth/api_scope"]}},
            "headers": {"only": {"marketplace_id": "EBAY_GB", "zip": "SW1A 1AA"}}
        })
        .to_string(),
    );

    let api = Api::builder()
        .config_path(&path)
        .transport(MockTransport::new(not_found))
        .build()
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(api.headers().marketplace_id.as_deref(), Some("EBAY_GB"));
    assert_eq!(api.token_store().user_scopes().len(), 1);
}

#[test]
fn test_unreadable_path_is_reported() {
    let error = Api::builder()
        .config_path("/nonexistent/ebay_rest.json")
        .build()
        .unwrap_err();
    assert_eq!(error.number(), 99_001);
}

#[test]
fn test_malformed_document_is_reported() {
    let path = temp_config("malformed", r#"{"applications": [1, 2]}"#);
    let error = Api::builder().config_path(&path).build().unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(error.number(), 99_003);
}

#[test]
fn test_literals_need_no_document() {
    let api = Api::builder()
        .application(
            RecordSource::literal(json!({"app_id": "cfg-literal", "cert_id": "SBX-1", "redirect_uri": "r"}))
                .unwrap(),
        )
        .user(RecordSource::literal(json!({"email_or_username": "u", "password": "p"})).unwrap())
        .header(RecordSource::literal(json!({"marketplace_id": "EBAY_DE", "currency": ""})).unwrap())
        .config_path("/nonexistent/ebay_rest.json")
        .transport(MockTransport::new(not_found))
        .build()
        .unwrap();

    assert_eq!(api.headers().marketplace_id.as_deref(), Some("EBAY_DE"));
    assert_eq!(api.headers().currency, None);
}

#[test]
fn test_missing_configuration() {
    let error = Api::builder().application("anything").build().unwrap_err();
    assert_eq!(error.number(), 99_002);
}

#[test]
fn test_invalid_records_are_rejected() {
    let error = Api::builder()
        .application(RecordSource::literal(json!({"app_id": "a", "cert_id": "SBX-1"})).unwrap())
        .user(RecordSource::literal(json!({"email_or_username": "u", "password": "p"})).unwrap())
        .header(RecordSource::literal(json!({})).unwrap())
        .build()
        .unwrap_err();
    assert_eq!(error.number(), 99_005);

    let error = Api::builder()
        .application(
            RecordSource::literal(json!({"app_id": "a", "cert_id": "SBX-1", "redirect_uri": "r"}))
                .unwrap(),
        )
        .user(RecordSource::literal(json!({"email_or_username": "u", "password": "p", "shoe_size": "9"})).unwrap())
        .header(RecordSource::literal(json!({})).unwrap())
        .build()
        .unwrap_err();
    assert_eq!(error.number(), 99_005);
}

#[test]
fn test_throttle_parameters_are_validated() {
    let literal = |value: serde_json::Value| RecordSource::literal(value).unwrap();
    let builder = || {
        Api::builder()
            .application(literal(json!({"app_id": "cfg-throttle", "cert_id": "SBX-1", "redirect_uri": "r"})))
            .user(literal(json!({"email_or_username": "u", "password": "p"})))
            .header(literal(json!({})))
            .transport(MockTransport::new(not_found))
    };

    assert_eq!(builder().throttle(true).timeout(0.0).build().unwrap_err().number(), 99_007);
    assert_eq!(builder().timeout(10.0).build().unwrap_err().number(), 99_007);
    assert!(builder().throttle(true).timeout(10.0).build().is_ok());
    assert!(builder().throttle(true).timeout(-1.0).build().is_ok());
}
