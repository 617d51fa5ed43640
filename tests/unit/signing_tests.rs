// Request signing and token tests

use cloudinary::signing::{sign_url_path, string_to_sign};
use cloudinary::*;
use std::collections::BTreeMap;

fn params(entries: &[(&str, &str)]) -> BTreeMap<String, ParamValue> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), ParamValue::from(*v)))
        .collect()
}

#[test]
fn test_api_signature_is_full_length_hex() {
    let mut p = params(&[("timestamp", "1315060510"), ("public_id", "sample")]);
    p.insert("tags".to_string(), ParamValue::from(vec!["a", "b"]));

    let signature = api_sign_request(&p, "abcd", SignatureAlgorithm::Sha1).unwrap();
    assert_eq!(signature, "f92c0f5257d54acdceb63d8b79e7f2ea9e3583f8");
    assert_eq!(signature.len(), 40);
}

#[test]
fn test_blank_values_do_not_change_signature() {
    let base = params(&[("public_id", "folder/file"), ("version", "1234")]);
    let mut with_blank = base.clone();
    with_blank.insert("folder".to_string(), ParamValue::from(""));

    assert_eq!(
        string_to_sign(&base).unwrap(),
        string_to_sign(&with_blank).unwrap()
    );
    assert_eq!(
        api_sign_request(&with_blank, "hdcixPpR2iKERPwqvH6sHdK9cyac", SignatureAlgorithm::Sha1)
            .unwrap(),
        "e5cc6a256aaf19dedd39c67aa2a81497f2b3f8df"
    );
}

#[test]
fn test_blank_list_does_not_change_signature() {
    let base = params(&[("public_id", "sample"), ("timestamp", "1315060510")]);
    let mut with_blank_tags = base.clone();
    with_blank_tags.insert("tags".to_string(), ParamValue::from(vec![""]));

    assert_eq!(string_to_sign(&with_blank_tags).unwrap(), "public_id=sample&timestamp=1315060510");
    assert_eq!(
        api_sign_request(&with_blank_tags, "abcd", SignatureAlgorithm::Sha1).unwrap(),
        api_sign_request(&base, "abcd", SignatureAlgorithm::Sha1).unwrap()
    );
}

#[test]
fn test_sign_request_adds_fields() {
    let mut config = Configuration::new("test123");
    config.api_key = Some("1234".to_string());
    config.api_secret = Some("abcd".to_string());

    let mut p = params(&[("public_id", "sample"), ("timestamp", "1315060510")]);
    p.insert("tags".to_string(), ParamValue::from(vec!["a", "b"]));

    let signed = sign_request(p, &config).unwrap();
    assert_eq!(
        signed.get("signature").and_then(ParamValue::as_str),
        Some("f92c0f5257d54acdceb63d8b79e7f2ea9e3583f8")
    );
    assert_eq!(signed.get("api_key").and_then(ParamValue::as_str), Some("1234"));
    assert_eq!(
        signed.get("timestamp").and_then(ParamValue::as_str),
        Some("1315060510")
    );
}

#[test]
fn test_sign_request_fills_timestamp() {
    let mut config = Configuration::new("test123");
    config.api_key = Some("1234".to_string());
    config.api_secret = Some("abcd".to_string());

    let signed = sign_request(params(&[("public_id", "sample")]), &config).unwrap();
    assert!(matches!(signed.get("timestamp"), Some(ParamValue::Int(t)) if *t > 0));
}

#[test]
fn test_sign_request_requires_credentials() {
    let config = Configuration::new("test123");
    assert_eq!(
        sign_request(BTreeMap::new(), &config).unwrap_err(),
        CloudinaryError::MissingApiKey
    );

    let mut config = Configuration::new("test123");
    config.api_key = Some("1234".to_string());
    assert_eq!(
        sign_request(BTreeMap::new(), &config).unwrap_err(),
        CloudinaryError::MissingApiSecret
    );
}

#[test]
fn test_url_signature_length_is_fixed() {
    for algorithm in [SignatureAlgorithm::Sha1, SignatureAlgorithm::Sha256] {
        let sig = sign_url_path("w_100/sample.jpg", "secret", algorithm, 8);
        assert_eq!(sig.len(), "s----".len() + 8);
    }
}

#[test]
fn test_signer_digest_lengths() {
    assert_eq!(Signer::new(SignatureAlgorithm::Sha1).digest(b"x").len(), 20);
    assert_eq!(Signer::new(SignatureAlgorithm::Sha256).digest(b"x").len(), 32);
}

#[test]
fn test_auth_token_with_ip_and_acl() {
    let token = AuthToken::new("00112233FF99")
        .ip("10.0.0.1")
        .start_time(11111111)
        .expiration(11111411)
        .acl("/image/*");
    assert_eq!(
        token.generate(None).unwrap(),
        "__cld_token__=ip=10.0.0.1~st=11111111~exp=11111411~acl=%2fimage%2f*~hmac=a403d123133a8399de60066f2a907798d0077de525496757c08701c2a9f74a41"
    );
}

#[test]
fn test_auth_token_ignores_url_when_acl_set() {
    let token = AuthToken::new("00112233FF99")
        .start_time(11111111)
        .duration(300)
        .acl("/image/*");
    assert_eq!(
        token.generate(Some("/image/upload/sample.jpg")).unwrap(),
        token.generate(None).unwrap()
    );
}

#[test]
fn test_akamai_token() {
    let token = AkamaiToken::new(
        AuthToken::new("00112233FF99")
            .start_time(11111111)
            .duration(300)
            .acl("/image/*"),
    );
    assert_eq!(
        token.generate().unwrap(),
        "__cld_token__=st=11111111~exp=11111411~acl=%2fimage%2f*~hmac=fe6d5be85e3b0d73a032b6f1d6ab9a9e6e6e589275b76b2ae00d0380b02c6d84"
    );
}
