#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// 2048-bit RSA key used only by tests.
pub const TEST_RSA_PRIVATE_KEY: &str = include_str!("test_rsa_key.pem");
pub const TEST_RSA_PUBLIC_KEY: &str = include_str!("test_rsa_pub.pem");
/// The same key as an RSA JWK.
pub const TEST_RSA_PRIVATE_JWK: &str = include_str!("test_rsa_key.jwk.json");

/// Decode the claims segment of a compact JWT without verifying it.
pub fn jwt_claims(token: &str) -> serde_json::Value {
    let payload = token.split('.').nth(1).expect("jwt has a payload segment");
    let bytes = URL_SAFE_NO_PAD.decode(payload).expect("payload is base64url");
    serde_json::from_slice(&bytes).expect("payload is json")
}

/// Decode the header segment of a compact JWT.
pub fn jwt_header(token: &str) -> serde_json::Value {
    let header = token.split('.').next().expect("jwt has a header segment");
    let bytes = URL_SAFE_NO_PAD.decode(header).expect("header is base64url");
    serde_json::from_slice(&bytes).expect("header is json")
}

/// Parse an `application/x-www-form-urlencoded` body.
pub fn form_fields(body: &[u8]) -> Vec<(String, String)> {
    let body = std::str::from_utf8(body).expect("form body is utf-8");
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

pub fn form_value(body: &[u8], key: &str) -> Option<String> {
    form_fields(body)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .expect("valid percent-encoding")
        .into_owned()
}
