//! OAuth 1.0a HMAC-SHA1 request signing (RFC 5849)
//!
//! JSON request bodies are not part of the signature base string, so only
//! the oauth parameters and any query parameters are signed.

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;

use super::credentials::AccountCredential;

/// RFC 3986 unreserved characters are left as-is, everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Signature base string: `METHOD&enc(url)&enc(sorted params)`
fn base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&param_string)
    )
}

fn hmac_sha1(key: &str, message: &str) -> String {
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC takes any key size");
    mac.update(message.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Build the `Authorization` header value for a request.
///
/// `url` must not carry a query string; pass query parameters in `extra_params`.
pub fn authorization_header(
    credential: &AccountCredential,
    method: &str,
    url: &str,
    extra_params: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> String {
    let timestamp = timestamp.to_string();
    let oauth_params: Vec<(&str, &str)> = vec![
        ("oauth_consumer_key", credential.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", credential.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let all_params: Vec<(String, String)> = oauth_params
        .iter()
        .chain(extra_params.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let signing_key = format!(
        "{}&{}",
        encode(&credential.consumer_secret),
        encode(&credential.access_token_secret)
    );
    let signature = hmac_sha1(&signing_key, &base_string(method, url, &all_params));

    let mut header_params: Vec<(&str, String)> = oauth_params
        .iter()
        .map(|(k, v)| (*k, v.to_string()))
        .collect();
    header_params.push(("oauth_signature", signature));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {fields}")
}

/// Sign with a fresh nonce and the current time
pub fn sign_request(credential: &AccountCredential, method: &str, url: &str) -> String {
    authorization_header(
        credential,
        method,
        url,
        &[],
        &generate_nonce(),
        chrono::Utc::now().timestamp(),
    )
}
