//! AWS Signature Version 4 for JSON-protocol `POST` requests.
//!
//! Only the subset the listing calls need: no query string, a fixed
//! set of headers, a body hashed in full.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::credentials::Credentials;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything the signature covers besides credentials and time.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    pub service: &'a str,
    pub region: &'a str,
    /// Host header value, including a non-default port
    pub host: &'a str,
    /// Already percent-encoded request path, `/` for regional endpoints
    pub path: &'a str,
    pub content_type: &'a str,
    pub target: &'a str,
    pub body: &'a [u8],
}

/// Headers to attach to the outgoing request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
    pub security_token: Option<String>,
}

pub fn sign(
    credentials: &Credentials,
    request: &SigningRequest<'_>,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let scope = format!("{date}/{}/{}/aws4_request", request.region, request.service);

    let mut headers: Vec<(&str, &str)> = vec![
        ("content-type", request.content_type),
        ("host", request.host),
        ("x-amz-date", amz_date.as_str()),
        ("x-amz-target", request.target),
    ];
    if let Some(token) = credentials.session_token.as_deref() {
        headers.push(("x-amz-security-token", token));
    }
    headers.sort_by(|a, b| a.0.cmp(b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", value.trim()))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "POST\n{}\n\n{canonical_headers}\n{signed_headers}\n{}",
        request.path,
        sha256_hex(request.body)
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(
        &credentials.secret_access_key,
        &date,
        request.region,
        request.service,
    );
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    SignedHeaders {
        authorization: format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id
        ),
        amz_date,
        security_token: credentials.session_token.clone(),
    }
}

/// Derives the per-day, per-region, per-service signing key.
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA-256 accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn example_request(body: &[u8]) -> SigningRequest<'_> {
        SigningRequest {
            service: "secretsmanager",
            region: "us-east-1",
            host: "secretsmanager.us-east-1.amazonaws.com",
            path: "/",
            content_type: "application/x-amz-json-1.1",
            target: "secretsmanager.ListSecrets",
            body,
        }
    }

    #[test]
    fn signing_key_matches_published_example() {
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn empty_body_hash_is_well_known() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn authorization_header_carries_scope_and_signed_headers() {
        let creds = Credentials::new("AKIDEXAMPLE", "secret", None);
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 7).unwrap();

        let signed = sign(&creds, &example_request(b"{}"), now);

        assert_eq!(signed.amz_date, "20240309T080507Z");
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240309/us-east-1/secretsmanager/aws4_request, "
        ));
        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-target, "));
        let signature = signed.authorization.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signed.security_token.is_none());
    }

    #[test]
    fn session_token_is_signed_when_present() {
        let creds = Credentials::new("AKIDEXAMPLE", "secret", Some("session".to_string()));
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 7).unwrap();

        let signed = sign(&creds, &example_request(b"{}"), now);

        assert!(signed.authorization.contains(
            "SignedHeaders=content-type;host;x-amz-date;x-amz-security-token;x-amz-target, "
        ));
        assert_eq!(signed.security_token.as_deref(), Some("session"));
    }

    #[test]
    fn signature_depends_on_body() {
        let creds = Credentials::new("AKIDEXAMPLE", "secret", None);
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 7).unwrap();

        let a = sign(&creds, &example_request(b"{}"), now);
        let b = sign(&creds, &example_request(br#"{"NextToken":"abc"}"#), now);
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn signature_covers_request_path() {
        let creds = Credentials::new("AKIDEXAMPLE", "secret", None);
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 7).unwrap();

        let root = sign(&creds, &example_request(b"{}"), now);
        let proxied = sign(
            &creds,
            &SigningRequest {
                path: "/proxy/",
                ..example_request(b"{}")
            },
            now,
        );
        assert_ne!(root.authorization, proxied.authorization);
    }
}
