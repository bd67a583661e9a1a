//! AWS Signature Version 4 request signing
//!
//! Only what the Bedrock runtime needs: JSON POST bodies, no query string,
//! headers `content-type`, `host`, `x-amz-date` and (for temporary
//! credentials) `x-amz-security-token`.

use super::bedrock::AwsCredentials;
use crate::{LLMError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const CONTENT_TYPE: &str = "application/json";

/// Headers to attach to a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
    pub security_token: Option<String>,
}

impl SignedHeaders {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            Some(("content-type", CONTENT_TYPE)),
            Some(("x-amz-date", self.amz_date.as_str())),
            Some(("authorization", self.authorization.as_str())),
            self.security_token
                .as_deref()
                .map(|token| ("x-amz-security-token", token)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Sign a POST of `payload` to `url`
pub(crate) fn sign_post(
    credentials: &AwsCredentials,
    region: &str,
    service: &str,
    url: &Url,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedHeaders> {
    let host = url
        .host_str()
        .ok_or_else(|| LLMError::ConfigurationError(format!("URL has no host: {url}")))?;
    let host = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let scope = format!("{date}/{region}/{service}/aws4_request");

    let mut headers = vec![
        ("content-type", CONTENT_TYPE.to_string()),
        ("host", host),
        ("x-amz-date", amz_date.clone()),
    ];
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token", token.clone()));
    }
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let mut canonical_headers = String::new();
    for (name, value) in &headers {
        let _ = writeln!(canonical_headers, "{name}:{}", value.trim());
    }

    let canonical_request = format!(
        "POST\n{}\n{}\n{canonical_headers}\n{signed_headers}\n{}",
        canonical_uri(url.path()),
        url.query().unwrap_or_default(),
        hex(&Sha256::digest(payload)),
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex(&Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(&credentials.secret_access_key, &date, region, service)?;
    let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(SignedHeaders {
        authorization: format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id
        ),
        amz_date,
        security_token: credentials.session_token.clone(),
    })
}

/// Derive the per-day signing key
fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| LLMError::CredentialsError(format!("Invalid signing key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Each path segment is encoded again, on top of the encoding already present
/// in the request URL. Every AWS service except S3 expects this.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// RFC 3986 encoding: everything except unreserved characters
pub(crate) fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credentials(token: Option<&str>) -> AwsCredentials {
        AwsCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: token.map(str::to_string),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    fn converse_url() -> Url {
        Url::parse(
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/us.anthropic.claude-3-7-sonnet-20250219-v1%3A0/converse",
        )
        .unwrap()
    }

    #[test]
    fn test_sha256_of_empty_payload() {
        assert_eq!(
            hex(&Sha256::digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hmac_sha256_known_answer() {
        // RFC 4231, test case 2
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex(&mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(
            uri_encode("us.anthropic.claude-3-7-sonnet-20250219-v1:0"),
            "us.anthropic.claude-3-7-sonnet-20250219-v1%3A0"
        );
        assert_eq!(uri_encode("a b/c~"), "a%20b%2Fc~");
    }

    #[test]
    fn test_canonical_uri_double_encodes() {
        assert_eq!(
            canonical_uri("/model/claude-v1%3A0/converse"),
            "/model/claude-v1%253A0/converse"
        );
        assert_eq!(canonical_uri(""), "/");
    }

    #[test]
    fn test_authorization_header_shape() {
        let signed = sign_post(
            &credentials(None),
            "us-east-1",
            "bedrock",
            &converse_url(),
            br#"{"messages":[]}"#,
            fixed_time(),
        )
        .unwrap();

        assert_eq!(signed.amz_date, "20250314T092653Z");
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20250314/us-east-1/bedrock/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, Signature="
        ));
        let signature = signed.authorization.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(signed.security_token.is_none());
    }

    #[test]
    fn test_signing_is_deterministic_and_payload_sensitive() {
        let sign = |payload: &[u8]| {
            sign_post(
                &credentials(None),
                "us-east-1",
                "bedrock",
                &converse_url(),
                payload,
                fixed_time(),
            )
            .unwrap()
        };
        assert_eq!(sign(b"{}"), sign(b"{}"));
        assert_ne!(sign(b"{}").authorization, sign(b"{ }").authorization);
    }

    #[test]
    fn test_session_token_is_signed() {
        let signed = sign_post(
            &credentials(Some("FwoGZXIvYXdzEXAMPLE")),
            "eu-west-1",
            "bedrock",
            &converse_url(),
            b"{}",
            fixed_time(),
        )
        .unwrap();

        assert!(
            signed
                .authorization
                .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token")
        );
        assert!(signed.authorization.contains("/eu-west-1/bedrock/"));
        let names: Vec<&str> = signed.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["content-type", "x-amz-date", "authorization", "x-amz-security-token"]
        );
    }
}
