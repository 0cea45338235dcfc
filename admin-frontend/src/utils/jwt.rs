use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

use crate::gate::{Identity, IdentityMetadata};

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, alias = "app_metadata")]
    pub metadata: IdentityMetadata,
}

/// Decode JWT claims without validation
///
/// Tokens arrive directly from the identity service over a server-to-server
/// call; the front end only needs the subject and embedded metadata for the
/// session. Signature checks stay with the services that accept the token.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    // Decode the payload (second part)
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

pub fn identity_from_access_token(token: &str) -> Result<Identity> {
    let claims = decode_jwt_claims(token)?;
    Ok(Identity::new(claims.sub, claims.email).with_metadata(claims.metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(payload: &str) -> String {
        format!(
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.signature",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decode_jwt_claims() {
        let token = token(
            r#"{"sub":"user_123","email":"test@example.com","exp":9999999999,"iat":1736500000}"#,
        );

        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.metadata, IdentityMetadata::default());
    }

    #[test]
    fn test_identity_carries_app_metadata() {
        let token = token(
            r#"{"sub":"user_9","email":"ops@acme.test","exp":9999999999,
                "app_metadata":{"role":"admin","is_admin":true,"tenant_slug":"acme"}}"#,
        );

        let identity = identity_from_access_token(&token).unwrap();
        assert_eq!(identity.user_id, "user_9");
        assert!(identity.metadata.is_admin);
        assert_eq!(identity.metadata.tenant_slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_rejects_malformed_token() {
        assert!(decode_jwt_claims("not-a-jwt").is_err());
        assert!(decode_jwt_claims("a.!!!.c").is_err());
    }
}
