use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tower_sessions::Session;

use crate::gate::Identity;
use crate::services::session_identity::{ACCESS_TOKEN_KEY, IDENTITY_KEY};

/// What pages show about the signed-in user.
#[derive(Debug, Serialize, Clone)]
pub struct UserProfile {
    pub email: String,
}

impl UserProfile {
    pub fn name(&self) -> String {
        self.email.split('@').next().unwrap_or("User").to_string()
    }

    pub fn initials(&self) -> String {
        let initials: String = self.name().chars().take(2).collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// Identity extracted from the session.
///
/// Routes behind a gate can rely on it; elsewhere a missing session
/// redirects to login.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl CurrentIdentity {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self
                .0
                .email
                .clone()
                .unwrap_or_else(|| self.0.user_id.clone()),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let access_token: Option<String> = session.get(ACCESS_TOKEN_KEY).await.unwrap_or(None);
        let identity: Option<Identity> = session.get(IDENTITY_KEY).await.unwrap_or(None);

        match (access_token, identity) {
            (Some(_), Some(identity)) => Ok(CurrentIdentity(identity)),
            _ => Err(Redirect::to("/login").into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_initials() {
        let profile = UserProfile {
            email: "dispatch@acme.test".to_string(),
        };
        assert_eq!(profile.name(), "dispatch");
        assert_eq!(profile.initials(), "DI");

        let short = UserProfile {
            email: "@acme.test".to_string(),
        };
        assert_eq!(short.initials(), "U");
    }
}
