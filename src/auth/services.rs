pub(crate) use crate::auth::claims::Claims;
pub(crate) use crate::auth::dto::JwtKeys;
use crate::responses::found;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "contacts_session";

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            ttl: jwt.session_ttl(),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, session_id: Uuid, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: session_id,
            usr: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(session_id = %session_id, %username, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(session_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }

    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.as_secs()
        )
    }
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(|t| t.trim().to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// A logged-in session. Routes taking this extractor redirect anonymous
/// callers to `/`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers).or_else(|| cookie_token(&parts.headers))
        else {
            debug!("no session token");
            return Err(found("/", "Please log in"));
        };

        let keys = JwtKeys::from_ref(state);
        let claims = match keys.verify(&token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired session token");
                return Err(found("/", "Please log in"));
            }
        };

        if !state.sessions.is_active(claims.sub).await {
            warn!(session_id = %claims.sub, "session token for discarded session");
            return Err(found("/", "Please log in"));
        }

        Ok(AuthSession {
            id: claims.sub,
            username: claims.usr,
        })
    }
}


#[cfg(test)]
mod token_tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn keys(audience: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(b"dev-secret"),
            decoding: DecodingKey::from_secret(b"dev-secret"),
            issuer: "test-issuer".into(),
            audience: audience.into(),
            ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn sign_and_verify_session_token() {
        let keys = keys("test-aud");
        let id = Uuid::new_v4();
        let token = keys.sign(id, "admin").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, id);
        assert_eq!(claims.usr, "admin");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn verify_rejects_other_audience() {
        let token = keys("good-aud").sign(Uuid::new_v4(), "admin").expect("sign");
        assert!(keys("bad-aud").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(keys("aud").verify("not.a.token").is_err());
    }

    #[test]
    fn token_is_read_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; contacts_session=abc.def; other=1"),
        );
        assert_eq!(cookie_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn cleared_cookie_is_not_a_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("contacts_session="));
        assert_eq!(cookie_token(&headers), None);
        assert!(expired_cookie().contains("Max-Age=0"));
    }
}
