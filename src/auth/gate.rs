use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{claims::Claims, jwt::JwtKeys},
    error::{ApiError, AuthError},
    users::repo_types::Role,
};

/// Route guard: a valid token, then optionally a specific role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    required_role: Option<Role>,
}

impl Gate {
    /// Any holder of a valid token.
    pub fn authenticated() -> Self {
        Self { required_role: None }
    }

    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    /// Runs the guards in order and stops at the first failure.
    pub fn check(&self, keys: &JwtKeys, headers: &HeaderMap) -> Result<Claims, ApiError> {
        let claims = authenticate(keys, headers)?;
        self.authorize(&claims)?;
        Ok(claims)
    }

    fn authorize(&self, claims: &Claims) -> Result<(), ApiError> {
        match self.required_role {
            Some(required) if claims.role != required => {
                warn!(user_id = claims.user_id, role = %claims.role, %required, "permission denied");
                Err(ApiError::Forbidden)
            }
            _ => Ok(()),
        }
    }
}

fn authenticate(keys: &JwtKeys, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = bearer_token(headers)?;
    Ok(keys.verify(token)?)
}

/// Reads the credential from `Authorization`. Accepts `Bearer <token>` with
/// any scheme casing, or the bare token.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest,
        _ => value,
    };
    Ok(Some(token))
}

/// Middleware state: the keys and the gate of one group of routes.
#[derive(Clone)]
pub struct Guarded {
    pub keys: JwtKeys,
    pub gate: Gate,
}

impl Guarded {
    pub fn new(keys: JwtKeys, gate: Gate) -> Self {
        Self { keys, gate }
    }
}

/// Checks the gate and attaches the caller's [`Identity`] to the request.
pub async fn enforce(
    State(guarded): State<Guarded>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = guarded.gate.check(&guarded.keys, req.headers())?;
    req.extensions_mut().insert(Identity(claims));
    Ok(next.run(req).await)
}

/// Verified claims of the current request, placed by [`enforce`].
#[derive(Debug, Clone)]
pub struct Identity(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("route is not behind a gate")))
    }
}
