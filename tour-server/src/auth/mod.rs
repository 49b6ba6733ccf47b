//! JWT authentication and role-based authorization

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::role::UserRole;

use crate::state::AppState;

const JWT_EXPIRY_HOURS: i64 = 24;

/// JWT claims carried by every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    /// Role at token-issue time
    pub role: UserRole,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity extracted from the JWT, inserted as a request
/// extension by [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
}

/// Create a signed bearer token for a user.
pub fn create_token(
    user_id: i64,
    role: UserRole,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id,
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a bearer token; expired and malformed tokens get distinct codes.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })
}

/// Middleware that verifies the `Authorization: Bearer` header and inserts
/// an [`AuthUser`] extension for downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(AppError::not_authenticated)?;

    let claims = verify_token(token, &state.jwt_secret)?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Role gate, layered after [`auth_middleware`] on routes that restrict
/// access. Use with `middleware::from_fn`:
///
/// ```ignore
/// route_layer(middleware::from_fn(|req, next| {
///     require_roles(&[UserRole::Admin, UserRole::Manager], req, next)
/// }))
/// ```
pub async fn require_roles(
    allowed: &'static [UserRole],
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(AppError::not_authenticated)?;

    if !allowed.contains(&user.role) {
        return Err(AppError::permission_denied());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let token = create_token(42, UserRole::Manager, "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, UserRole::Manager);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = create_token(42, UserRole::Staff, "secret-a").unwrap();
        let err = verify_token(&token, "secret-b").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token_gets_its_own_code() {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: 1,
            role: UserRole::Admin,
            exp: (now - chrono::Duration::hours(2)).timestamp() as usize,
            iat: (now - chrono::Duration::hours(3)).timestamp() as usize,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let err = verify_token(&token, "test-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn garbage_token_is_invalid() {
        let err = verify_token("not.a.jwt", "test-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    mod role_gate {
        use super::*;
        use axum::body::Body;
        use axum::http::{Request as HttpRequest, StatusCode};
        use axum::routing::get;
        use axum::{middleware, Extension, Router};
        use tower::ServiceExt;

        async fn admin_manager_gate(request: Request, next: Next) -> Result<Response, AppError> {
            require_roles(&[UserRole::Admin, UserRole::Manager], request, next).await
        }

        fn gated(identity: Option<AuthUser>) -> Router {
            let app = Router::new()
                .route("/", get(|| async { "ok" }))
                .route_layer(middleware::from_fn(admin_manager_gate));
            match identity {
                Some(user) => app.layer(Extension(user)),
                None => app,
            }
        }

        async fn status_for(app: Router) -> StatusCode {
            let response = app
                .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
            response.status()
        }

        #[tokio::test]
        async fn disallowed_role_is_rejected_with_403() {
            let app = gated(Some(AuthUser {
                id: 7,
                role: UserRole::Staff,
            }));
            assert_eq!(status_for(app).await, StatusCode::FORBIDDEN);
        }

        #[tokio::test]
        async fn allowed_role_reaches_the_handler() {
            let app = gated(Some(AuthUser {
                id: 7,
                role: UserRole::Manager,
            }));
            assert_eq!(status_for(app).await, StatusCode::OK);
        }

        #[tokio::test]
        async fn missing_identity_is_rejected_with_401() {
            assert_eq!(status_for(gated(None)).await, StatusCode::UNAUTHORIZED);
        }
    }
}
