use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use url::form_urlencoded::byte_serialize;

use trial_types::api::Claims;
use trial_types::models::User;
use trial_types::status::Role;

use crate::state::{AppState, SessionConfig};

pub const SESSION_COOKIE: &str = "trial_session";

/// The logged-in user for this request, if any. Inserted on every request
/// by [`load_session`].
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Claims>);

impl CurrentUser {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
}

/// Decode the session cookie, if present and valid, into a [`CurrentUser`].
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|c| decode_token(&state.session, c.value()));

    req.extensions_mut().insert(CurrentUser(claims));
    next.run(req).await
}

pub async fn require_advertiser(req: Request, next: Next) -> Response {
    require_role(Role::Advertiser, req, next).await
}

pub async fn require_influencer(req: Request, next: Next) -> Response {
    require_role(Role::Influencer, req, next).await
}

/// Anonymous → login page with `next`; wrong role → 403.
/// On success the [`Claims`] are available as an extension.
async fn require_role(role: Role, mut req: Request, next: Next) -> Response {
    let claims = req
        .extensions()
        .get::<CurrentUser>()
        .and_then(|u| u.0.clone());

    let Some(claims) = claims else {
        let path = req
            .uri()
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");
        return Redirect::to(&login_url(path)).into_response();
    };

    if claims.role != role {
        debug!(
            "User {} ({}) denied {} route {}",
            claims.sub,
            claims.role,
            role,
            req.uri().path()
        );
        return forbidden();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

const FORBIDDEN_PAGE: &str = "<!doctype html><html><head><title>Forbidden</title></head>\
<body><h1>403 Forbidden</h1><p>You do not have permission to access this page.</p>\
<p><a href=\"/\">Back to home</a></p></body></html>";

pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Html(FORBIDDEN_PAGE)).into_response()
}

pub fn login_url(next: &str) -> String {
    format!("/accounts/login?next={}", encode_query_value(next))
}

/// Only same-site absolute paths are honored as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n,
        _ => "/",
    }
}

pub fn create_token(session: &SessionConfig, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::days(session.ttl_days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(session.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(session: &SessionConfig, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(session.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| debug!("Rejected session token: {}", e))
    .ok()
}

pub fn session_cookie(session: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(session.secure_cookies)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn encode_query_value(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}
