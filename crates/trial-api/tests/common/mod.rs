#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use trial_api::routes::router;
use trial_api::state::{AppStateInner, SessionConfig};
use trial_db::Database;

pub fn setup_app() -> Router {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let session = SessionConfig {
        jwt_secret: "integration-test-secret".to_string(),
        ttl_days: 1,
        secure_cookies: false,
    };
    let state = AppStateInner::new(db, session).expect("Failed to build app state");
    router(state)
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("Router call failed")
}

pub fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// `trial_session=<token>`, ready to send back as a Cookie header.
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("trial_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn assert_redirect(resp: &Response<Body>, to: &str) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(resp), to);
}

pub async fn signup_advertiser(app: &Router, email: &str, brn: &str) -> String {
    let body = format!(
        "role=advertiser&email={email}&password=secret123&password_confirm=secret123\
         &name=Ada&contact=010-{}&terms_agreed=on&company_name=Acme+Foods\
         &business_registration_number={brn}",
        brn.replace('-', "")
    );
    let resp = send(app, post_form("/accounts/signup", &body, None)).await;
    assert_redirect(&resp, "/");
    session_cookie(&resp).expect("signup should log the advertiser in")
}

pub async fn signup_influencer(app: &Router, email: &str, contact: &str) -> String {
    let body = format!(
        "role=influencer&email={email}&password=secret123&password_confirm=secret123\
         &name=Ina&contact={contact}&terms_agreed=on&birth_date=1995-04-01\
         &sns_link=https%3A%2F%2Finstagram.example.com%2Fina"
    );
    let resp = send(app, post_form("/accounts/signup", &body, None)).await;
    assert_redirect(&resp, "/");
    session_cookie(&resp).expect("signup should log the influencer in")
}
