use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{load_session, require_advertiser, require_influencer};
use crate::state::AppState;
use crate::{auth, campaigns, proposals};

/// The whole site. Role-guarded groups use `route_layer` so unknown paths
/// still fall through to the 404 page.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(campaigns::home))
        .route("/campaigns/{id}", get(campaigns::detail))
        .route("/accounts/signup", get(auth::signup_page).post(auth::signup))
        .route("/accounts/login", get(auth::login_page).post(auth::login))
        .route("/accounts/logout", post(auth::logout))
        .route("/health", get(health));

    let influencer_routes = Router::new()
        .route(
            "/campaigns/{id}/apply",
            get(proposals::apply_page).post(proposals::apply),
        )
        .route("/proposals", get(proposals::my_proposals))
        .route_layer(middleware::from_fn(require_influencer));

    let advertiser_routes = Router::new()
        .route("/manage/campaigns", get(campaigns::manage))
        .route("/manage/campaigns/create", post(campaigns::create))
        .route("/manage/{id}", get(campaigns::advertiser_detail))
        .route("/manage/{id}/close", post(campaigns::close))
        .route("/manage/{id}/select", post(campaigns::select))
        .route_layer(middleware::from_fn(require_advertiser));

    Router::new()
        .merge(public_routes)
        .merge(influencer_routes)
        .merge(advertiser_routes)
        .fallback(campaigns::fallback)
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
