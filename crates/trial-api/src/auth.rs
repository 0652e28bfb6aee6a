use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use minijinja::context;
use serde::Deserialize;
use tracing::{info, warn};

use trial_types::api::{LoginForm, SignupForm};
use trial_types::models::User;

use crate::error::ServiceError;
use crate::flash::{self, Level};
use crate::forms::{FormErrors, validate_signup};
use crate::middleware::{CurrentUser, clear_session, create_token, safe_next, session_cookie};
use crate::services::accounts;
use crate::state::{AppState, blocking, today};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub async fn signup_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Response {
    if user.claims().is_some() {
        return Redirect::to("/").into_response();
    }
    signup_form(&state, jar, &SignupForm::default(), &FormErrors::default())
}

pub async fn signup(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Response {
    if user.claims().is_some() {
        return Redirect::to("/").into_response();
    }

    let dto = match validate_signup(&form, today()) {
        Ok(dto) => dto,
        Err(errors) => return signup_form(&state, jar, &form, &errors),
    };

    match blocking(&state, move |s| accounts::signup(&s.db, &dto)).await {
        Ok(user) => {
            let jar = flash::push(jar, Level::Success, "Welcome! Your account has been created.");
            start_session(&state, jar, &user, "/")
        }
        Err(e) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(e.user_message());
            signup_form(&state, jar, &form, &errors)
        }
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
) -> Response {
    if user.claims().is_some() {
        return Redirect::to("/").into_response();
    }
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    login_form(&state, jar, &form, None)
}

pub async fn login(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if user.claims().is_some() {
        return Redirect::to("/").into_response();
    }

    let (email, password) = (form.email.clone(), form.password.clone());
    match blocking(&state, move |s| accounts::authenticate(&s.db, &email, &password)).await {
        Ok(Some(user)) => {
            let target = safe_next(form.next.as_deref()).to_string();
            let jar = flash::push(jar, Level::Success, format!("Welcome back, {}.", user.name));
            start_session(&state, jar, &user, &target)
        }
        Ok(None) => {
            warn!("Failed login for {}", form.email);
            login_form(&state, jar, &form, Some("Invalid email or password."))
        }
        Err(e) => login_form(&state, jar, &form, Some(&e.user_message())),
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = flash::push(clear_session(jar), Level::Info, "You have been logged out.");
    (jar, Redirect::to("/")).into_response()
}

fn start_session(state: &AppState, jar: CookieJar, user: &User, to: &str) -> Response {
    match create_token(&state.session, user) {
        Ok(token) => {
            info!("User {} logged in as {}", user.id, user.role);
            let jar = jar.add(session_cookie(&state.session, token));
            (jar, Redirect::to(to)).into_response()
        }
        Err(e) => ServiceError::Internal(e).redirect(jar, "/accounts/login"),
    }
}

fn signup_form(state: &AppState, jar: CookieJar, form: &SignupForm, errors: &FormErrors) -> Response {
    state.templates.page(
        jar,
        None,
        "signup.html",
        context! { form => form, errors => errors },
    )
}

fn login_form(state: &AppState, jar: CookieJar, form: &LoginForm, error: Option<&str>) -> Response {
    state.templates.page(
        jar,
        None,
        "login.html",
        context! { form => form, error => error },
    )
}
