use axum::{
    async_trait,
    extract::{FromRequestParts, State as AxumState},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{marker::PhantomData, sync::Arc};
use tally_types::{BalancesView, Player, Rankings, MAX_PLAYERS};
use tower_http::trace::TraceLayer;

use crate::{
    service::{RESET_FORBIDDEN, SUBMIT_FORBIDDEN},
    ApiError, Service,
};

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "tally_session";

pub struct Api {
    service: Arc<Service>,
}

impl Api {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/login", get(login_form).post(login))
            .route("/logout", get(logout))
            .route("/rankings", get(rankings))
            .route("/submit", post(submit))
            .route("/balances", get(balances))
            .route("/reset", post(reset))
            .layer(TraceLayer::new_for_http())
            .with_state(self.service.clone())
    }
}

/// Pull the session token from `Authorization: Bearer` or the session cookie.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
}

fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

fn with_cookie(cookie: String, redirect: Redirect) -> Result<Response, ApiError> {
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::Internal("session cookie is not a valid header"))?;
    Ok(([(header::SET_COOKIE, cookie)], redirect).into_response())
}

/// The logged in player. Requests without a live session are redirected to
/// the login page.
pub struct CurrentUser(pub Player);

#[async_trait]
impl FromRequestParts<Arc<Service>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<Service>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;
        service
            .authenticate(token)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// A mutation only the organizer may perform.
pub trait OrganizerAction {
    /// Shown to anyone else who attempts it
    const FORBIDDEN: &'static str;
}

pub struct SubmitResults;

impl OrganizerAction for SubmitResults {
    const FORBIDDEN: &'static str = SUBMIT_FORBIDDEN;
}

pub struct ResetLedger;

impl OrganizerAction for ResetLedger {
    const FORBIDDEN: &'static str = RESET_FORBIDDEN;
}

/// The logged in organizer. Runs before the request body is read, so other
/// players are refused regardless of what they sent.
pub struct Organizer<A>(pub Player, PhantomData<fn() -> A>);

#[async_trait]
impl<A: OrganizerAction> FromRequestParts<Arc<Service>> for Organizer<A> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<Service>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, service).await?;
        if !service.is_organizer(&user) {
            return Err(ApiError::Forbidden(A::FORBIDDEN));
        }
        Ok(Organizer(user, PhantomData))
    }
}

async fn index(
    AxumState(service): AxumState<Arc<Service>>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    Json(json!({
        "user": user,
        "organizer": service.is_organizer(&user),
    }))
}

async fn login_form() -> impl IntoResponse {
    Json(json!({
        "action": "/login",
        "fields": ["username", "password"],
    }))
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(
    AxumState(service): AxumState<Arc<Service>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let token = service.login(&form.username, &form.password)?;
    with_cookie(session_cookie(&token), Redirect::to("/"))
}

async fn logout(
    AxumState(service): AxumState<Arc<Service>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers) {
        service.logout(token);
    }
    with_cookie(expired_cookie(), Redirect::to("/login"))
}

async fn rankings(
    AxumState(service): AxumState<Arc<Service>>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Rankings>, ApiError> {
    Ok(Json(service.rankings()?))
}

/// Finishing order form: `player1` is the winner. Blank or missing fields are
/// skipped without disturbing the order of the rest.
#[derive(Deserialize)]
struct SubmitForm {
    #[serde(default)]
    date: String,
    player1: Option<String>,
    player2: Option<String>,
    player3: Option<String>,
    player4: Option<String>,
    player5: Option<String>,
    player6: Option<String>,
}

impl SubmitForm {
    fn players(&self) -> Vec<&str> {
        let slots: [&Option<String>; MAX_PLAYERS] = [
            &self.player1,
            &self.player2,
            &self.player3,
            &self.player4,
            &self.player5,
            &self.player6,
        ];
        slots
            .into_iter()
            .filter_map(|slot| slot.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

async fn submit(
    AxumState(service): AxumState<Arc<Service>>,
    Organizer(user, _): Organizer<SubmitResults>,
    Form(form): Form<SubmitForm>,
) -> Result<Redirect, ApiError> {
    let players = form.players();
    service.submit(&user, &form.date, players.as_slice())?;
    Ok(Redirect::to("/balances"))
}

async fn balances(
    AxumState(service): AxumState<Arc<Service>>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<BalancesView>, ApiError> {
    Ok(Json(service.balances()?))
}

async fn reset(
    AxumState(service): AxumState<Arc<Service>>,
    Organizer(user, _): Organizer<ResetLedger>,
) -> Result<Redirect, ApiError> {
    service.reset(&user)?;
    Ok(Redirect::to("/balances"))
}
