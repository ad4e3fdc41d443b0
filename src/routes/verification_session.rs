use crate::config::Config;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::driver_response::DriverResponseView;
use crate::models::verification_session::{SessionRequest, SessionResponse, SessionStatus};
use crate::routes::file::FileResponse;
use crate::service::company::CompanyService;
use crate::service::links::render_qr_svg;
use crate::service::response::ResponseRecorder;
use crate::service::verification_session::SessionService;
use chrono::Utc;
use rocket::http::ContentType;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use std::time::Duration;

/// Create a verification session for the registered company
#[openapi(tag = "Sessions")]
#[post("/", data = "<payload>")]
pub async fn create_session(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    payload: JsonBody<SessionRequest>,
) -> Result<Created<Json<SessionResponse>>, AppError> {
    let now = Utc::now();
    let session = SessionService::new(repo, &config.links).create_session(&payload, now).await?;
    Ok(Created::new(format!("/sessions/{}", session.id)).body(Json(SessionResponse::from_session(&session, now))))
}

/// List the company's sessions, optionally filtered by status
#[openapi(tag = "Sessions")]
#[get("/?<status>")]
pub async fn list_sessions(repo: &State<StoreRepository>, config: &State<Config>, status: Option<SessionStatus>) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let now = Utc::now();
    let company = CompanyService::new(repo).current().await?;
    let sessions = SessionService::new(repo, &config.links).list_sessions(&company.id, status, now).await?;
    Ok(Json(sessions.iter().map(|s| SessionResponse::from_session(s, now)).collect()))
}

#[openapi(tag = "Sessions")]
#[get("/<id>")]
pub async fn get_session(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<Json<SessionResponse>, AppError> {
    let session = SessionService::new(repo, &config.links).get_session(id).await?;
    Ok(Json(SessionResponse::from_session(&session, Utc::now())))
}

/// QR code of the driver link as SVG
#[openapi(tag = "Sessions")]
#[get("/<id>/qr")]
pub async fn get_session_qr(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<FileResponse, AppError> {
    let session = SessionService::new(repo, &config.links).get_session(id).await?;
    let svg = render_qr_svg(&session.driver_link, config.links.qr_size)?;
    Ok(FileResponse::inline(ContentType::SVG, svg.into_bytes()))
}

#[openapi(tag = "Sessions")]
#[get("/<id>/responses")]
pub async fn list_session_responses(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<Json<Vec<DriverResponseView>>, AppError> {
    let session = SessionService::new(repo, &config.links).get_session(id).await?;
    let responses = ResponseRecorder::new(repo, Duration::ZERO).list_for_session(&session.id).await?;
    Ok(Json(responses.iter().map(DriverResponseView::from).collect()))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_session, list_sessions, get_session, get_session_qr, list_session_responses]
}
