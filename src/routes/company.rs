use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::company::{CompanyRequest, CompanyResponse};
use crate::service::company::CompanyService;
use chrono::Utc;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;

/// Register the transport company. Only one company can be registered.
#[openapi(tag = "Companies")]
#[post("/", data = "<payload>")]
pub async fn register_company(repo: &State<StoreRepository>, payload: JsonBody<CompanyRequest>) -> Result<Created<Json<CompanyResponse>>, AppError> {
    let company = CompanyService::new(repo).register(&payload, Utc::now()).await?;
    Ok(Created::new("/companies/current").body(Json(CompanyResponse::from(&company))))
}

/// Get the registered company
#[openapi(tag = "Companies")]
#[get("/current")]
pub async fn get_current_company(repo: &State<StoreRepository>) -> Result<Json<CompanyResponse>, AppError> {
    let company = CompanyService::new(repo).current().await?;
    Ok(Json(CompanyResponse::from(&company)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register_company, get_current_company]
}
