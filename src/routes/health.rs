use crate::database::repository::StoreRepository;
use crate::models::health::HealthResponse;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

/// Liveness probe; also reports which storage backend is in use
#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck(repo: &State<StoreRepository>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage: repo.backend_name(),
    })
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
