use crate::config::Config;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::verification_session::SessionSummary;
use crate::service::verification_session::SessionService;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

async fn resolve(repo: &StoreRepository, config: &Config, reference: &str) -> Result<Json<SessionSummary>, AppError> {
    let now = Utc::now();
    let session = SessionService::new(repo, &config.links).resolve_session(reference, now).await?;
    Ok(Json(SessionSummary::from_session(&session, now)))
}

/// Resolve the session behind a shared `?session=<id>` link
#[openapi(tag = "Driver")]
#[get("/driver-portal?<session>")]
pub async fn resolve_portal_link(repo: &State<StoreRepository>, config: &State<Config>, session: Option<String>) -> Result<Json<SessionSummary>, AppError> {
    resolve(repo, config, session.as_deref().unwrap_or_default()).await
}

/// Resolve the session behind a `/driver/<id>` link
#[openapi(tag = "Driver")]
#[get("/driver/<id>")]
pub async fn resolve_driver_link(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<Json<SessionSummary>, AppError> {
    resolve(repo, config, id).await
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![resolve_portal_link, resolve_driver_link]
}

#[cfg(test)]
mod tests {
    use crate::{Config, build_rocket};
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::{Value, json};

    async fn client_with_session(expires_in: i64) -> (Client, String) {
        let client = Client::tracked(build_rocket(Config::for_tests())).await.expect("valid rocket instance");
        client
            .post("/api/v1/companies")
            .header(ContentType::JSON)
            .body(json!({ "name": "SC Test SRL", "email": "a@b.ro", "license_number": "RO123" }).to_string())
            .dispatch()
            .await;
        let session: Value = client
            .post("/api/v1/sessions")
            .header(ContentType::JSON)
            .body(json!({ "session_name": "Verificare", "expires_in": expires_in }).to_string())
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");
        let id = session["id"].as_str().expect("id").to_string();
        (client, id)
    }

    #[rocket::async_test]
    async fn both_link_forms_resolve() {
        let (client, id) = client_with_session(7).await;

        let portal = client.get(format!("/api/v1/driver-portal?session={}", id)).dispatch().await;
        assert_eq!(portal.status(), Status::Ok);
        let summary: Value = portal.into_json().await.expect("json body");
        assert_eq!(summary["company_name"], "SC Test SRL");

        let direct = client.get(format!("/api/v1/driver/{}", id)).dispatch().await;
        assert_eq!(direct.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn expired_session_is_gone() {
        let (client, id) = client_with_session(-1).await;

        let response = client.get(format!("/api/v1/driver/{}", id)).dispatch().await;
        assert_eq!(response.status(), Status::Gone);
        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(body["message"], "Verification session has expired");
    }

    #[rocket::async_test]
    async fn missing_or_unknown_session_is_reported() {
        let (client, _) = client_with_session(7).await;

        let empty = client.get("/api/v1/driver-portal").dispatch().await;
        assert_eq!(empty.status(), Status::BadRequest);

        let unknown = client.get("/api/v1/driver/999").dispatch().await;
        assert_eq!(unknown.status(), Status::NotFound);
    }
}
