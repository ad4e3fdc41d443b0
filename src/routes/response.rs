use crate::config::Config;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::driver_response::DriverResponseView;
use crate::routes::file::FileResponse;
use crate::service::attachment::AttachmentService;
use crate::service::company::CompanyService;
use crate::service::report::ReportExporter;
use crate::service::response::ResponseRecorder;
use crate::service::verification_session::SessionService;
use chrono::Utc;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use std::time::Duration;
use tracing::{info, warn};

/// All responses submitted to the company's sessions
#[openapi(tag = "Responses")]
#[get("/")]
pub async fn list_responses(repo: &State<StoreRepository>) -> Result<Json<Vec<DriverResponseView>>, AppError> {
    let company = CompanyService::new(repo).current().await?;
    let responses = ResponseRecorder::new(repo, Duration::ZERO).list_for_company(&company.id).await?;
    Ok(Json(responses.iter().map(DriverResponseView::from).collect()))
}

#[openapi(tag = "Responses")]
#[get("/<id>")]
pub async fn get_response(repo: &State<StoreRepository>, id: &str) -> Result<Json<DriverResponseView>, AppError> {
    let response = ResponseRecorder::new(repo, Duration::ZERO).get(id).await?;
    Ok(Json(DriverResponseView::from(&response)))
}

/// Download the HTML verification report
#[openapi(tag = "Responses")]
#[get("/<id>/report")]
pub async fn download_report(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<FileResponse, AppError> {
    let response = ResponseRecorder::new(repo, Duration::ZERO).get(id).await?;
    let session = SessionService::new(repo, &config.links).get_session(&response.session_id).await?;

    let signature = match &response.signature {
        Some(attachment) => {
            let data_uri = AttachmentService::new(repo, &config.attachments).data_uri(attachment).await?;
            if data_uri.is_none() {
                warn!(response_id = %response.id, attachment_id = %attachment.id, "signature image missing from storage");
            }
            data_uri
        }
        None => None,
    };

    let report = ReportExporter::from_config(&config.report)?.render(&response, &session, signature.as_deref(), Utc::now());
    info!(response_id = %response.id, filename = %report.filename, "report exported");

    let disposition = report.content_disposition();
    Ok(FileResponse::attachment(ContentType::HTML, report.html.into_bytes(), disposition))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_responses, get_response, download_report]
}
