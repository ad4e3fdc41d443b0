use crate::config::Config;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::middleware::RequestId;
use crate::models::driver_response::{DriverResponseView, SubmissionResponse};
use crate::models::equipment::EquipmentUpdateRequest;
use crate::models::wizard::{PersonalInfoRequest, SignatureRequest, StartWizardRequest, TruckInfoRequest, WizardDraft, WizardResponse};
use crate::service::wizard::WizardService;
use chrono::Utc;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, get, post, put};
use rocket_okapi::openapi;
use tracing::info;

async fn respond(service: &WizardService<'_>, draft: &WizardDraft) -> Result<Json<WizardResponse>, AppError> {
    Ok(Json(service.view(draft, Utc::now()).await?))
}

/// Start a driver wizard on a session id or shared link
#[openapi(tag = "Wizard")]
#[post("/", data = "<payload>")]
pub async fn start_wizard(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    payload: JsonBody<StartWizardRequest>,
) -> Result<Created<Json<WizardResponse>>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.start(&payload.session_id, Utc::now()).await?;
    let view = respond(&service, &draft).await?;
    Ok(Created::new(format!("/wizards/{}", draft.id)).body(view))
}

#[openapi(tag = "Wizard")]
#[get("/<id>")]
pub async fn get_wizard(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.load(id).await?;
    respond(&service, &draft).await
}

/// Name, phone and identity document number
#[openapi(tag = "Wizard")]
#[put("/<id>/personal", data = "<payload>")]
pub async fn put_personal_info(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    id: &str,
    payload: JsonBody<PersonalInfoRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.update_personal(id, &payload, Utc::now()).await?;
    respond(&service, &draft).await
}

/// Truck plate (stored upper-cased) and model
#[openapi(tag = "Wizard")]
#[put("/<id>/truck", data = "<payload>")]
pub async fn put_truck_info(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    id: &str,
    payload: JsonBody<TruckInfoRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.update_truck(id, &payload, Utc::now()).await?;
    respond(&service, &draft).await
}

/// Update one checklist item; the photo is a data URI
#[openapi(tag = "Wizard")]
#[put("/<id>/equipment/<item_id>", data = "<payload>")]
pub async fn put_equipment_item(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    id: &str,
    item_id: &str,
    payload: JsonBody<EquipmentUpdateRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.update_equipment(id, item_id, &payload, Utc::now()).await?;
    respond(&service, &draft).await
}

#[openapi(tag = "Wizard")]
#[put("/<id>/signature", data = "<payload>")]
pub async fn put_signature(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    id: &str,
    payload: JsonBody<SignatureRequest>,
) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.set_signature(id, &payload, Utc::now()).await?;
    respond(&service, &draft).await
}

/// Move to the next step; refused with 409 while the current step is incomplete
#[openapi(tag = "Wizard")]
#[post("/<id>/advance")]
pub async fn advance_wizard(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.advance(id, Utc::now()).await?;
    respond(&service, &draft).await
}

#[openapi(tag = "Wizard")]
#[post("/<id>/back")]
pub async fn back_wizard(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<Json<WizardResponse>, AppError> {
    let service = WizardService::new(repo, config);
    let draft = service.back(id, Utc::now()).await?;
    respond(&service, &draft).await
}

/// Submit the checklist. Requires the signature step and a signature.
#[openapi(tag = "Wizard")]
#[post("/<id>/submit")]
pub async fn submit_wizard(
    repo: &State<StoreRepository>,
    config: &State<Config>,
    request_id: RequestId,
    id: &str,
) -> Result<Created<Json<SubmissionResponse>>, AppError> {
    let response = WizardService::new(repo, config).submit(id, Utc::now()).await?;
    info!(request_id = %request_id.0, response_id = %response.id, "checklist submitted");

    Ok(Created::new(format!("/responses/{}", response.id)).body(Json(SubmissionResponse {
        message: "Verificarea a fost trimisă cu succes!".to_string(),
        response: DriverResponseView::from(&response),
    })))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![
        start_wizard,
        get_wizard,
        put_personal_info,
        put_truck_info,
        put_equipment_item,
        put_signature,
        advance_wizard,
        back_wizard,
        submit_wizard
    ]
}
