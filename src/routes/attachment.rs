use crate::config::Config;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::routes::file::FileResponse;
use crate::service::attachment::AttachmentService;
use rocket::http::ContentType;
use rocket::{State, get};
use rocket_okapi::openapi;

/// Raw bytes of an uploaded signature or equipment photo
#[openapi(tag = "Attachments")]
#[get("/<id>")]
pub async fn get_attachment(repo: &State<StoreRepository>, config: &State<Config>, id: &str) -> Result<FileResponse, AppError> {
    let image = AttachmentService::new(repo, &config.attachments).load(id).await?;
    let content_type = ContentType::parse_flexible(&image.content_type).unwrap_or(ContentType::Binary);
    Ok(FileResponse::inline(content_type, image.bytes))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_attachment]
}
