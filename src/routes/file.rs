use rocket::http::{ContentType, Header};
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{MediaType, RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;

/// Non-JSON body: report downloads, stored images and QR codes.
#[derive(Debug)]
pub struct FileResponse {
    pub content_type: ContentType,
    pub body: Vec<u8>,
    /// Full `Content-Disposition` value, when the body should be saved rather than shown.
    pub disposition: Option<String>,
}

impl FileResponse {
    pub fn inline(content_type: ContentType, body: Vec<u8>) -> Self {
        Self {
            content_type,
            body,
            disposition: None,
        }
    }

    pub fn attachment(content_type: ContentType, body: Vec<u8>, disposition: String) -> Self {
        Self {
            content_type,
            body,
            disposition: Some(disposition),
        }
    }
}

impl<'r> Responder<'r, 'static> for FileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let mut response = Response::build();
        response.header(self.content_type).sized_body(self.body.len(), Cursor::new(self.body));
        if let Some(disposition) = self.disposition {
            response.header(Header::new("Content-Disposition", disposition));
        }
        response.ok()
    }
}

impl OpenApiResponderInner for FileResponse {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        let mut responses = Responses::default();
        let mut content = rocket_okapi::okapi::Map::new();
        content.insert("application/octet-stream".to_string(), MediaType::default());
        responses.responses.insert(
            "200".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "File content".to_string(),
                content,
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
