use crate::config::LinksConfig;
use crate::error::app_error::AppError;
use qrcode::QrCode;

/// Link handed to drivers: `{base}/driver-portal?session={id}`.
pub fn driver_link(public_base_url: &str, session_id: &str) -> String {
    format!(
        "{}/driver-portal?session={}",
        public_base_url.trim_end_matches('/'),
        urlencoding::encode(session_id)
    )
}

/// URL of the hosted QR image for a driver link.
pub fn qr_code_url(links: &LinksConfig, driver_link: &str) -> String {
    format!(
        "{}?size={size}x{size}&data={}",
        links.qr_service_url,
        urlencoding::encode(driver_link),
        size = links.qr_size
    )
}

/// SVG QR code of the driver link, rendered locally.
pub fn render_qr_svg(driver_link: &str, size: u32) -> Result<String, AppError> {
    let qr = QrCode::new(driver_link.as_bytes()).map_err(|e| AppError::BadRequest(format!("Failed to generate QR code: {}", e)))?;
    Ok(qr.render::<qrcode::render::svg::Color>().min_dimensions(size, size).build())
}

/// Accepts a bare session id, a `...?session=<id>` link or a `.../driver/<id>` link.
pub fn session_id_from_reference(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Some((_, query)) = reference.split_once('?') {
        let from_query = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "session")
            .and_then(|(_, value)| urlencoding::decode(value).ok())
            .map(|value| value.trim().to_string());
        if let Some(id) = from_query.filter(|id| !id.is_empty()) {
            return Some(id);
        }
    }

    if let Some((_, rest)) = reference.split_once("/driver/") {
        let id = rest.split(['/', '?', '#']).next().unwrap_or_default().trim();
        return (!id.is_empty()).then(|| id.to_string());
    }

    Some(reference.to_string())
}
