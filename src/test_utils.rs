use crate::database::key_value::KeyValueStore;
use crate::database::memory_store::MemoryStore;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::attachment::AttachmentRef;
use crate::models::company::{Company, CompanyRequest};
use crate::models::verification_session::{SessionRequest, VerificationSession};
use crate::models::wizard::DriverData;
use crate::service::company::CompanyService;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// A 1x1 transparent PNG.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub fn png_bytes() -> Vec<u8> {
    let payload = PNG_DATA_URI.trim_start_matches("data:image/png;base64,");
    general_purpose::STANDARD.decode(payload).expect("valid PNG fixture")
}

pub fn sample_session(id: &str, company_id: &str, now: DateTime<Utc>) -> VerificationSession {
    VerificationSession {
        id: id.to_string(),
        company_id: company_id.to_string(),
        company_name: "SC Test SRL".to_string(),
        session_name: "Verificare Octombrie".to_string(),
        description: "Verificare lunară a echipamentelor".to_string(),
        expires_at: now + Duration::days(7),
        created_at: now,
        driver_link: format!("http://localhost:3000/driver-portal?session={}", id),
        qr_code: String::new(),
        responses: 0,
        max_responses: None,
    }
}

pub fn company_request(name: &str, email: &str, license_number: &str) -> CompanyRequest {
    CompanyRequest {
        name: name.to_string(),
        email: email.to_string(),
        phone: String::new(),
        address: String::new(),
        license_number: license_number.to_string(),
    }
}

pub fn session_request(session_name: &str, expires_in: i64) -> SessionRequest {
    SessionRequest {
        session_name: session_name.to_string(),
        description: String::new(),
        expires_in,
        max_responses: None,
    }
}

/// In-memory repository with "SC Test SRL" already registered.
pub async fn registered_repository() -> (StoreRepository, Company) {
    let repo = StoreRepository::in_memory();
    let company = CompanyService::new(&repo)
        .register(&company_request("SC Test SRL", "a@b.ro", "RO123"), Utc::now())
        .await
        .expect("register company");
    (repo, company)
}

/// Memory store that pauses on every access, like a networked backend would.
pub struct SlowStore {
    inner: MemoryStore,
    delay: std::time::Duration,
}

#[async_trait::async_trait]
impl KeyValueStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value).await
    }

    fn backend_name(&self) -> &'static str {
        "slow-memory"
    }
}

pub fn slow_repository() -> StoreRepository {
    StoreRepository::new(Arc::new(SlowStore {
        inner: MemoryStore::new(),
        delay: std::time::Duration::from_millis(2),
    }))
}

/// Slow repository with "SC Test SRL" already registered.
pub async fn registered_slow_repository() -> (StoreRepository, Company) {
    let repo = slow_repository();
    let company = CompanyService::new(&repo)
        .register(&company_request("SC Test SRL", "a@b.ro", "RO123"), Utc::now())
        .await
        .expect("register company");
    (repo, company)
}

pub fn sample_signature() -> AttachmentRef {
    AttachmentRef {
        id: "497790947d4666760ce38f3c00e852c71fdb66cae849bae8e9ede352719e1581".to_string(),
        content_type: "image/png".to_string(),
        size: 70,
    }
}

pub fn sample_driver() -> DriverData {
    DriverData {
        name: "Ion Popescu".to_string(),
        phone: "+40 700 000 000".to_string(),
        id_number: "RX123456".to_string(),
        truck_plate: "B-123-ABC".to_string(),
        truck_model: "Volvo FH".to_string(),
        signature: Some(sample_signature()),
    }
}
