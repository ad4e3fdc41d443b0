use crate::error::app_error::AppError;

pub const COMPANY_KEY: &str = "verifiedCompany";
pub const SESSIONS_KEY: &str = "verificationSessions";
pub const RESPONSES_KEY: &str = "driverResponses";
pub const DRAFTS_KEY: &str = "wizardDrafts";

pub fn attachment_key(id: &str) -> String {
    format!("attachment:{}", id)
}

/// String-keyed, string-valued storage. Every `set` replaces the whole value;
/// there is no partial update and no transaction across keys.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: String) -> Result<(), AppError>;
    fn backend_name(&self) -> &'static str;
}
