use crate::database::key_value::COMPANY_KEY;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::company::Company;

#[async_trait::async_trait]
pub trait CompanyRepository {
    async fn get_company(&self) -> Result<Option<Company>, AppError>;
    async fn create_company(&self, company: &Company) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl CompanyRepository for StoreRepository {
    async fn get_company(&self) -> Result<Option<Company>, AppError> {
        self.read_document(COMPANY_KEY).await
    }

    /// Only one company is ever registered; a second registration is refused.
    async fn create_company(&self, company: &Company) -> Result<(), AppError> {
        if self.insert_document_if_absent(COMPANY_KEY, company).await? {
            Ok(())
        } else {
            Err(AppError::CompanyAlreadyRegistered)
        }
    }
}
