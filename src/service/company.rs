use crate::database::company::CompanyRepository;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::company::{Company, CompanyRequest};
use crate::util::next_id;
use chrono::{DateTime, Utc};
use tracing::info;
use validator::Validate;

pub struct CompanyService<'a> {
    repository: &'a StoreRepository,
}

impl<'a> CompanyService<'a> {
    pub fn new(repository: &'a StoreRepository) -> Self {
        Self { repository }
    }

    /// Registers the company and marks it verified. No document or license check takes place.
    pub async fn register(&self, request: &CompanyRequest, now: DateTime<Utc>) -> Result<Company, AppError> {
        request.validate()?;

        let company = Company {
            id: next_id(now),
            name: request.name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            license_number: request.license_number.clone(),
            verified: true,
            created_at: now,
        };

        self.repository.create_company(&company).await?;
        info!(company_id = %company.id, license_number = %company.license_number, "company registered");
        Ok(company)
    }

    pub async fn current(&self) -> Result<Company, AppError> {
        self.repository.get_company().await?.ok_or(AppError::CompanyNotRegistered)
    }
}
