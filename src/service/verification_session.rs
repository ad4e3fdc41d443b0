use crate::config::LinksConfig;
use crate::database::repository::StoreRepository;
use crate::database::verification_session::VerificationSessionRepository;
use crate::error::app_error::AppError;
use crate::models::verification_session::{SessionRequest, SessionStatus, VerificationSession};
use crate::service::company::CompanyService;
use crate::service::links::{driver_link, qr_code_url, session_id_from_reference};
use crate::util::next_id;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};
use validator::Validate;

pub struct SessionService<'a> {
    repository: &'a StoreRepository,
    links: &'a LinksConfig,
}

impl<'a> SessionService<'a> {
    pub fn new(repository: &'a StoreRepository, links: &'a LinksConfig) -> Self {
        Self { repository, links }
    }

    /// Creates a session for the registered company, expiring `expires_in` days from `now`.
    pub async fn create_session(&self, request: &SessionRequest, now: DateTime<Utc>) -> Result<VerificationSession, AppError> {
        request.validate()?;
        let company = CompanyService::new(self.repository).current().await?;

        let expires_at = TimeDelta::try_days(request.expires_in)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| AppError::BadRequest(format!("expires_in of {} days is out of range", request.expires_in)))?;

        let id = next_id(now);
        let link = driver_link(&self.links.public_base_url, &id);
        let qr_code = qr_code_url(self.links, &link);

        let session = VerificationSession {
            id,
            company_id: company.id,
            company_name: company.name,
            session_name: request.session_name.clone(),
            description: request.description.clone(),
            expires_at,
            created_at: now,
            driver_link: link,
            qr_code,
            responses: 0,
            max_responses: request.max_responses,
        };

        self.repository.create_session(&session).await?;
        info!(
            session_id = %session.id,
            company_id = %session.company_id,
            expires_at = %session.expires_at,
            "verification session created"
        );
        Ok(session)
    }

    pub async fn list_sessions(&self, company_id: &str, status: Option<SessionStatus>, now: DateTime<Utc>) -> Result<Vec<VerificationSession>, AppError> {
        let sessions = self.repository.list_sessions_for_company(company_id).await?;
        Ok(match status {
            Some(status) => sessions.into_iter().filter(|s| s.status_at(now) == status).collect(),
            None => sessions,
        })
    }

    pub async fn get_session(&self, id: &str) -> Result<VerificationSession, AppError> {
        self.repository.get_session(id).await?.ok_or(AppError::SessionNotFound)
    }

    /// Looks a session up the way a driver reaches it: by id or by shared link.
    /// Unknown ids and expired sessions are refused; completed sessions are not.
    pub async fn resolve_session(&self, reference: &str, now: DateTime<Utc>) -> Result<VerificationSession, AppError> {
        let id = session_id_from_reference(reference).ok_or_else(|| AppError::BadRequest("Enter the session id".to_string()))?;
        let session = self.get_session(&id).await?;

        if session.is_expired_at(now) {
            warn!(session_id = %session.id, expires_at = %session.expires_at, "expired session accessed");
            return Err(AppError::SessionExpired);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{registered_repository, session_request};
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn session_expires_after_requested_days() {
        let (repo, company) = registered_repository().await;
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();

        let session = service.create_session(&session_request("Verificare Octombrie", 7), t).await.unwrap();

        assert_eq!(session.expires_at, t + Duration::days(7));
        assert_eq!(session.responses, 0);
        assert_eq!(session.company_id, company.id);
        assert_eq!(session.company_name, "SC Test SRL");
        assert_eq!(session.status_at(t), SessionStatus::Active);
        assert_eq!(session.driver_link, format!("http://localhost:3000/driver-portal?session={}", session.id));
        assert!(session.qr_code.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=200x200&data="));
    }

    #[tokio::test]
    async fn accessing_after_expiry_reports_expired() {
        let (repo, _) = registered_repository().await;
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let session = service.create_session(&session_request("Verificare", 7), t).await.unwrap();

        let resolved = service.resolve_session(&session.id, t + Duration::days(6)).await.unwrap();
        assert_eq!(resolved.id, session.id);

        let result = service.resolve_session(&session.id, t + Duration::days(8)).await;
        assert!(matches!(result, Err(AppError::SessionExpired)));
    }

    #[tokio::test]
    async fn unknown_and_empty_ids_are_reported() {
        let (repo, _) = registered_repository().await;
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);

        assert!(matches!(service.resolve_session("999", Utc::now()).await, Err(AppError::SessionNotFound)));
        assert!(matches!(service.resolve_session("  ", Utc::now()).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn negative_expiry_is_accepted_and_already_expired() {
        let (repo, _) = registered_repository().await;
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);
        let t = Utc::now();

        let session = service.create_session(&session_request("Trecut", -1), t).await.unwrap();

        assert_eq!(session.status_at(t), SessionStatus::Expired);
    }

    #[tokio::test]
    async fn session_requires_registered_company() {
        let repo = StoreRepository::in_memory();
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);

        let result = service.create_session(&session_request("Verificare", 7), Utc::now()).await;
        assert!(matches!(result, Err(AppError::CompanyNotRegistered)));
    }

    #[tokio::test]
    async fn session_name_is_required() {
        let (repo, _) = registered_repository().await;
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);

        let result = service.create_session(&session_request("", 7), Utc::now()).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn listing_filters_by_derived_status() {
        let (repo, company) = registered_repository().await;
        let links = LinksConfig::default();
        let service = SessionService::new(&repo, &links);
        let t = Utc::now();
        let active = service.create_session(&session_request("Activa", 7), t).await.unwrap();
        let expired = service.create_session(&session_request("Expirata", -2), t).await.unwrap();

        let all = service.list_sessions(&company.id, None, t).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_expired = service.list_sessions(&company.id, Some(SessionStatus::Expired), t).await.unwrap();
        assert_eq!(only_expired.iter().map(|s| s.id.clone()).collect::<Vec<_>>(), vec![expired.id]);

        let only_active = service.list_sessions(&company.id, Some(SessionStatus::Active), t).await.unwrap();
        assert_eq!(only_active.iter().map(|s| s.id.clone()).collect::<Vec<_>>(), vec![active.id]);

        let other_company = service.list_sessions("someone-else", None, t).await.unwrap();
        assert!(other_company.is_empty());
    }
}
