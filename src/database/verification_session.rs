use crate::database::key_value::SESSIONS_KEY;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::verification_session::VerificationSession;

#[async_trait::async_trait]
pub trait VerificationSessionRepository {
    async fn create_session(&self, session: &VerificationSession) -> Result<(), AppError>;
    async fn list_sessions(&self) -> Result<Vec<VerificationSession>, AppError>;
    async fn list_sessions_for_company(&self, company_id: &str) -> Result<Vec<VerificationSession>, AppError>;
    async fn get_session(&self, id: &str) -> Result<Option<VerificationSession>, AppError>;
    async fn increment_responses(&self, id: &str) -> Result<VerificationSession, AppError>;
}

#[async_trait::async_trait]
impl VerificationSessionRepository for StoreRepository {
    async fn create_session(&self, session: &VerificationSession) -> Result<(), AppError> {
        let session = session.clone();
        self.update_collection::<VerificationSession, _, _>(SESSIONS_KEY, move |sessions| {
            sessions.push(session);
            Ok(())
        })
        .await
    }

    async fn list_sessions(&self) -> Result<Vec<VerificationSession>, AppError> {
        self.read_collection(SESSIONS_KEY).await
    }

    async fn list_sessions_for_company(&self, company_id: &str) -> Result<Vec<VerificationSession>, AppError> {
        let sessions = self.list_sessions().await?;
        Ok(sessions.into_iter().filter(|s| s.company_id == company_id).collect())
    }

    async fn get_session(&self, id: &str) -> Result<Option<VerificationSession>, AppError> {
        let sessions = self.list_sessions().await?;
        Ok(sessions.into_iter().find(|s| s.id == id))
    }

    async fn increment_responses(&self, id: &str) -> Result<VerificationSession, AppError> {
        self.update_collection::<VerificationSession, _, _>(SESSIONS_KEY, |sessions| {
            let session = sessions.iter_mut().find(|s| s.id == id).ok_or(AppError::SessionNotFound)?;
            session.responses += 1;
            Ok(session.clone())
        })
        .await
    }
}
