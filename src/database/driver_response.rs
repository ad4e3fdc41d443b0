use crate::database::key_value::RESPONSES_KEY;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::driver_response::DriverResponse;

#[async_trait::async_trait]
pub trait DriverResponseRepository {
    async fn create_response(&self, response: &DriverResponse) -> Result<(), AppError>;
    async fn list_responses(&self) -> Result<Vec<DriverResponse>, AppError>;
    async fn list_responses_for_session(&self, session_id: &str) -> Result<Vec<DriverResponse>, AppError>;
    async fn get_response(&self, id: &str) -> Result<Option<DriverResponse>, AppError>;
}

#[async_trait::async_trait]
impl DriverResponseRepository for StoreRepository {
    async fn create_response(&self, response: &DriverResponse) -> Result<(), AppError> {
        let response = response.clone();
        self.update_collection::<DriverResponse, _, _>(RESPONSES_KEY, move |responses| {
            responses.push(response);
            Ok(())
        })
        .await
    }

    async fn list_responses(&self) -> Result<Vec<DriverResponse>, AppError> {
        self.read_collection(RESPONSES_KEY).await
    }

    async fn list_responses_for_session(&self, session_id: &str) -> Result<Vec<DriverResponse>, AppError> {
        let responses = self.list_responses().await?;
        Ok(responses.into_iter().filter(|r| r.session_id == session_id).collect())
    }

    async fn get_response(&self, id: &str) -> Result<Option<DriverResponse>, AppError> {
        let responses = self.list_responses().await?;
        Ok(responses.into_iter().find(|r| r.id == id))
    }
}
