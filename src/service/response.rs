use crate::database::driver_response::DriverResponseRepository;
use crate::database::repository::StoreRepository;
use crate::database::verification_session::VerificationSessionRepository;
use crate::error::app_error::AppError;
use crate::models::driver_response::{DriverResponse, ResponseStatus};
use crate::models::equipment::{CompletionStats, EquipmentItem};
use crate::models::verification_session::VerificationSession;
use crate::models::wizard::DriverData;
use crate::util::next_id;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info};

pub struct ResponseRecorder<'a> {
    repository: &'a StoreRepository,
    simulated_delay: Duration,
}

impl<'a> ResponseRecorder<'a> {
    pub fn new(repository: &'a StoreRepository, simulated_delay: Duration) -> Self {
        Self {
            repository,
            simulated_delay,
        }
    }

    /// Records a completed checklist and bumps the session's response counter.
    ///
    /// The two writes are not atomic: if the counter update fails the response
    /// stays stored but uncounted.
    pub async fn submit(
        &self,
        session: &VerificationSession,
        driver: &DriverData,
        equipment: &[EquipmentItem],
        now: DateTime<Utc>,
    ) -> Result<DriverResponse, AppError> {
        if !self.simulated_delay.is_zero() {
            tokio::time::sleep(self.simulated_delay).await;
        }

        let stats = CompletionStats::of(equipment);
        let response = DriverResponse {
            id: next_id(now),
            session_id: session.id.clone(),
            driver_name: driver.name.clone(),
            phone: driver.phone.clone(),
            id_number: driver.id_number.clone(),
            signature: driver.signature.clone(),
            truck_plate: driver.truck_plate.clone(),
            truck_model: driver.truck_model.clone(),
            completed_at: now,
            equipment_checked: stats.completed,
            total_equipment: stats.total,
            status: ResponseStatus::Completed,
            equipment_details: equipment.to_vec(),
        };

        self.repository.create_response(&response).await?;

        match self.repository.increment_responses(&session.id).await {
            Ok(updated) => {
                info!(
                    response_id = %response.id,
                    session_id = %session.id,
                    responses = updated.responses,
                    equipment_checked = stats.completed,
                    total_equipment = stats.total,
                    "driver response recorded"
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    error = ?e,
                    response_id = %response.id,
                    session_id = %session.id,
                    "response stored but session counter was not updated"
                );
                Err(e)
            }
        }
    }

    /// Responses to any session owned by the company.
    pub async fn list_for_company(&self, company_id: &str) -> Result<Vec<DriverResponse>, AppError> {
        let session_ids: HashSet<String> = self
            .repository
            .list_sessions_for_company(company_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let responses = self.repository.list_responses().await?;
        Ok(responses.into_iter().filter(|r| session_ids.contains(&r.session_id)).collect())
    }

    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<DriverResponse>, AppError> {
        self.repository.list_responses_for_session(session_id).await
    }

    pub async fn get(&self, id: &str) -> Result<DriverResponse, AppError> {
        self.repository
            .get_response(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Response not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::equipment::default_checklist;
    use crate::test_utils::{sample_driver, sample_session};

    fn all_checked() -> Vec<EquipmentItem> {
        let mut items = default_checklist();
        items.iter_mut().for_each(|item| item.checked = true);
        items
    }

    #[tokio::test]
    async fn full_checklist_is_recorded_and_counted() {
        let repo = StoreRepository::in_memory();
        let now = Utc::now();
        let session = sample_session("1703123456789", "company-a", now);
        repo.create_session(&session).await.unwrap();
        let recorder = ResponseRecorder::new(&repo, Duration::ZERO);

        let response = recorder.submit(&session, &sample_driver(), &all_checked(), now).await.unwrap();

        assert_eq!(response.equipment_checked, 10);
        assert_eq!(response.total_equipment, 10);
        assert_eq!(response.status, ResponseStatus::Completed);
        assert_eq!(response.completion().percentage, 100);
        assert_eq!(response.equipment_details.len(), 10);
        assert_eq!(repo.get_session(&session.id).await.unwrap().unwrap().responses, 1);
        assert_eq!(recorder.list_for_session(&session.id).await.unwrap(), vec![response]);
    }

    #[tokio::test]
    async fn concurrent_submissions_are_both_counted() {
        let repo = StoreRepository::in_memory();
        let now = Utc::now();
        let session = sample_session("1703123456789", "company-a", now);
        repo.create_session(&session).await.unwrap();

        let first_repo = repo.clone();
        let first_session = session.clone();
        let first = tokio::spawn(async move {
            ResponseRecorder::new(&first_repo, Duration::from_millis(5))
                .submit(&first_session, &sample_driver(), &default_checklist(), Utc::now())
                .await
        });
        let second_repo = repo.clone();
        let second_session = session.clone();
        let second = tokio::spawn(async move {
            ResponseRecorder::new(&second_repo, Duration::from_millis(5))
                .submit(&second_session, &sample_driver(), &default_checklist(), Utc::now())
                .await
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(repo.get_session(&session.id).await.unwrap().unwrap().responses, 2);
        assert_eq!(repo.list_responses_for_session(&session.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_session_leaves_an_uncounted_response() {
        let repo = StoreRepository::in_memory();
        let now = Utc::now();
        let session = sample_session("never-stored", "company-a", now);
        let recorder = ResponseRecorder::new(&repo, Duration::ZERO);

        let result = recorder.submit(&session, &sample_driver(), &default_checklist(), now).await;

        assert!(matches!(result, Err(AppError::SessionNotFound)));
        assert_eq!(repo.list_responses_for_session("never-stored").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn company_listing_only_includes_its_sessions() {
        let repo = StoreRepository::in_memory();
        let now = Utc::now();
        let own = sample_session("1", "company-a", now);
        let other = sample_session("2", "company-b", now);
        repo.create_session(&own).await.unwrap();
        repo.create_session(&other).await.unwrap();
        let recorder = ResponseRecorder::new(&repo, Duration::ZERO);
        let kept = recorder.submit(&own, &sample_driver(), &default_checklist(), now).await.unwrap();
        recorder.submit(&other, &sample_driver(), &default_checklist(), now).await.unwrap();

        let listed = recorder.list_for_company("company-a").await.unwrap();
        assert_eq!(listed, vec![kept.clone()]);
        assert_eq!(recorder.get(&kept.id).await.unwrap(), kept);
        assert!(matches!(recorder.get("missing").await, Err(AppError::NotFound(_))));
    }
}
