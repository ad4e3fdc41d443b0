use crate::database::key_value::DRAFTS_KEY;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::wizard::WizardDraft;

fn wizard_not_found() -> AppError {
    AppError::NotFound("Wizard not found".to_string())
}

#[async_trait::async_trait]
pub trait WizardDraftRepository {
    async fn create_draft(&self, draft: &WizardDraft) -> Result<(), AppError>;
    async fn get_draft(&self, id: &str) -> Result<Option<WizardDraft>, AppError>;

    /// Apply `change` to the stored draft under the write lock.
    /// The draft is left as it was when `change` fails.
    async fn update_draft<R, F>(&self, id: &str, change: F) -> Result<R, AppError>
    where
        R: Send,
        F: FnOnce(&mut WizardDraft) -> Result<R, AppError> + Send;

    /// Remove the draft under the write lock once `check` accepts it.
    /// Only one caller can take a given draft.
    async fn take_draft<R, F>(&self, id: &str, check: F) -> Result<(WizardDraft, R), AppError>
    where
        R: Send,
        F: FnOnce(&WizardDraft) -> Result<R, AppError> + Send;
}

#[async_trait::async_trait]
impl WizardDraftRepository for StoreRepository {
    async fn create_draft(&self, draft: &WizardDraft) -> Result<(), AppError> {
        let draft = draft.clone();
        self.update_collection::<WizardDraft, _, _>(DRAFTS_KEY, move |drafts| {
            drafts.push(draft);
            Ok(())
        })
        .await
    }

    async fn get_draft(&self, id: &str) -> Result<Option<WizardDraft>, AppError> {
        let drafts: Vec<WizardDraft> = self.read_collection(DRAFTS_KEY).await?;
        Ok(drafts.into_iter().find(|d| d.id == id))
    }

    async fn update_draft<R, F>(&self, id: &str, change: F) -> Result<R, AppError>
    where
        R: Send,
        F: FnOnce(&mut WizardDraft) -> Result<R, AppError> + Send,
    {
        self.update_collection::<WizardDraft, _, _>(DRAFTS_KEY, move |drafts| {
            let slot = drafts.iter_mut().find(|d| d.id == id).ok_or_else(wizard_not_found)?;
            change(slot)
        })
        .await
    }

    async fn take_draft<R, F>(&self, id: &str, check: F) -> Result<(WizardDraft, R), AppError>
    where
        R: Send,
        F: FnOnce(&WizardDraft) -> Result<R, AppError> + Send,
    {
        self.update_collection::<WizardDraft, _, _>(DRAFTS_KEY, move |drafts| {
            let index = drafts.iter().position(|d| d.id == id).ok_or_else(wizard_not_found)?;
            let result = check(&drafts[index])?;
            Ok((drafts.remove(index), result))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wizard::{DriverData, WizardStep};
    use crate::test_utils::slow_repository;
    use chrono::Utc;

    fn draft(id: &str) -> WizardDraft {
        let now = Utc::now();
        WizardDraft {
            id: id.to_string(),
            session_id: "1".to_string(),
            step: WizardStep::PersonalInfo,
            driver: DriverData::default(),
            equipment: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn rejected_change_leaves_the_draft_alone() {
        let repo = StoreRepository::in_memory();
        repo.create_draft(&draft("w1")).await.unwrap();

        let result: Result<(), AppError> = repo
            .update_draft("w1", |d| {
                d.driver.name = "Ion".to_string();
                Err(AppError::BadRequest("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(repo.get_draft("w1").await.unwrap().unwrap().driver.name, "");
        assert!(matches!(repo.update_draft("w2", |_| Ok(())).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_changes_to_one_draft_are_all_kept() {
        let repo = slow_repository();
        repo.create_draft(&draft("w1")).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.update_draft("w1", move |d| {
                    d.driver.id_number.push_str(&n.to_string());
                    Ok(())
                })
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.get_draft("w1").await.unwrap().unwrap().driver.id_number.len(), 8);
    }

    #[tokio::test]
    async fn a_draft_can_be_taken_once() {
        let repo = slow_repository();
        repo.create_draft(&draft("w1")).await.unwrap();

        let first = tokio::spawn({
            let repo = repo.clone();
            async move { repo.take_draft("w1", |_| Ok(())).await }
        });
        let second = tokio::spawn({
            let repo = repo.clone();
            async move { repo.take_draft("w1", |_| Ok(())).await }
        });
        let outcomes = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
        assert!(outcomes.iter().any(|o| matches!(o, Err(AppError::NotFound(_)))));
        assert!(repo.get_draft("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refused_take_keeps_the_draft() {
        let repo = StoreRepository::in_memory();
        repo.create_draft(&draft("w1")).await.unwrap();

        let result: Result<(WizardDraft, ()), AppError> = repo.take_draft("w1", |_| Err(AppError::StepBlocked("not signed".to_string()))).await;

        assert!(matches!(result, Err(AppError::StepBlocked(_))));
        assert!(repo.get_draft("w1").await.unwrap().is_some());
    }
}
