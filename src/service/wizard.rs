use crate::config::Config;
use crate::database::repository::StoreRepository;
use crate::database::wizard_draft::WizardDraftRepository;
use crate::error::app_error::AppError;
use crate::models::attachment::AttachmentRef;
use crate::models::driver_response::DriverResponse;
use crate::models::equipment::{CompletionStats, EquipmentItem, EquipmentItemResponse, EquipmentUpdateRequest, default_checklist};
use crate::models::verification_session::SessionSummary;
use crate::models::wizard::{DriverData, DriverDataResponse, PersonalInfoRequest, SignatureRequest, TruckInfoRequest, WizardDraft, WizardResponse, WizardStep};
use crate::service::attachment::AttachmentService;
use crate::service::response::ResponseRecorder;
use crate::service::verification_session::SessionService;
use crate::util::next_id;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info};
use validator::Validate;

/// Per-item checklist change. `None` leaves the field as it is.
#[derive(Debug, Default, Clone)]
pub struct EquipmentChange {
    pub checked: Option<bool>,
    pub comments: Option<String>,
    pub quantity: Option<u32>,
    pub photo: Option<AttachmentRef>,
}

/// The driver-side form: step, collected data and checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverWizard {
    step: WizardStep,
    driver: DriverData,
    equipment: Vec<EquipmentItem>,
}

impl Default for DriverWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::EnterSession,
            driver: DriverData::default(),
            equipment: default_checklist(),
        }
    }

    pub fn from_draft(draft: &WizardDraft) -> Self {
        Self {
            step: draft.step,
            driver: draft.driver.clone(),
            equipment: draft.equipment.clone(),
        }
    }

    pub fn write_to(&self, draft: &mut WizardDraft) {
        draft.step = self.step;
        draft.driver = self.driver.clone();
        draft.equipment = self.equipment.clone();
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn driver(&self) -> &DriverData {
        &self.driver
    }

    pub fn equipment(&self) -> &[EquipmentItem] {
        &self.equipment
    }

    pub fn completion(&self) -> CompletionStats {
        CompletionStats::of(&self.equipment)
    }

    /// Called once the session has been resolved.
    pub fn start(&mut self) {
        self.step = WizardStep::PersonalInfo;
    }

    /// Only the immediate next step can be entered, and only once its guard holds.
    pub fn can_proceed_to(&self, target: WizardStep) -> bool {
        if self.step.next() != Some(target) {
            return false;
        }
        match target {
            WizardStep::EnterSession | WizardStep::PersonalInfo => false,
            WizardStep::TruckInfo => {
                !self.driver.name.trim().is_empty() && !self.driver.phone.trim().is_empty() && !self.driver.truck_plate.trim().is_empty()
            }
            WizardStep::Equipment | WizardStep::Signature => true,
        }
    }

    pub fn advance(&mut self) -> Result<WizardStep, AppError> {
        let target = self
            .step
            .next()
            .ok_or_else(|| AppError::StepBlocked("already at the last step".to_string()))?;

        if !self.can_proceed_to(target) {
            let reason = match self.step {
                WizardStep::EnterSession => "open a verification session first",
                WizardStep::PersonalInfo => "name, phone and truck plate are required",
                _ => "step is not complete",
            };
            return Err(AppError::StepBlocked(reason.to_string()));
        }

        self.step = target;
        Ok(target)
    }

    pub fn back(&mut self) -> Result<WizardStep, AppError> {
        let target = self
            .step
            .previous()
            .ok_or_else(|| AppError::StepBlocked("already at the first step".to_string()))?;
        self.step = target;
        Ok(target)
    }

    fn ensure_started(&self) -> Result<(), AppError> {
        if self.step == WizardStep::EnterSession {
            return Err(AppError::StepBlocked("open a verification session first".to_string()));
        }
        Ok(())
    }

    pub fn update_personal(&mut self, name: &str, phone: &str, id_number: &str) -> Result<(), AppError> {
        self.ensure_started()?;
        self.driver.name = name.to_string();
        self.driver.phone = phone.to_string();
        self.driver.id_number = id_number.to_string();
        Ok(())
    }

    /// The plate is stored upper-cased.
    pub fn update_truck(&mut self, truck_plate: &str, truck_model: &str) -> Result<(), AppError> {
        self.ensure_started()?;
        self.driver.truck_plate = truck_plate.to_uppercase();
        self.driver.truck_model = truck_model.to_string();
        Ok(())
    }

    pub fn set_signature(&mut self, signature: AttachmentRef) -> Result<(), AppError> {
        self.ensure_started()?;
        self.driver.signature = Some(signature);
        Ok(())
    }

    pub fn update_equipment(&mut self, item_id: &str, change: EquipmentChange) -> Result<&EquipmentItem, AppError> {
        self.ensure_started()?;
        let item = self
            .equipment
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment item {} not found", item_id)))?;

        if let Some(checked) = change.checked {
            item.checked = checked;
        }
        if let Some(comments) = change.comments {
            item.comments = comments;
        }
        if let Some(quantity) = change.quantity {
            item.quantity = quantity;
        }
        if let Some(photo) = change.photo {
            item.photo = Some(photo);
        }
        Ok(item)
    }

    pub fn can_submit(&self) -> bool {
        self.step == WizardStep::Signature && self.driver.signature.is_some()
    }

    fn ensure_submittable(&self) -> Result<(), AppError> {
        if self.step != WizardStep::Signature {
            return Err(AppError::StepBlocked("complete the previous steps first".to_string()));
        }
        if self.driver.signature.is_none() {
            return Err(AppError::StepBlocked("a signature is required before submitting".to_string()));
        }
        Ok(())
    }

    /// Hands out the collected data and resets the form to its initial state.
    pub fn take_submission(&mut self) -> Result<(DriverData, Vec<EquipmentItem>), AppError> {
        self.ensure_submittable()?;
        let submitted = std::mem::replace(self, DriverWizard::new());
        Ok((submitted.driver, submitted.equipment))
    }
}

/// Server-held wizards, one draft per driver.
pub struct WizardService<'a> {
    repository: &'a StoreRepository,
    config: &'a Config,
}

impl<'a> WizardService<'a> {
    pub fn new(repository: &'a StoreRepository, config: &'a Config) -> Self {
        Self { repository, config }
    }

    fn sessions(&self) -> SessionService<'a> {
        SessionService::new(self.repository, &self.config.links)
    }

    fn attachments(&self) -> AttachmentService<'a> {
        AttachmentService::new(self.repository, &self.config.attachments)
    }

    pub async fn start(&self, session_reference: &str, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        let session = self.sessions().resolve_session(session_reference, now).await?;

        let mut wizard = DriverWizard::new();
        wizard.start();

        let mut draft = WizardDraft {
            id: next_id(now),
            session_id: session.id.clone(),
            step: wizard.step(),
            driver: DriverData::default(),
            equipment: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        wizard.write_to(&mut draft);

        self.repository.create_draft(&draft).await?;
        info!(wizard_id = %draft.id, session_id = %session.id, "driver wizard started");
        Ok(draft)
    }

    pub async fn load(&self, id: &str) -> Result<WizardDraft, AppError> {
        self.repository
            .get_draft(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Wizard not found".to_string()))
    }

    /// Runs `change` against the freshly stored draft while holding the write lock.
    async fn modify<F>(&self, id: &str, now: DateTime<Utc>, change: F) -> Result<WizardDraft, AppError>
    where
        F: FnOnce(&mut DriverWizard) -> Result<(), AppError> + Send,
    {
        self.repository
            .update_draft(id, move |draft| {
                let mut wizard = DriverWizard::from_draft(draft);
                change(&mut wizard)?;
                wizard.write_to(draft);
                draft.updated_at = now;
                Ok(draft.clone())
            })
            .await
    }

    pub async fn update_personal(&self, id: &str, request: &PersonalInfoRequest, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        request.validate()?;
        self.modify(id, now, |wizard| wizard.update_personal(&request.name, &request.phone, &request.id_number))
            .await
    }

    pub async fn update_truck(&self, id: &str, request: &TruckInfoRequest, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        request.validate()?;
        self.modify(id, now, |wizard| wizard.update_truck(&request.truck_plate, &request.truck_model))
            .await
    }

    pub async fn update_equipment(&self, id: &str, item_id: &str, request: &EquipmentUpdateRequest, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        request.validate()?;
        // Checked before storing the photo so a bad request leaves no orphaned attachment.
        let draft = self.load(id).await?;
        if !draft.equipment.iter().any(|item| item.id == item_id) {
            return Err(AppError::NotFound(format!("Equipment item {} not found", item_id)));
        }

        let photo = match request.photo.as_deref() {
            Some(data_uri) => Some(self.attachments().store_data_uri(data_uri).await?),
            None => None,
        };
        let change = EquipmentChange {
            checked: request.checked,
            comments: request.comments.clone(),
            quantity: request.quantity,
            photo,
        };

        let draft = self.modify(id, now, |wizard| wizard.update_equipment(item_id, change).map(|_| ())).await?;
        debug!(wizard_id = %id, item_id = %item_id, "equipment item updated");
        Ok(draft)
    }

    pub async fn set_signature(&self, id: &str, request: &SignatureRequest, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        self.load(id).await?;
        let signature = self.attachments().store_data_uri(&request.image).await?;
        self.modify(id, now, |wizard| wizard.set_signature(signature)).await
    }

    pub async fn advance(&self, id: &str, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        self.modify(id, now, |wizard| wizard.advance().map(|_| ())).await
    }

    pub async fn back(&self, id: &str, now: DateTime<Utc>) -> Result<WizardDraft, AppError> {
        self.modify(id, now, |wizard| wizard.back().map(|_| ())).await
    }

    /// Records the driver's response and discards the draft.
    /// The session must still be open at the moment of submission.
    pub async fn submit(&self, id: &str, now: DateTime<Utc>) -> Result<DriverResponse, AppError> {
        // Only one submit can take a given draft.
        let (draft, (driver, equipment)) = self
            .repository
            .take_draft(id, |draft| DriverWizard::from_draft(draft).take_submission())
            .await?;

        match self.record(&draft, &driver, &equipment, now).await {
            Ok(response) => Ok(response),
            Err(err) => {
                if let Err(restore_err) = self.repository.create_draft(&draft).await {
                    error!(wizard_id = %draft.id, error = %restore_err, "failed to restore wizard draft after a refused submission");
                }
                Err(err)
            }
        }
    }

    async fn record(&self, draft: &WizardDraft, driver: &DriverData, equipment: &[EquipmentItem], now: DateTime<Utc>) -> Result<DriverResponse, AppError> {
        let session = self.sessions().resolve_session(&draft.session_id, now).await?;
        let recorder = ResponseRecorder::new(self.repository, Duration::from_millis(self.config.submission.simulated_delay_ms));
        recorder.submit(&session, driver, equipment, now).await
    }

    pub async fn view(&self, draft: &WizardDraft, now: DateTime<Utc>) -> Result<WizardResponse, AppError> {
        let session = self.sessions().get_session(&draft.session_id).await?;
        let wizard = DriverWizard::from_draft(draft);

        Ok(WizardResponse {
            id: draft.id.clone(),
            session: SessionSummary::from_session(&session, now),
            step: wizard.step(),
            step_number: wizard.step().number(),
            driver: DriverDataResponse::from(wizard.driver()),
            equipment: wizard.equipment().iter().map(EquipmentItemResponse::from).collect(),
            completion: wizard.completion(),
            can_advance: wizard.step().next().is_some_and(|next| wizard.can_proceed_to(next)),
            can_submit: wizard.can_submit(),
        })
    }
}
