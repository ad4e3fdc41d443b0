use crate::models::attachment::{AttachmentRef, AttachmentResponse};
use crate::models::equipment::{CompletionStats, EquipmentItem, EquipmentItemResponse};
use crate::models::verification_session::SessionSummary;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    EnterSession,
    PersonalInfo,
    TruckInfo,
    Equipment,
    Signature,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::EnterSession => 0,
            WizardStep::PersonalInfo => 1,
            WizardStep::TruckInfo => 2,
            WizardStep::Equipment => 3,
            WizardStep::Signature => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            WizardStep::EnterSession => Some(WizardStep::PersonalInfo),
            WizardStep::PersonalInfo => Some(WizardStep::TruckInfo),
            WizardStep::TruckInfo => Some(WizardStep::Equipment),
            WizardStep::Equipment => Some(WizardStep::Signature),
            WizardStep::Signature => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            WizardStep::EnterSession | WizardStep::PersonalInfo => None,
            WizardStep::TruckInfo => Some(WizardStep::PersonalInfo),
            WizardStep::Equipment => Some(WizardStep::TruckInfo),
            WizardStep::Signature => Some(WizardStep::Equipment),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriverData {
    pub name: String,
    pub phone: String,
    pub id_number: String,
    pub truck_plate: String,
    pub truck_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<AttachmentRef>,
}

/// An in-progress driver wizard, kept until it is submitted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WizardDraft {
    pub id: String,
    pub session_id: String,
    pub step: WizardStep,
    pub driver: DriverData,
    pub equipment: Vec<EquipmentItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct StartWizardRequest {
    pub session_id: String,
}

#[derive(Deserialize, Debug, Default, Validate, JsonSchema)]
pub struct PersonalInfoRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub id_number: String,
}

#[derive(Deserialize, Debug, Default, Validate, JsonSchema)]
pub struct TruckInfoRequest {
    #[serde(default)]
    #[validate(length(max = 20))]
    pub truck_plate: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub truck_model: String,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct SignatureRequest {
    /// Signature image as a `data:<type>;base64,<payload>` URI.
    pub image: String,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct DriverDataResponse {
    pub name: String,
    pub phone: String,
    pub id_number: String,
    pub truck_plate: String,
    pub truck_model: String,
    pub signature: Option<AttachmentResponse>,
}

impl From<&DriverData> for DriverDataResponse {
    fn from(driver: &DriverData) -> Self {
        Self {
            name: driver.name.clone(),
            phone: driver.phone.clone(),
            id_number: driver.id_number.clone(),
            truck_plate: driver.truck_plate.clone(),
            truck_model: driver.truck_model.clone(),
            signature: driver.signature.as_ref().map(AttachmentResponse::from),
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct WizardResponse {
    pub id: String,
    pub session: SessionSummary,
    pub step: WizardStep,
    pub step_number: u8,
    pub driver: DriverDataResponse,
    pub equipment: Vec<EquipmentItemResponse>,
    pub completion: CompletionStats,
    pub can_advance: bool,
    pub can_submit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered_and_numbered() {
        assert!(WizardStep::EnterSession < WizardStep::Signature);
        assert_eq!(WizardStep::Equipment.number(), 3);
        assert_eq!(WizardStep::Signature.next(), None);
        assert_eq!(WizardStep::PersonalInfo.previous(), None);
        assert_eq!(WizardStep::Signature.previous(), Some(WizardStep::Equipment));
    }

    #[test]
    fn step_names_are_snake_case() {
        assert_eq!(serde_json::to_value(WizardStep::TruckInfo).unwrap(), "truck_info");
    }
}
