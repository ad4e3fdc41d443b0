use crate::models::attachment::{AttachmentRef, AttachmentResponse};
use crate::models::equipment::{CompletionStats, EquipmentItem, EquipmentItemResponse};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseStatus {
    Completed,
    InProgress,
}

/// One driver's submission against a session. Never modified once written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriverResponse {
    pub id: String,
    pub session_id: String,
    pub driver_name: String,
    pub phone: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<AttachmentRef>,
    pub truck_plate: String,
    #[serde(default)]
    pub truck_model: String,
    pub completed_at: DateTime<Utc>,
    pub equipment_checked: u32,
    pub total_equipment: u32,
    pub status: ResponseStatus,
    #[serde(default)]
    pub equipment_details: Vec<EquipmentItem>,
}

impl DriverResponse {
    pub fn completion(&self) -> CompletionStats {
        CompletionStats::from_counts(self.equipment_checked, self.total_equipment)
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct DriverResponseView {
    pub id: String,
    pub session_id: String,
    pub driver_name: String,
    pub phone: String,
    pub id_number: String,
    pub signature: Option<AttachmentResponse>,
    pub truck_plate: String,
    pub truck_model: String,
    pub completed_at: DateTime<Utc>,
    pub equipment_checked: u32,
    pub total_equipment: u32,
    pub percentage: u32,
    pub status: ResponseStatus,
    pub equipment_details: Vec<EquipmentItemResponse>,
}

impl From<&DriverResponse> for DriverResponseView {
    fn from(response: &DriverResponse) -> Self {
        Self {
            id: response.id.clone(),
            session_id: response.session_id.clone(),
            driver_name: response.driver_name.clone(),
            phone: response.phone.clone(),
            id_number: response.id_number.clone(),
            signature: response.signature.as_ref().map(AttachmentResponse::from),
            truck_plate: response.truck_plate.clone(),
            truck_model: response.truck_model.clone(),
            completed_at: response.completed_at,
            equipment_checked: response.equipment_checked,
            total_equipment: response.total_equipment,
            percentage: response.completion().percentage,
            status: response.status,
            equipment_details: response.equipment_details.iter().map(EquipmentItemResponse::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct SubmissionResponse {
    pub message: String,
    pub response: DriverResponseView,
}
