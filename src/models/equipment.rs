use crate::models::attachment::{AttachmentRef, AttachmentResponse};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Mandatory safety equipment every truck is checked against: (id, name, default quantity).
pub const EQUIPMENT_CATALOG: [(&str, &str, u32); 10] = [
    ("1", "Trusa de prim ajutor", 1),
    ("2", "Extinctor", 1),
    ("3", "Triunghi reflectorizant", 2),
    ("4", "Vestă reflectorizantă", 1),
    ("5", "Lanternă", 1),
    ("6", "Cabluri pornire", 1),
    ("7", "Roată de rezervă", 1),
    ("8", "Cheie roată", 1),
    ("9", "Cric", 1),
    ("10", "Kit reparații anvelope", 1),
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EquipmentItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub comments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<AttachmentRef>,
    #[serde(default)]
    pub checked: bool,
}

/// A fresh, unchecked checklist.
pub fn default_checklist() -> Vec<EquipmentItem> {
    EQUIPMENT_CATALOG
        .iter()
        .map(|(id, name, quantity)| EquipmentItem {
            id: (*id).to_string(),
            name: (*name).to_string(),
            quantity: *quantity,
            comments: String::new(),
            photo: None,
            checked: false,
        })
        .collect()
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub struct CompletionStats {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

impl CompletionStats {
    pub fn of(items: &[EquipmentItem]) -> Self {
        let completed = items.iter().filter(|item| item.checked).count() as u32;
        let total = items.len() as u32;
        Self::from_counts(completed, total)
    }

    pub fn from_counts(completed: u32, total: u32) -> Self {
        Self {
            completed,
            total,
            percentage: completion_percentage(completed, total),
        }
    }
}

/// `round(100 * completed / total)`, rounding halves up; 0 for an empty list.
pub fn completion_percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (completed, total) = (u64::from(completed), u64::from(total));
    ((completed * 200 + total) / (total * 2)) as u32
}

/// Partial update of one checklist item. Absent fields are left untouched.
#[derive(Deserialize, Debug, Default, Validate, JsonSchema)]
pub struct EquipmentUpdateRequest {
    pub checked: Option<bool>,
    pub comments: Option<String>,
    #[validate(range(max = 99))]
    pub quantity: Option<u32>,
    /// Image as a `data:<type>;base64,<payload>` URI.
    pub photo: Option<String>,
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct EquipmentItemResponse {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub comments: String,
    pub photo: Option<AttachmentResponse>,
    pub checked: bool,
}

impl From<&EquipmentItem> for EquipmentItemResponse {
    fn from(item: &EquipmentItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            comments: item.comments.clone(),
            photo: item.photo.as_ref().map(AttachmentResponse::from),
            checked: item.checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checklist_has_ten_unchecked_items() {
        let items = default_checklist();
        assert_eq!(items.len(), 10);
        assert!(items.iter().all(|item| !item.checked && item.photo.is_none() && item.comments.is_empty()));
        assert_eq!(items[2].name, "Triunghi reflectorizant");
        assert_eq!(items[2].quantity, 2);
    }

    #[test]
    fn percentage_rounds_like_the_form() {
        assert_eq!(completion_percentage(3, 10), 30);
        assert_eq!(completion_percentage(10, 10), 100);
        assert_eq!(completion_percentage(0, 10), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(0, 0), 0);
    }

    #[test]
    fn stats_count_checked_items() {
        let mut items = default_checklist();
        for item in items.iter_mut().take(3) {
            item.checked = true;
        }

        let stats = CompletionStats::of(&items);
        assert_eq!(stats, CompletionStats { completed: 3, total: 10, percentage: 30 });
    }
}
