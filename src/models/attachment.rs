use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to an uploaded image. The id is the sha256 of the decoded bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub id: String,
    pub content_type: String,
    pub size: usize,
}

/// The image itself, kept under its own storage key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttachment {
    pub content_type: String,
    /// Standard base64 of the image bytes.
    pub data: String,
}

impl StoredAttachment {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.data)
    }
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct AttachmentResponse {
    pub id: String,
    pub content_type: String,
    pub size: usize,
}

impl From<&AttachmentRef> for AttachmentResponse {
    fn from(attachment: &AttachmentRef) -> Self {
        Self {
            id: attachment.id.clone(),
            content_type: attachment.content_type.clone(),
            size: attachment.size,
        }
    }
}
