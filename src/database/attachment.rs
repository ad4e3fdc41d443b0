use crate::database::key_value::attachment_key;
use crate::database::repository::StoreRepository;
use crate::error::app_error::AppError;
use crate::models::attachment::StoredAttachment;

#[async_trait::async_trait]
pub trait AttachmentRepository {
    async fn put_attachment(&self, id: &str, attachment: &StoredAttachment) -> Result<(), AppError>;
    async fn get_attachment(&self, id: &str) -> Result<Option<StoredAttachment>, AppError>;
}

#[async_trait::async_trait]
impl AttachmentRepository for StoreRepository {
    /// Attachments are content-addressed, so an existing key already holds the same bytes.
    async fn put_attachment(&self, id: &str, attachment: &StoredAttachment) -> Result<(), AppError> {
        self.insert_document_if_absent(&attachment_key(id), attachment).await?;
        Ok(())
    }

    async fn get_attachment(&self, id: &str) -> Result<Option<StoredAttachment>, AppError> {
        self.read_document(&attachment_key(id)).await
    }
}
