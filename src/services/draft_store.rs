use std::sync::Arc;

use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::models::draft::{BookingDraft, DraftUpdate, SubmissionStatus};

#[derive(Debug)]
pub enum DraftStoreError {
    Database(String),
}

impl std::fmt::Display for DraftStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftStoreError::Database(err) => write!(f, "Draft store error: {}", err),
        }
    }
}

impl std::error::Error for DraftStoreError {}

/// Persistence port for the wizard's working state. The wizard never talks
/// to a database directly; it reads, merges and resets through this trait.
pub trait DraftStore {
    async fn read(&self, user_id: ObjectId) -> Result<BookingDraft, DraftStoreError>;
    async fn update(
        &self,
        user_id: ObjectId,
        update: DraftUpdate,
    ) -> Result<BookingDraft, DraftStoreError>;
    async fn set_status(
        &self,
        user_id: ObjectId,
        status: SubmissionStatus,
    ) -> Result<BookingDraft, DraftStoreError>;
    async fn reset(&self, user_id: ObjectId) -> Result<(), DraftStoreError>;
}

pub struct MongoDraftStore {
    client: Arc<Client>,
}

impl MongoDraftStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<BookingDraft> {
        self.client.database("Bookings").collection("Drafts")
    }

    /// Write the merged draft back. A write failure only costs the user
    /// re-entry, so it is logged and swallowed rather than surfaced.
    async fn persist(&self, draft: &BookingDraft) {
        let filter = doc! { "user_id": draft.user_id };
        let result = self
            .collection()
            .replace_one(filter, draft)
            .upsert(true)
            .await;
        if let Err(err) = result {
            log::error!(
                "Failed to persist booking draft for user {}: {}",
                draft.user_id,
                err
            );
        }
    }
}

impl DraftStore for MongoDraftStore {
    async fn read(&self, user_id: ObjectId) -> Result<BookingDraft, DraftStoreError> {
        let filter = doc! { "user_id": user_id };
        match self.collection().find_one(filter).await {
            Ok(Some(draft)) => Ok(draft),
            Ok(None) => Ok(BookingDraft::empty(user_id)),
            Err(err) => Err(DraftStoreError::Database(err.to_string())),
        }
    }

    async fn update(
        &self,
        user_id: ObjectId,
        update: DraftUpdate,
    ) -> Result<BookingDraft, DraftStoreError> {
        let mut draft = self.read(user_id).await?;
        draft.apply(update);
        self.persist(&draft).await;
        Ok(draft)
    }

    async fn set_status(
        &self,
        user_id: ObjectId,
        status: SubmissionStatus,
    ) -> Result<BookingDraft, DraftStoreError> {
        let mut draft = self.read(user_id).await?;
        draft.submission_status = status;
        self.persist(&draft).await;
        Ok(draft)
    }

    async fn reset(&self, user_id: ObjectId) -> Result<(), DraftStoreError> {
        let filter = doc! { "user_id": user_id };
        self.collection()
            .delete_one(filter)
            .await
            .map_err(|err| DraftStoreError::Database(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store used by tests. Same merge semantics, no database.
    #[derive(Default)]
    pub struct MemoryDraftStore {
        drafts: Mutex<HashMap<ObjectId, BookingDraft>>,
    }

    impl DraftStore for MemoryDraftStore {
        async fn read(&self, user_id: ObjectId) -> Result<BookingDraft, DraftStoreError> {
            let drafts = self.drafts.lock().unwrap();
            Ok(drafts
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| BookingDraft::empty(user_id)))
        }

        async fn update(
            &self,
            user_id: ObjectId,
            update: DraftUpdate,
        ) -> Result<BookingDraft, DraftStoreError> {
            let mut drafts = self.drafts.lock().unwrap();
            let draft = drafts
                .entry(user_id)
                .or_insert_with(|| BookingDraft::empty(user_id));
            draft.apply(update);
            Ok(draft.clone())
        }

        async fn set_status(
            &self,
            user_id: ObjectId,
            status: SubmissionStatus,
        ) -> Result<BookingDraft, DraftStoreError> {
            let mut drafts = self.drafts.lock().unwrap();
            let draft = drafts
                .entry(user_id)
                .or_insert_with(|| BookingDraft::empty(user_id));
            draft.submission_status = status;
            Ok(draft.clone())
        }

        async fn reset(&self, user_id: ObjectId) -> Result<(), DraftStoreError> {
            self.drafts.lock().unwrap().remove(&user_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryDraftStore;
    use super::*;
    use crate::models::catalog::TestType;

    #[tokio::test]
    async fn read_of_unknown_user_returns_empty_draft() {
        let store = MemoryDraftStore::default();
        let user_id = ObjectId::new();
        let draft = store.read(user_id).await.unwrap();
        assert!(draft.test_type.is_none());
        assert_eq!(draft.user_id, user_id);
    }

    #[tokio::test]
    async fn update_then_read_round_trips() {
        let store = MemoryDraftStore::default();
        let user_id = ObjectId::new();

        store
            .update(
                user_id,
                DraftUpdate {
                    test_type: Some(TestType::G),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let draft = store.read(user_id).await.unwrap();
        assert_eq!(draft.test_type, Some(TestType::G));
    }

    #[tokio::test]
    async fn reset_discards_the_draft() {
        let store = MemoryDraftStore::default();
        let user_id = ObjectId::new();

        store
            .update(
                user_id,
                DraftUpdate {
                    test_type: Some(TestType::G2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.reset(user_id).await.unwrap();

        let draft = store.read(user_id).await.unwrap();
        assert!(draft.test_type.is_none());
    }
}
