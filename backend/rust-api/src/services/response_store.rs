use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::errors::AppError;
use crate::models::SubmissionDocument;

const RESPONSES_COLLECTION: &str = "responses";

/// Contract the rest of the crate consumes. Submissions are append-only:
/// there is no update or delete path, and repeated submissions for one
/// session id accumulate.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn store(&self, submission: &SubmissionDocument) -> Result<(), AppError>;

    /// Empty vec, not an error, when nothing matches.
    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<SubmissionDocument>, AppError>;
}

pub struct MongoResponseStore {
    mongo: Database,
}

impl MongoResponseStore {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn collection(&self) -> Collection<SubmissionDocument> {
        self.mongo.collection(RESPONSES_COLLECTION)
    }
}

#[async_trait]
impl ResponseStore for MongoResponseStore {
    async fn store(&self, submission: &SubmissionDocument) -> Result<(), AppError> {
        self.collection().insert_one(submission).await?;

        tracing::info!(
            session_id = %submission.session_id,
            answers = submission.answers.len(),
            "Stored submission"
        );

        Ok(())
    }

    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<SubmissionDocument>, AppError> {
        let cursor = self
            .collection()
            .find(doc! { "sessionId": session_id })
            .await?;

        let documents: Vec<SubmissionDocument> = cursor.try_collect().await?;

        Ok(documents)
    }
}
