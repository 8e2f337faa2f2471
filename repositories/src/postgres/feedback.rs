use crate::postgres::RepoInitErr;
use crate::postgres::statements;
use deadpool_postgres::{Object, Pool};
use error_stack::{IntoReport, Report, ResultExt};
use feedback_core::model::{EntityId, FeedbackId, FeedbackRecord, NewFeedback};
use feedback_core::repository::FeedbackRepository;
use feedback_core::result::{FeedbackRepoError, RepoResult};
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;

#[derive(Clone)]
pub struct FeedbackRepo {
    pool: Pool,
}

impl FeedbackRepo {
    pub async fn new(pool: Pool) -> Result<Self, Report<RepoInitErr>> {
        let client = pool.get().await.change_context(RepoInitErr::feedback())?;

        for sql in statements::feedback::ALL {
            client
                .prepare_typed_cached(sql.query, sql.types)
                .await
                .change_context(RepoInitErr::feedback())
                .attach_with(|| format!("statement: {}", sql.query))?;
        }

        Ok(Self { pool })
    }

    async fn client(&self, on_err: FeedbackRepoError) -> RepoResult<Object, FeedbackRepoError> {
        self.pool.get().await.change_context(on_err)
    }
}

fn row_to_record(
    row: &Row,
    on_err: FeedbackRepoError,
) -> RepoResult<FeedbackRecord, FeedbackRepoError> {
    let rating: i16 = row.get("rating");
    let rating = u8::try_from(rating)
        .change_context(on_err)
        .attach_with(|| format!("stored rating {rating} is out of range"))?;

    Ok(FeedbackRecord {
        id: FeedbackId::new_with(row.get("id")),
        entity_id: EntityId::new(row.get::<_, String>("entity_id")),
        rating,
        comment: row.get("comment"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    })
}

impl FeedbackRepository for FeedbackRepo {
    async fn append(
        &self,
        new_feedback: NewFeedback,
    ) -> RepoResult<FeedbackRecord, FeedbackRepoError> {
        let sql = &statements::feedback::APPEND;

        let client = self.client(FeedbackRepoError::Append).await?;
        let statement = client
            .prepare_typed_cached(sql.query, sql.types)
            .await
            .change_context(FeedbackRepoError::Append)?;

        let result = client
            .query_one(
                &statement,
                &[
                    &new_feedback.id.uuid(),
                    &new_feedback.entity_id.as_str(),
                    &i16::from(new_feedback.rating),
                    &new_feedback.comment,
                    &new_feedback.author,
                    &new_feedback.created_at,
                ],
            )
            .await;

        match result {
            Ok(row) => row_to_record(&row, FeedbackRepoError::Append),
            Err(e) if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) => Err(e.into_report())
                .change_context(FeedbackRepoError::Append)
                .attach_with(|| format!("entity '{}' does not exist", new_feedback.entity_id)),
            Err(e) => Err(e.into_report()).change_context(FeedbackRepoError::Append),
        }
    }

    async fn query(
        &self,
        entity_id: EntityId,
    ) -> RepoResult<Vec<FeedbackRecord>, FeedbackRepoError> {
        let sql = &statements::feedback::QUERY;

        let client = self.client(FeedbackRepoError::Query).await?;
        let statement = client
            .prepare_typed_cached(sql.query, sql.types)
            .await
            .change_context(FeedbackRepoError::Query)?;

        client
            .query(&statement, &[&entity_id.as_str()])
            .await
            .change_context(FeedbackRepoError::Query)?
            .iter()
            .map(|row| row_to_record(row, FeedbackRepoError::Query))
            .collect()
    }
}
