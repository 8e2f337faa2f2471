use crate::model::{Entity, EntityId, EntityStatus, FeedbackRecord, NewEntity, NewFeedback};
use crate::result::{EntityRepoError, FeedbackRepoError, OptRepoResult, RepoResult};
use engine::PageBounds;
use std::sync::Arc;

pub trait EntityRepository {
    fn get(
        &self,
        id: EntityId,
    ) -> impl Future<Output = OptRepoResult<Entity, EntityRepoError>> + Send;

    fn list(
        &self,
        bounds: PageBounds,
    ) -> impl Future<Output = RepoResult<Vec<Entity>, EntityRepoError>> + Send;

    fn create(
        &self,
        new_entity: NewEntity,
    ) -> impl Future<Output = RepoResult<Entity, EntityRepoError>> + Send;

    /// Overwrites the status of `id`. `None` means no entity with that id exists.
    fn set_status(
        &self,
        id: EntityId,
        status: EntityStatus,
    ) -> impl Future<Output = OptRepoResult<Entity, EntityRepoError>> + Send;
}

pub trait FeedbackRepository {
    fn append(
        &self,
        new_feedback: NewFeedback,
    ) -> impl Future<Output = RepoResult<FeedbackRecord, FeedbackRepoError>> + Send;

    /// Every record stored for `entity_id`, in no particular order.
    fn query(
        &self,
        entity_id: EntityId,
    ) -> impl Future<Output = RepoResult<Vec<FeedbackRecord>, FeedbackRepoError>> + Send;
}

impl<T> EntityRepository for Arc<T>
where
    T: EntityRepository + Send + Sync,
{
    async fn get(&self, id: EntityId) -> OptRepoResult<Entity, EntityRepoError> {
        (**self).get(id).await
    }

    async fn list(&self, bounds: PageBounds) -> RepoResult<Vec<Entity>, EntityRepoError> {
        (**self).list(bounds).await
    }

    async fn create(&self, new_entity: NewEntity) -> RepoResult<Entity, EntityRepoError> {
        (**self).create(new_entity).await
    }

    async fn set_status(
        &self,
        id: EntityId,
        status: EntityStatus,
    ) -> OptRepoResult<Entity, EntityRepoError> {
        (**self).set_status(id, status).await
    }
}

impl<T> FeedbackRepository for Arc<T>
where
    T: FeedbackRepository + Send + Sync,
{
    async fn append(
        &self,
        new_feedback: NewFeedback,
    ) -> RepoResult<FeedbackRecord, FeedbackRepoError> {
        (**self).append(new_feedback).await
    }

    async fn query(
        &self,
        entity_id: EntityId,
    ) -> RepoResult<Vec<FeedbackRecord>, FeedbackRepoError> {
        (**self).query(entity_id).await
    }
}
