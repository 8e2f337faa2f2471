//! Engines the unit tests run the service and routes against.
#![allow(unused_variables)]

use engine::PageBounds;
use feedback_core::FeedbackEngine;
use feedback_core::model::{Entity, EntityId, EntityStatus, FeedbackRecord, NewEntity, NewFeedback};
use feedback_core::repository::{EntityRepository, FeedbackRepository};
use feedback_core::result::{EntityRepoError, FeedbackRepoError, OptRepoResult, RepoResult};
use mockall::automock;
use repositories::memory::MemoryRepo;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemoryEngine(pub MemoryRepo);

impl FeedbackEngine for MemoryEngine {
    type Entities = MemoryRepo;
    type Feedback = MemoryRepo;

    fn entities(&self) -> Self::Entities {
        self.0.clone()
    }

    fn feedback(&self) -> Self::Feedback {
        self.0.clone()
    }
}

#[derive(Debug, Clone)]
pub struct MockEngine {
    entities: Arc<MockEntityStore>,
    feedback: Arc<MockFeedbackStore>,
}

impl MockEngine {
    pub fn new(entities: MockEntityStore, feedback: MockFeedbackStore) -> Self {
        Self {
            entities: Arc::new(entities),
            feedback: Arc::new(feedback),
        }
    }
}

impl FeedbackEngine for MockEngine {
    type Entities = Arc<MockEntityStore>;
    type Feedback = Arc<MockFeedbackStore>;

    fn entities(&self) -> Self::Entities {
        Arc::clone(&self.entities)
    }

    fn feedback(&self) -> Self::Feedback {
        Arc::clone(&self.feedback)
    }
}

pub struct EntityStore;

#[automock]
impl EntityRepository for EntityStore {
    async fn get(&self, id: EntityId) -> OptRepoResult<Entity, EntityRepoError> {
        unreachable!()
    }

    async fn list(&self, bounds: PageBounds) -> RepoResult<Vec<Entity>, EntityRepoError> {
        unreachable!()
    }

    async fn create(&self, new_entity: NewEntity) -> RepoResult<Entity, EntityRepoError> {
        unreachable!()
    }

    async fn set_status(
        &self,
        id: EntityId,
        status: EntityStatus,
    ) -> OptRepoResult<Entity, EntityRepoError> {
        unreachable!()
    }
}

pub struct FeedbackStore;

#[automock]
impl FeedbackRepository for FeedbackStore {
    async fn append(
        &self,
        new_feedback: NewFeedback,
    ) -> RepoResult<FeedbackRecord, FeedbackRepoError> {
        unreachable!()
    }

    async fn query(
        &self,
        entity_id: EntityId,
    ) -> RepoResult<Vec<FeedbackRecord>, FeedbackRepoError> {
        unreachable!()
    }
}
