//! Process-local storage. Everything lives behind one async `RwLock`, which gives each
//! repository call the same atomicity a single SQL statement would.

use chrono::Utc;
use engine::PageBounds;
use error_stack::{IntoReport, ResultExt};
use feedback_core::model::{
    Entity, EntityId, EntityStatus, FeedbackRecord, NewEntity, NewFeedback,
};
use feedback_core::repository::{EntityRepository, FeedbackRepository};
use feedback_core::result::{EntityRepoError, FeedbackRepoError, OptRepoResult, RepoResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Store {
    entities: HashMap<EntityId, Entity>,
    feedback: HashMap<EntityId, Vec<FeedbackRecord>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    store: Arc<RwLock<Store>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out holding `entities`, e.g. fixtures or demo data.
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let store = Store {
            entities: entities.into_iter().map(|e| (e.id.clone(), e)).collect(),
            feedback: HashMap::new(),
        };
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

impl EntityRepository for MemoryRepo {
    async fn get(&self, id: EntityId) -> OptRepoResult<Entity, EntityRepoError> {
        Ok(self.store.read().await.entities.get(&id).cloned())
    }

    async fn list(&self, bounds: PageBounds) -> RepoResult<Vec<Entity>, EntityRepoError> {
        let store = self.store.read().await;

        let mut entities: Vec<_> = store.entities.values().collect();
        entities.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));

        Ok(entities
            .into_iter()
            .skip(bounds.offset_usize())
            .take(bounds.limit_usize())
            .cloned()
            .collect())
    }

    async fn create(&self, new_entity: NewEntity) -> RepoResult<Entity, EntityRepoError> {
        let mut store = self.store.write().await;

        if store.entities.contains_key(&new_entity.id) {
            return Err(EntityRepoError::AlreadyExists.into_report())
                .attach_with(|| format!("entity '{}' already exists", new_entity.id));
        }

        let entity = new_entity.into_entity(Utc::now());
        store.entities.insert(entity.id.clone(), entity.clone());
        debug!(entity.id = %entity.id, "stored entity");
        Ok(entity)
    }

    async fn set_status(
        &self,
        id: EntityId,
        status: EntityStatus,
    ) -> OptRepoResult<Entity, EntityRepoError> {
        let mut store = self.store.write().await;

        Ok(store.entities.get_mut(&id).map(|entity| {
            entity.status = status;
            entity.updated = Some(Utc::now());
            entity.clone()
        }))
    }
}

impl FeedbackRepository for MemoryRepo {
    async fn append(
        &self,
        new_feedback: NewFeedback,
    ) -> RepoResult<FeedbackRecord, FeedbackRepoError> {
        let record = new_feedback.into_record();

        self.store
            .write()
            .await
            .feedback
            .entry(record.entity_id.clone())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn query(
        &self,
        entity_id: EntityId,
    ) -> RepoResult<Vec<FeedbackRecord>, FeedbackRepoError> {
        Ok(self
            .store
            .read()
            .await
            .feedback
            .get(&entity_id)
            .cloned()
            .unwrap_or_default())
    }
}
