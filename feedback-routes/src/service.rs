use crate::error::FeedbackServiceError;
use crate::metrics;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use engine::Pagination;
use error_stack::{IntoReport, ResultExt};
use feedback_core::model::{FeedbackSummary, order_newest_first};
use feedback_core::repository::{EntityRepository, FeedbackRepository};
use feedback_core::result::EntityRepoError;
use feedback_core::{
    Entity, EntityId, EntityStatus, FeedbackEngine, FeedbackId, FeedbackRecord,
    FeedbackSubmission, LinkGenerator, NewEntity, NewFeedback, StatusChange, generate_entity_id,
};
use tracing::{debug, instrument, warn};

const DEFAULT_ENTITY_PAGE_SIZE: u64 = 25;
const MAX_ID_ATTEMPTS: usize = 5;

#[derive(Debug)]
pub enum StatusOutcome {
    Updated(Entity),
    NotFound,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted(FeedbackRecord),
    EntityNotFound,
    /// Blocked entities do not take new feedback.
    EntityBlocked,
}

/// The confirmation returned to whoever changed a status.
pub fn confirmation_message(entity: &Entity) -> String {
    match entity.status {
        EntityStatus::Active => format!("'{}' has been activated", entity.name),
        EntityStatus::Blocked => format!("'{}' has been blocked", entity.name),
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackService<T> {
    engine: T,
    links: LinkGenerator,
    generate_id: fn() -> EntityId,
}

impl<T> FeedbackService<T>
where
    T: FeedbackEngine,
{
    pub fn new(engine: T, links: LinkGenerator) -> Self {
        Self {
            engine,
            links,
            generate_id: generate_entity_id,
        }
    }

    /// Replaces the id source used by [`FeedbackService::create_entity`].
    pub fn with_id_generator(mut self, generate_id: fn() -> EntityId) -> Self {
        self.generate_id = generate_id;
        self
    }

    /// Any valid status may be set from any current status, including the one already set.
    #[instrument(skip_all, name = "service#set_status", fields(entity.id = %change.entity_id, entity.status = %change.status))]
    pub async fn set_status(&self, change: StatusChange) -> ServiceResult<StatusOutcome> {
        let updated = self
            .engine
            .entities()
            .set_status(change.entity_id, change.status)
            .await
            .change_context(FeedbackServiceError)?;

        Ok(match updated {
            Some(entity) => {
                metrics::increment_status_changes(entity.status);
                StatusOutcome::Updated(entity)
            }
            None => StatusOutcome::NotFound,
        })
    }

    /// Newest first. Does not check whether the entity exists, an unknown id has no feedback.
    #[instrument(skip_all, name = "service#list_feedback", fields(entity.id = %entity_id))]
    pub async fn list_feedback(&self, entity_id: EntityId) -> ServiceResult<Vec<FeedbackRecord>> {
        let mut records = self
            .engine
            .feedback()
            .query(entity_id)
            .await
            .change_context(FeedbackServiceError)?;

        order_newest_first(&mut records);
        metrics::increment_feedback_retrieved_by(records.len());
        Ok(records)
    }

    #[instrument(skip_all, name = "service#feedback_summary", fields(entity.id = %entity_id))]
    pub async fn feedback_summary(&self, entity_id: EntityId) -> ServiceResult<FeedbackSummary> {
        let records = self
            .engine
            .feedback()
            .query(entity_id.clone())
            .await
            .change_context(FeedbackServiceError)?;

        Ok(FeedbackSummary::from_records(entity_id, &records))
    }

    #[instrument(skip_all, name = "service#submit_feedback", fields(entity.id = %submission.entity_id))]
    pub async fn submit_feedback(
        &self,
        submission: FeedbackSubmission,
    ) -> ServiceResult<SubmitOutcome> {
        let entity = self
            .engine
            .entities()
            .get(submission.entity_id.clone())
            .await
            .change_context(FeedbackServiceError)?;

        match entity {
            None => {
                metrics::increment_feedback_rejected("not_found");
                return Ok(SubmitOutcome::EntityNotFound);
            }
            Some(entity) if !entity.is_active() => {
                metrics::increment_feedback_rejected("blocked");
                return Ok(SubmitOutcome::EntityBlocked);
            }
            Some(_) => {}
        }

        let record = self
            .engine
            .feedback()
            .append(NewFeedback {
                id: FeedbackId::new(),
                entity_id: submission.entity_id,
                rating: submission.rating,
                comment: submission.comment,
                author: submission.author,
                created_at: Utc::now(),
            })
            .await
            .change_context(FeedbackServiceError)?;

        metrics::increment_feedback_submitted();
        Ok(SubmitOutcome::Accepted(record))
    }

    /// Generated ids are only probably unique. The store rejects an id that is already taken,
    /// in which case a fresh one is drawn.
    #[instrument(skip_all, name = "service#create_entity")]
    pub async fn create_entity(&self, name: String) -> ServiceResult<Entity> {
        let entities = self.engine.entities();

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = (self.generate_id)();

            match entities.create(NewEntity::new(id.clone(), name.clone())).await {
                Ok(entity) => {
                    debug!("created entity '{}'", entity.id);
                    metrics::increment_entities_created();
                    return Ok(entity);
                }
                Err(e) if matches!(e.current_context(), EntityRepoError::AlreadyExists) => {
                    warn!("generated entity id '{id}' is already taken (attempt {attempt})");
                }
                Err(e) => return Err(e.change_context(FeedbackServiceError)),
            }
        }

        Err(FeedbackServiceError.into_report())
            .attach_with(|| format!("no unused entity id after {MAX_ID_ATTEMPTS} attempts"))
    }

    #[instrument(skip_all, name = "service#get_entity", fields(entity.id = %id))]
    pub async fn get_entity(&self, id: EntityId) -> OptServiceResult<Entity> {
        self.engine
            .entities()
            .get(id)
            .await
            .change_context(FeedbackServiceError)
    }

    pub async fn list_entities(&self, pagination: Pagination) -> ServiceResult<Vec<Entity>> {
        self.engine
            .entities()
            .list(pagination.bounds(DEFAULT_ENTITY_PAGE_SIZE))
            .await
            .change_context(FeedbackServiceError)
    }

    /// The public submission link, or `None` for an unknown entity.
    #[instrument(skip_all, name = "service#feedback_link", fields(entity.id = %id))]
    pub async fn feedback_link(&self, id: EntityId) -> OptServiceResult<String> {
        Ok(self
            .get_entity(id)
            .await?
            .map(|entity| self.links.feedback_link(&entity.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use crate::test_engines::{MemoryEngine, MockEngine, MockEntityStore, MockFeedbackStore};
    use error_stack::Report;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use repositories::memory::MemoryRepo;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    fn entity(id: &str, status: EntityStatus) -> Entity {
        Entity {
            id: EntityId::new(id),
            name: format!("{id} name"),
            status,
            created: at(0),
            updated: None,
        }
    }

    fn service_with(
        entities: impl IntoIterator<Item = Entity>,
    ) -> (FeedbackService<MemoryEngine>, MemoryRepo) {
        let repo = MemoryRepo::with_entities(entities);
        let service = FeedbackService::new(
            MemoryEngine(repo.clone()),
            LinkGenerator::new("https://example.com"),
        );
        (service, repo)
    }

    fn submission(entity: &str, rating: u8) -> FeedbackSubmission {
        FeedbackSubmission {
            entity_id: EntityId::new(entity),
            rating,
            comment: None,
            author: None,
        }
    }

    #[tokio::test]
    async fn blocking_an_active_entity() {
        let (service, repo) = service_with([entity("r1", EntityStatus::Active)]);

        let outcome = service
            .set_status(StatusChange::new(EntityId::new("r1"), EntityStatus::Blocked))
            .await
            .unwrap();

        let StatusOutcome::Updated(updated) = outcome else {
            panic!("expected r1 to be updated, got {outcome:?}");
        };
        assert!(confirmation_message(&updated).contains("blocked"));

        let stored = repo.get(EntityId::new("r1")).await.unwrap().unwrap();
        assert_eq!(EntityStatus::Blocked, stored.status);
    }

    #[tokio::test]
    async fn setting_the_same_status_twice_is_idempotent() {
        let (service, repo) = service_with([entity("r1", EntityStatus::Blocked)]);

        for _ in 0..2 {
            let outcome = service
                .set_status(StatusChange::new(EntityId::new("r1"), EntityStatus::Blocked))
                .await
                .unwrap();
            assert!(matches!(outcome, StatusOutcome::Updated(ref e) if e.status == EntityStatus::Blocked));
        }

        let stored = repo.get(EntityId::new("r1")).await.unwrap().unwrap();
        assert_eq!(EntityStatus::Blocked, stored.status);
    }

    #[tokio::test]
    async fn unknown_entity_status_change_is_not_found() {
        let (service, _) = service_with([]);

        let outcome = service
            .set_status(StatusChange::new(EntityId::new("ghost"), EntityStatus::Active))
            .await
            .unwrap();

        assert!(matches!(outcome, StatusOutcome::NotFound));
    }

    #[test]
    fn confirmation_distinguishes_outcomes() {
        let active = confirmation_message(&entity("r1", EntityStatus::Active));
        let blocked = confirmation_message(&entity("r1", EntityStatus::Blocked));

        assert!(active.contains("activated"));
        assert!(blocked.contains("blocked"));
        assert_ne!(active, blocked);
    }

    #[tokio::test]
    async fn feedback_is_listed_newest_first() {
        let (service, repo) = service_with([entity("r1", EntityStatus::Active)]);
        let (t1, t2, t3) = (at(100), at(200), at(300));

        for (rating, created_at) in [(1, t1), (3, t3), (2, t2)] {
            repo.append(NewFeedback {
                id: FeedbackId::new(),
                entity_id: EntityId::new("r1"),
                rating,
                comment: None,
                author: None,
                created_at,
            })
            .await
            .unwrap();
        }

        let records = service.list_feedback(EntityId::new("r1")).await.unwrap();

        let times: Vec<_> = records.iter().map(|r| r.created_at).collect();
        assert_eq!(vec![t3, t2, t1], times);
        assert!(records.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn no_feedback_is_an_empty_list() {
        let (service, _) = service_with([]);

        let records = service.list_feedback(EntityId::new("nobody")).await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn submitted_feedback_is_listed() {
        let (service, _) = service_with([entity("r1", EntityStatus::Active)]);

        let outcome = service.submit_feedback(submission("r1", 4)).await.unwrap();
        let SubmitOutcome::Accepted(record) = outcome else {
            panic!("expected feedback to be accepted, got {outcome:?}");
        };

        let records = service.list_feedback(EntityId::new("r1")).await.unwrap();
        assert_eq!(vec![record], records);
    }

    #[tokio::test]
    async fn blocked_entities_reject_feedback() {
        let (service, repo) = service_with([entity("r1", EntityStatus::Blocked)]);

        let outcome = service.submit_feedback(submission("r1", 4)).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::EntityBlocked));
        assert!(repo.query(EntityId::new("r1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_entities_reject_feedback() {
        let (service, repo) = service_with([]);

        let outcome = service.submit_feedback(submission("r1", 4)).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::EntityNotFound));
        assert!(repo.query(EntityId::new("r1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_covers_submitted_feedback() {
        let (service, _) = service_with([entity("r1", EntityStatus::Active)]);

        for rating in [5, 4, 3] {
            service.submit_feedback(submission("r1", rating)).await.unwrap();
        }

        let summary = service.feedback_summary(EntityId::new("r1")).await.unwrap();

        assert_eq!(3, summary.count);
        assert_eq!(Some(4.0), summary.average_rating);
    }

    #[tokio::test]
    async fn created_entities_start_active() {
        let (service, _) = service_with([]);

        let created = service.create_entity("Luigi's".into()).await.unwrap();

        assert_eq!(EntityStatus::Active, created.status);
        assert_eq!(
            Some(created.clone()),
            service.get_entity(created.id.clone()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn create_entity_gives_up_when_every_id_is_taken() {
        fn fixed_id() -> EntityId {
            EntityId::new("taken")
        }

        let (service, _) = service_with([entity("taken", EntityStatus::Active)]);
        let service = service.with_id_generator(fixed_id);

        assert!(service.create_entity("another".into()).await.is_err());
    }

    #[tokio::test]
    async fn create_entity_draws_a_new_id_when_the_store_reports_it_taken() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut entities = MockEntityStore::new();
        entities
            .expect_create()
            .times(2)
            .returning(move |new_entity| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Report::new(EntityRepoError::AlreadyExists))
                } else {
                    Ok(new_entity.into_entity(at(0)))
                }
            });
        entities.expect_get().never();

        let service = FeedbackService::new(
            MockEngine::new(entities, MockFeedbackStore::new()),
            LinkGenerator::default(),
        );

        let created = service.create_entity("Luigi's".into()).await.unwrap();

        assert_eq!("Luigi's", created.name);
        assert_eq!(2, calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn create_entity_does_not_retry_other_store_failures() {
        let mut entities = MockEntityStore::new();
        entities
            .expect_create()
            .once()
            .returning(|_| Err(Report::new(EntityRepoError::Create)));

        let service = FeedbackService::new(
            MockEngine::new(entities, MockFeedbackStore::new()),
            LinkGenerator::default(),
        );

        assert!(service.create_entity("Luigi's".into()).await.is_err());
    }

    #[tokio::test]
    async fn feedback_link_for_existing_entity() {
        let (service, _) = service_with([entity("abc123", EntityStatus::Active)]);

        assert_eq!(
            Some("https://example.com/feedback/abc123".to_string()),
            service.feedback_link(EntityId::new("abc123")).await.unwrap()
        );
        assert_eq!(None, service.feedback_link(EntityId::new("nope")).await.unwrap());
    }
}
