//! Scenarios every storage backend has to pass. Each backend's test file wires its own
//! repositories into these.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use engine::Pagination;
use feedback_core::model::{
    EntityId, EntityStatus, FeedbackId, NewEntity, NewFeedback, order_newest_first,
};
use feedback_core::repository::{EntityRepository, FeedbackRepository};
use feedback_core::result::EntityRepoError;

pub const DEFAULT_PAGE_SIZE: u64 = 25;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

pub fn new_feedback(entity: &str, rating: u8, created_at: DateTime<Utc>) -> NewFeedback {
    NewFeedback {
        id: FeedbackId::new(),
        entity_id: EntityId::new(entity),
        rating,
        comment: Some(format!("rated {rating}")),
        author: None,
        created_at,
    }
}

pub async fn get_missing_entity_returns_none<E: EntityRepository>(entities: &E) {
    let found = entities.get(EntityId::new("nope")).await.unwrap();

    assert!(found.is_none());
}

pub async fn create_then_get_returns_created_entity<E: EntityRepository>(entities: &E) {
    let created = entities
        .create(NewEntity::new(EntityId::new("r1"), "Luigi's"))
        .await
        .unwrap();

    assert_eq!(EntityStatus::Active, created.status, "new entities start active");
    assert_eq!(None, created.updated);

    let found = entities
        .get(EntityId::new("r1"))
        .await
        .unwrap()
        .expect("recently created entity exists");

    assert_eq!(created, found);
}

pub async fn create_duplicate_id_fails<E: EntityRepository>(entities: &E) {
    entities
        .create(NewEntity::new(EntityId::new("r1"), "first"))
        .await
        .unwrap();

    let duplicate = entities
        .create(NewEntity::new(EntityId::new("r1"), "second"))
        .await
        .expect_err("duplicate id is rejected");

    assert!(matches!(
        duplicate.current_context(),
        EntityRepoError::AlreadyExists
    ));
}

pub async fn set_status_missing_entity_returns_none<E: EntityRepository>(entities: &E) {
    let result = entities
        .set_status(EntityId::new("ghost"), EntityStatus::Blocked)
        .await
        .unwrap();

    assert!(result.is_none());
}

pub async fn set_status_overwrites_and_is_idempotent<E: EntityRepository>(entities: &E) {
    entities
        .create(NewEntity::new(EntityId::new("r1"), "Luigi's"))
        .await
        .unwrap();

    for _ in 0..2 {
        let updated = entities
            .set_status(EntityId::new("r1"), EntityStatus::Blocked)
            .await
            .unwrap()
            .expect("entity exists");

        assert_eq!(EntityStatus::Blocked, updated.status);
        assert!(updated.updated.is_some());
    }

    let found = entities.get(EntityId::new("r1")).await.unwrap().unwrap();
    assert_eq!(EntityStatus::Blocked, found.status);

    let reactivated = entities
        .set_status(EntityId::new("r1"), EntityStatus::Active)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(EntityStatus::Active, reactivated.status);
}

pub async fn list_pages_through_entities<E: EntityRepository>(entities: &E) {
    for i in 0..5 {
        entities
            .create(NewEntity::new(EntityId::new(format!("r{i}")), format!("entity {i}")))
            .await
            .unwrap();
    }

    let all = entities
        .list(Pagination::default().bounds(DEFAULT_PAGE_SIZE))
        .await
        .unwrap();
    assert_eq!(5, all.len());

    let first = entities
        .list(Pagination::with_page_size(1, 2).bounds(DEFAULT_PAGE_SIZE))
        .await
        .unwrap();
    let third = entities
        .list(Pagination::with_page_size(3, 2).bounds(DEFAULT_PAGE_SIZE))
        .await
        .unwrap();
    let past_end = entities
        .list(Pagination::with_page_size(4, 2).bounds(DEFAULT_PAGE_SIZE))
        .await
        .unwrap();

    assert_eq!(2, first.len());
    assert_eq!(1, third.len());
    assert!(past_end.is_empty());
    assert_eq!(&all[..2], &first[..]);
    assert_eq!(all[4], third[0]);
}

pub async fn query_without_feedback_is_empty<F: FeedbackRepository>(feedback: &F) {
    let records = feedback.query(EntityId::new("r1")).await.unwrap();

    assert!(records.is_empty());
}

pub async fn append_then_query_only_returns_own_entity<E, F>(entities: &E, feedback: &F)
where
    E: EntityRepository,
    F: FeedbackRepository,
{
    for id in ["r1", "r2"] {
        entities
            .create(NewEntity::new(EntityId::new(id), id))
            .await
            .unwrap();
    }

    let (t1, t2, t3) = (at(1_000), at(2_000), at(3_000));
    let mut expected = Vec::new();
    for (rating, t) in [(1, t1), (3, t3), (2, t2)] {
        expected.push(feedback.append(new_feedback("r1", rating, t)).await.unwrap());
    }
    feedback.append(new_feedback("r2", 5, t2)).await.unwrap();

    let mut records = feedback.query(EntityId::new("r1")).await.unwrap();
    assert_eq!(3, records.len());
    assert!(records.iter().all(|r| r.entity_id == EntityId::new("r1")));

    order_newest_first(&mut records);
    order_newest_first(&mut expected);
    assert_eq!(expected, records);

    let times: Vec<_> = records.iter().map(|r| r.created_at).collect();
    assert_eq!(vec![t3, t2, t1], times);
}
