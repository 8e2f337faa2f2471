//! These need a docker daemon: `cargo test -p repositories --test postgres -- --ignored`

use repositories::postgres::ConnectionDetails;
use repositories::postgres::entities::EntityRepo;
use repositories::postgres::feedback::FeedbackRepo;
use repositories::postgres::initializer::RepoCreator;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

mod common;

struct TestRuntime {
    _container: ContainerAsync<Postgres>,
    entities: EntityRepo,
    feedback: FeedbackRepo,
}

async fn runtime() -> TestRuntime {
    let container = Postgres::default()
        .with_db_name("feedback")
        .with_user("testuser")
        .with_password("testpass")
        .start()
        .await
        .unwrap();
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();

    let (entities, feedback) = RepoCreator::default()
        .with_all()
        .create(
            ConnectionDetails::Url(format!(
                "postgresql://testuser:testpass@{host}:{port}/feedback"
            )),
            Some(1),
        )
        .await
        .unwrap();

    TestRuntime {
        _container: container,
        entities,
        feedback,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn get_missing_entity_returns_none() {
    let runtime = runtime().await;
    common::get_missing_entity_returns_none(&runtime.entities).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn create_then_get_returns_created_entity() {
    let runtime = runtime().await;
    common::create_then_get_returns_created_entity(&runtime.entities).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn create_duplicate_id_fails() {
    let runtime = runtime().await;
    common::create_duplicate_id_fails(&runtime.entities).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn set_status_missing_entity_returns_none() {
    let runtime = runtime().await;
    common::set_status_missing_entity_returns_none(&runtime.entities).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn set_status_overwrites_and_is_idempotent() {
    let runtime = runtime().await;
    common::set_status_overwrites_and_is_idempotent(&runtime.entities).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn list_pages_through_entities() {
    let runtime = runtime().await;
    common::list_pages_through_entities(&runtime.entities).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn query_without_feedback_is_empty() {
    let runtime = runtime().await;
    common::query_without_feedback_is_empty(&runtime.feedback).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn append_then_query_only_returns_own_entity() {
    let runtime = runtime().await;
    common::append_then_query_only_returns_own_entity(&runtime.entities, &runtime.feedback)
        .await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn append_for_unknown_entity_fails() {
    let runtime = runtime().await;

    let result = feedback_core::repository::FeedbackRepository::append(
        &runtime.feedback,
        common::new_feedback("ghost", 3, common::at(1_000)),
    )
    .await;

    assert!(result.is_err());
}
