use crate::postgres::statements::{self, Sql};
use crate::postgres::{RepoInitErr, check_bounds};
use deadpool_postgres::{Object, Pool};
use engine::PageBounds;
use error_stack::{IntoReport, Report, ResultExt};
use feedback_core::model::{Entity, EntityId, EntityStatus, NewEntity};
use feedback_core::repository::EntityRepository;
use feedback_core::result::{EntityRepoError, OptRepoResult, RepoResult};
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use tracing::debug;

#[derive(Clone)]
pub struct EntityRepo {
    pool: Pool,
}

impl EntityRepo {
    /// Prepares every statement once up front so a broken schema fails start-up
    /// instead of the first request.
    pub async fn new(pool: Pool) -> Result<Self, Report<RepoInitErr>> {
        let client = pool.get().await.change_context(RepoInitErr::entities())?;

        for sql in statements::entities::ALL {
            client
                .prepare_typed_cached(sql.query, sql.types)
                .await
                .change_context(RepoInitErr::entities())
                .attach_with(|| format!("statement: {}", sql.query))?;
        }

        Ok(Self { pool })
    }

    async fn client(&self, on_err: EntityRepoError) -> RepoResult<Object, EntityRepoError> {
        self.pool.get().await.change_context(on_err)
    }

    async fn query_opt(
        &self,
        sql: &Sql,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
        on_err: fn() -> EntityRepoError,
    ) -> OptRepoResult<Row, EntityRepoError> {
        let client = self.client(on_err()).await?;
        let statement = client
            .prepare_typed_cached(sql.query, sql.types)
            .await
            .change_context(on_err())?;

        client
            .query_opt(&statement, params)
            .await
            .change_context(on_err())
    }
}

fn row_to_entity(row: &Row, on_err: EntityRepoError) -> RepoResult<Entity, EntityRepoError> {
    let status: &str = row.get("status");
    let status: EntityStatus = status.parse().change_context(on_err)?;

    Ok(Entity {
        id: EntityId::new(row.get::<_, String>("id")),
        name: row.get("name"),
        status,
        created: row.get("created"),
        updated: row.get("updated"),
    })
}

impl EntityRepository for EntityRepo {
    async fn get(&self, id: EntityId) -> OptRepoResult<Entity, EntityRepoError> {
        self.query_opt(&statements::entities::GET, &[&id.as_str()], || {
            EntityRepoError::Get
        })
        .await?
        .map(|row| row_to_entity(&row, EntityRepoError::Get))
        .transpose()
    }

    async fn list(&self, bounds: PageBounds) -> RepoResult<Vec<Entity>, EntityRepoError> {
        let bounds = check_bounds(bounds, EntityRepoError::List)?;
        let sql = &statements::entities::LIST;

        let client = self.client(EntityRepoError::List).await?;
        let statement = client
            .prepare_typed_cached(sql.query, sql.types)
            .await
            .change_context(EntityRepoError::List)?;

        client
            .query(&statement, &[&bounds.offset, &bounds.limit])
            .await
            .change_context(EntityRepoError::List)?
            .iter()
            .map(|row| row_to_entity(row, EntityRepoError::List))
            .collect()
    }

    async fn create(&self, new_entity: NewEntity) -> RepoResult<Entity, EntityRepoError> {
        let sql = &statements::entities::CREATE;

        let client = self.client(EntityRepoError::Create).await?;
        let statement = client
            .prepare_typed_cached(sql.query, sql.types)
            .await
            .change_context(EntityRepoError::Create)?;

        let result = client
            .query_one(
                &statement,
                &[
                    &new_entity.id.as_str(),
                    &new_entity.name,
                    &EntityStatus::Active.as_str(),
                ],
            )
            .await;

        match result {
            Ok(row) => {
                debug!(entity.id = %new_entity.id, "stored entity");
                row_to_entity(&row, EntityRepoError::Create)
            }
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => Err(e.into_report())
                .change_context(EntityRepoError::AlreadyExists)
                .attach_with(|| format!("entity '{}' already exists", new_entity.id)),
            Err(e) => Err(e.into_report()).change_context(EntityRepoError::Create),
        }
    }

    async fn set_status(
        &self,
        id: EntityId,
        status: EntityStatus,
    ) -> OptRepoResult<Entity, EntityRepoError> {
        self.query_opt(
            &statements::entities::SET_STATUS,
            &[&id.as_str(), &status.as_str()],
            || EntityRepoError::SetStatus,
        )
        .await?
        .map(|row| row_to_entity(&row, EntityRepoError::SetStatus))
        .transpose()
    }
}
