use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait,
    IntoActiveModel, ModelTrait, PrimaryKeyTrait, QueryFilter, Value,
};
use uuid::Uuid;

use nearly_core::domain::{Counter, Record};
use nearly_core::error::RepoError;
use nearly_core::ports::{BaseRepository, CounterRepository};

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// Map a SeaORM error onto the repository error space.
pub(crate) fn map_db_err(e: DbErr) -> RepoError {
    match &e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
            RepoError::Connection(e.to_string())
        }
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        _ => {
            let msg = e.to_string();
            if msg.contains("duplicate") || msg.contains("unique") {
                RepoError::Constraint(msg)
            } else {
                RepoError::Query(msg)
            }
        }
    }
}

/// Convert a list of rows, failing on the first corrupt one.
pub(crate) fn convert_all<M, T>(models: Vec<M>) -> Result<Vec<T>, RepoError>
where
    T: TryFrom<M, Error = RepoError>,
{
    models.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl<E, T> BaseRepository<T, Uuid> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    T: Record + TryFrom<E::Model, Error = RepoError> + Into<E::ActiveModel>,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        result.map(T::try_from).transpose()
    }

    /// Insert a new row or update the existing one with the same id.
    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let exists = E::find_by_id(entity.id())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .is_some();

        let active_model: E::ActiveModel = entity.into();
        let model = if exists {
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(map_db_err)?;

        T::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// Entities carrying `i64` counter columns.
pub(crate) trait CounterColumns: EntityTrait {
    fn id_column() -> Self::Column;

    fn counter_column(counter: Counter) -> Option<Self::Column>;
}

impl<E> PostgresBaseRepository<E>
where
    E: CounterColumns,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
{
    /// `UPDATE .. SET col = col + delta WHERE id = $1 [AND guard]`, then read
    /// the column back. A guard that matched nothing leaves the row as it was.
    async fn bump_column(
        &self,
        id: Uuid,
        counter: Counter,
        delta: i64,
        cap: Option<i64>,
    ) -> Result<Option<i64>, RepoError> {
        let col = E::counter_column(counter)
            .ok_or_else(|| RepoError::Query(format!("no {counter} column")))?;

        let mut update = E::update_many()
            .col_expr(col, Expr::col(col).add(delta))
            .filter(E::id_column().eq(id));
        if delta < 0 {
            update = update.filter(col.gte(delta.saturating_neg()));
        }
        if let Some(cap) = cap {
            update = update.filter(col.lt(cap));
        }
        let result = update.exec(&self.db).await.map_err(map_db_err)?;

        let model = E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;
        let value = match model.get(col) {
            Value::BigInt(Some(v)) => v,
            other => return Err(RepoError::Corrupt(format!("{counter} = {other:?}"))),
        };

        if result.rows_affected == 0 && cap.is_some() {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

#[async_trait]
impl<E> CounterRepository for PostgresBaseRepository<E>
where
    E: CounterColumns,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
{
    async fn bump(&self, id: Uuid, counter: Counter, delta: i64) -> Result<i64, RepoError> {
        let value = self.bump_column(id, counter, delta, None).await?;
        value.ok_or_else(|| RepoError::Query(format!("{counter} was not updated")))
    }

    async fn bump_capped(
        &self,
        id: Uuid,
        counter: Counter,
        cap: i64,
    ) -> Result<Option<i64>, RepoError> {
        self.bump_column(id, counter, 1, Some(cap)).await
    }
}
