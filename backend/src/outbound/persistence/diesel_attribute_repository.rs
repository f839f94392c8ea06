//! PostgreSQL-backed `AttributeRepository` for tags and ingredients.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AttributeRepository, AttributeRepositoryError};
use crate::domain::{Attribute, AttributeId, AttributeKind, AttributeName, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AttributeRow, NewAttributeRow};
use super::pool::{DbPool, PoolError};
use super::schema::{attributes, recipe_attributes};

#[derive(Clone)]
pub struct DieselAttributeRepository {
    pool: DbPool,
}

impl DieselAttributeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AttributeRepositoryError {
    map_pool_error(&error, AttributeRepositoryError::connection)
}

fn diesel_error(error: DieselError) -> AttributeRepositoryError {
    map_diesel_error(
        &error,
        AttributeRepositoryError::query,
        AttributeRepositoryError::connection,
    )
}

fn into_attribute(row: AttributeRow) -> Result<Attribute, AttributeRepositoryError> {
    row.into_domain()
        .map_err(|err| AttributeRepositoryError::query(err.to_string()))
}

#[async_trait]
impl AttributeRepository for DieselAttributeRepository {
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut query = attributes::table
            .filter(attributes::owner_id.eq(*owner.as_uuid()))
            .filter(attributes::kind.eq(kind.as_str()))
            .select(AttributeRow::as_select())
            .order((attributes::name.desc(), attributes::id.desc()))
            .into_boxed();
        if assigned_only {
            query = query.filter(exists(
                recipe_attributes::table
                    .filter(recipe_attributes::attribute_id.eq(attributes::id)),
            ));
        }

        query
            .load::<AttributeRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(into_attribute)
            .collect()
    }

    async fn find(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<Option<Attribute>, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        attributes::table
            .filter(attributes::id.eq(id.get()))
            .filter(attributes::owner_id.eq(*owner.as_uuid()))
            .filter(attributes::kind.eq(kind.as_str()))
            .select(AttributeRow::as_select())
            .first::<AttributeRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(into_attribute)
            .transpose()
    }

    async fn create(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(attributes::table)
            .values(NewAttributeRow {
                owner_id: *owner.as_uuid(),
                kind: kind.as_str(),
                name: name.as_ref(),
            })
            .returning(AttributeRow::as_returning())
            .get_result::<AttributeRow>(&mut conn)
            .await
            .map_err(diesel_error)?;
        into_attribute(row)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<Option<Attribute>, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            attributes::table
                .filter(attributes::id.eq(id.get()))
                .filter(attributes::owner_id.eq(*owner.as_uuid()))
                .filter(attributes::kind.eq(kind.as_str())),
        )
        .set(attributes::name.eq(name.as_ref()))
        .returning(AttributeRow::as_returning())
        .get_result::<AttributeRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?
        .map(into_attribute)
        .transpose()
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<bool, AttributeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // Association rows are removed by ON DELETE CASCADE.
        let removed = diesel::delete(
            attributes::table
                .filter(attributes::id.eq(id.get()))
                .filter(attributes::owner_id.eq(*owner.as_uuid()))
                .filter(attributes::kind.eq(kind.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(removed > 0)
    }
}
