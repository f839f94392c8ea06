//! PostgreSQL-backed `RecipeRepository`.
//!
//! Every mutation runs inside one transaction. The owned recipe row is locked
//! with `SELECT ... FOR UPDATE` before tags and ingredients are reconciled, so
//! a foreign or missing id returns early without writing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    AttributeKind, AttributeName, FieldUpdate, ImageRef, ImageReplacement, NewRecipe, PlanEntry,
    Recipe, RecipeChanges, RecipeFilter, RecipeId, ReconciliationPlan, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    AttributeRow, NewAttributeRow, NewRecipeRow, RecipeAttributeRow, RecipeChangeset, RecipeRow,
    RowDecodeError,
};
use super::pool::{DbPool, PoolError};
use super::schema::{attributes, recipe_attributes, recipes};

const KINDS: [AttributeKind; 2] = [AttributeKind::Tag, AttributeKind::Ingredient];

/// A recipe row with its attached attribute rows.
type Loaded = (RecipeRow, Vec<AttributeRow>);

#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RecipeRepositoryError {
    map_pool_error(&error, RecipeRepositoryError::connection)
}

fn diesel_error(error: DieselError) -> RecipeRepositoryError {
    map_diesel_error(
        &error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

fn decode_error(error: RowDecodeError) -> DieselError {
    DieselError::DeserializationError(Box::new(error))
}

fn into_recipe((row, attached): Loaded) -> Result<Recipe, RecipeRepositoryError> {
    row.into_domain(attached)
        .map_err(|err| RecipeRepositoryError::query(err.to_string()))
}

/// Load attached attributes for `rows`, ordered by attribute id.
async fn load_attached(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> Result<Vec<Loaded>, DieselError> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let links: Vec<(i64, AttributeRow)> = recipe_attributes::table
        .inner_join(attributes::table)
        .filter(recipe_attributes::recipe_id.eq_any(ids))
        .order(attributes::id.asc())
        .select((recipe_attributes::recipe_id, AttributeRow::as_select()))
        .load(conn)
        .await?;

    let mut by_recipe: HashMap<i64, Vec<AttributeRow>> = HashMap::new();
    for (recipe_id, attribute) in links {
        by_recipe.entry(recipe_id).or_default().push(attribute);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let attached = by_recipe.remove(&row.id).unwrap_or_default();
            (row, attached)
        })
        .collect())
}

async fn load_one(conn: &mut AsyncPgConnection, row: RecipeRow) -> Result<Loaded, DieselError> {
    let mut loaded = load_attached(conn, vec![row]).await?;
    loaded.pop().ok_or(DieselError::NotFound)
}

/// Lock the owned recipe row, or `None` when `owner` does not own `id`.
async fn lock_owned(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    id: i64,
) -> Result<Option<RecipeRow>, DieselError> {
    recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::owner_id.eq(owner))
        .select(RecipeRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

/// Resolve `names` to attribute ids, creating the missing ones.
async fn reconcile(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    kind: AttributeKind,
    names: &[AttributeName],
) -> Result<Vec<i64>, DieselError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let wanted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    let existing = attributes::table
        .filter(attributes::owner_id.eq(owner))
        .filter(attributes::kind.eq(kind.as_str()))
        .filter(attributes::name.eq_any(wanted))
        .select(AttributeRow::as_select())
        .load::<AttributeRow>(conn)
        .await?
        .into_iter()
        .map(AttributeRow::into_domain)
        .collect::<Result<Vec<_>, _>>()
        .map_err(decode_error)?;

    let plan = ReconciliationPlan::new(names, &existing);
    debug!(
        %kind,
        reused = plan.reused().count(),
        created = plan.to_create().count(),
        "reconciled attribute names"
    );
    let mut resolved = Vec::with_capacity(plan.entries().len());
    for entry in plan.into_entries() {
        let id = match entry {
            PlanEntry::Reuse(id) => id.get(),
            PlanEntry::Create(name) => {
                diesel::insert_into(attributes::table)
                    .values(NewAttributeRow {
                        owner_id: owner,
                        kind: kind.as_str(),
                        name: name.as_ref(),
                    })
                    .returning(attributes::id)
                    .get_result::<i64>(conn)
                    .await?
            }
        };
        resolved.push(id);
    }
    Ok(resolved)
}

async fn attach(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    attribute_ids: &[i64],
) -> Result<(), DieselError> {
    if attribute_ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<RecipeAttributeRow> = attribute_ids
        .iter()
        .map(|attribute_id| RecipeAttributeRow {
            recipe_id,
            attribute_id: *attribute_id,
        })
        .collect();
    diesel::insert_into(recipe_attributes::table)
        .values(&rows)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    Ok(())
}

/// Replace the recipe's `kind` associations with exactly `attribute_ids`.
async fn replace_links(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    kind: AttributeKind,
    attribute_ids: &[i64],
) -> Result<(), DieselError> {
    let of_kind = attributes::table
        .filter(attributes::kind.eq(kind.as_str()))
        .select(attributes::id);
    diesel::delete(
        recipe_attributes::table
            .filter(recipe_attributes::recipe_id.eq(recipe_id))
            .filter(recipe_attributes::attribute_id.eq_any(of_kind)),
    )
    .execute(conn)
    .await?;
    attach(conn, recipe_id, attribute_ids).await
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut query = recipes::table
            .filter(recipes::owner_id.eq(*owner.as_uuid()))
            .select(RecipeRow::as_select())
            .order(recipes::id.desc())
            .into_boxed();
        for kind in KINDS {
            let ids: Vec<i64> = filter.ids(kind).iter().map(|id| id.get()).collect();
            if ids.is_empty() {
                continue;
            }
            let carrying = recipe_attributes::table
                .inner_join(attributes::table)
                .filter(attributes::kind.eq(kind.as_str()))
                .filter(recipe_attributes::attribute_id.eq_any(ids))
                .select(recipe_attributes::recipe_id);
            query = query.filter(recipes::id.eq_any(carrying));
        }

        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        load_attached(&mut conn, rows)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(into_recipe)
            .collect()
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = recipes::table
            .filter(recipes::id.eq(id.get()))
            .filter(recipes::owner_id.eq(*owner.as_uuid()))
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let loaded = load_one(&mut conn, row).await.map_err(diesel_error)?;
        into_recipe(loaded).map(Some)
    }

    async fn create(
        &self,
        owner: &UserId,
        recipe: NewRecipe,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let owner_id = *owner.as_uuid();
        let recipe = &recipe;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let row: RecipeRow = diesel::insert_into(recipes::table)
                        .values(NewRecipeRow {
                            owner_id,
                            title: recipe.title.as_ref(),
                            time_minutes: recipe.time_minutes.get(),
                            price: recipe.price.as_decimal(),
                            description: recipe.description.as_deref(),
                            link: recipe.link.as_ref().map(AsRef::as_ref),
                        })
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    for kind in KINDS {
                        let ids = reconcile(conn, owner_id, kind, recipe.names(kind)).await?;
                        attach(conn, row.id, &ids).await?;
                    }
                    load_one(conn, row).await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        into_recipe(loaded)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let owner_id = *owner.as_uuid();
        let changes = &changes;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    if lock_owned(conn, owner_id, id.get()).await?.is_none() {
                        return Ok(None);
                    }

                    let changeset = RecipeChangeset {
                        title: changes.title.as_set().map(AsRef::as_ref),
                        time_minutes: changes.time_minutes.as_set().map(|minutes| minutes.get()),
                        price: changes.price.as_set().map(|price| price.as_decimal()),
                        description: changes.description.as_set().map(|text| text.as_deref()),
                        link: changes
                            .link
                            .as_set()
                            .map(|link| link.as_ref().map(AsRef::as_ref)),
                        updated_at: Some(Utc::now()),
                    };
                    let row: RecipeRow = diesel::update(recipes::table.find(id.get()))
                        .set(&changeset)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;

                    for kind in KINDS {
                        if let FieldUpdate::Set(names) = changes.names(kind) {
                            let ids = reconcile(conn, owner_id, kind, names).await?;
                            replace_links(conn, row.id, kind, &ids).await?;
                        }
                    }
                    load_one(conn, row).await.map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        loaded.map(into_recipe).transpose()
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let owner_id = *owner.as_uuid();

        let removed = conn
            .transaction(|conn| {
                async move {
                    let Some(row) = lock_owned(conn, owner_id, id.get()).await? else {
                        return Ok(None);
                    };
                    let loaded = load_one(conn, row).await?;
                    // Association rows go with the recipe via ON DELETE CASCADE.
                    diesel::delete(recipes::table.find(id.get()))
                        .execute(conn)
                        .await?;
                    Ok(Some(loaded))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        removed.map(into_recipe).transpose()
    }

    async fn replace_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: Option<ImageRef>,
    ) -> Result<Option<ImageReplacement>, RecipeRepositoryError> {
        let owner_id = *owner.as_uuid();
        // Borrowed by the transaction future, so it must outlive `conn`.
        let key = image.as_ref().map(|image| image.key().to_owned());
        let key = &key;
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let swapped = conn
            .transaction(|conn| {
                async move {
                    let Some(previous) = lock_owned(conn, owner_id, id.get()).await? else {
                        return Ok(None);
                    };
                    let row: RecipeRow = diesel::update(recipes::table.find(id.get()))
                        .set((
                            recipes::image_key.eq(key.as_deref()),
                            recipes::updated_at.eq(Utc::now()),
                        ))
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let loaded = load_one(conn, row).await?;
                    Ok(Some((loaded, previous.image_key)))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        let Some((loaded, previous_key)) = swapped else {
            return Ok(None);
        };
        let previous = previous_key
            .as_deref()
            .map(ImageRef::parse)
            .transpose()
            .map_err(|err| RecipeRepositoryError::query(err.to_string()))?;
        Ok(Some(ImageReplacement {
            recipe: into_recipe(loaded)?,
            previous,
        }))
    }
}
