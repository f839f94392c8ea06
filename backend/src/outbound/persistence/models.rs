//! Internal Diesel row structs.
//!
//! Never exposed outside the persistence module; repositories convert them
//! into validated domain types.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Attribute, AttributeId, AttributeKind, AttributeName, EmailAddress, ImageRef, Price, Recipe,
    RecipeId, RecipeLink, RecipeTitle, TimeMinutes, UserAccount, UserId,
};

use super::schema::{attributes, recipe_attributes, recipes, users};

/// A stored row that no longer satisfies domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row {id} is invalid: {reason}")]
pub(crate) struct RowDecodeError {
    table: &'static str,
    id: String,
    reason: String,
}

impl RowDecodeError {
    pub(crate) fn new(table: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        Self {
            table,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<UserAccount, RowDecodeError> {
        let email =
            EmailAddress::new(&self.email).map_err(|err| RowDecodeError::new("users", self.id, err))?;
        Ok(UserAccount {
            id: UserId::from_uuid(self.id),
            email,
            password_hash: self.password_hash,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub owner_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: BigDecimal,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image_key: Option<String>,
}

impl RecipeRow {
    /// Rebuild the aggregate from the row and its attached attribute rows.
    pub(crate) fn into_domain(
        self,
        attached: Vec<AttributeRow>,
    ) -> Result<Recipe, RowDecodeError> {
        let id = self.id;
        let invalid = |reason: String| RowDecodeError::new("recipes", id, reason);

        let mut tags = Vec::new();
        let mut ingredients = Vec::new();
        for row in attached {
            let attribute = row.into_domain()?;
            match attribute.kind {
                AttributeKind::Tag => tags.push(attribute),
                AttributeKind::Ingredient => ingredients.push(attribute),
            }
        }

        Ok(Recipe {
            id: RecipeId::new(id),
            owner: UserId::from_uuid(self.owner_id),
            title: RecipeTitle::new(&self.title).map_err(|err| invalid(err.to_string()))?,
            time_minutes: TimeMinutes::new(i64::from(self.time_minutes))
                .map_err(|err| invalid(err.to_string()))?,
            price: Price::new(self.price).map_err(|err| invalid(err.to_string()))?,
            description: self.description,
            link: self
                .link
                .map(RecipeLink::new)
                .transpose()
                .map_err(|err| invalid(err.to_string()))?,
            image: self
                .image_key
                .as_deref()
                .map(ImageRef::parse)
                .transpose()
                .map_err(|err| invalid(err.to_string()))?,
            tags,
            ingredients,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub owner_id: Uuid,
    pub title: &'a str,
    pub time_minutes: i32,
    pub price: &'a BigDecimal,
    pub description: Option<&'a str>,
    pub link: Option<&'a str>,
}

/// Scalar changes; `None` leaves a column untouched, `Some(None)` nulls it.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = recipes)]
pub(crate) struct RecipeChangeset<'a> {
    pub title: Option<&'a str>,
    pub time_minutes: Option<i32>,
    pub price: Option<&'a BigDecimal>,
    pub description: Option<Option<&'a str>>,
    pub link: Option<Option<&'a str>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attributes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttributeRow {
    pub id: i64,
    pub owner_id: Uuid,
    pub kind: String,
    pub name: String,
}

impl AttributeRow {
    pub(crate) fn into_domain(self) -> Result<Attribute, RowDecodeError> {
        let id = self.id;
        let kind = self
            .kind
            .parse::<AttributeKind>()
            .map_err(|err| RowDecodeError::new("attributes", id, err))?;
        let name =
            AttributeName::new(&self.name).map_err(|err| RowDecodeError::new("attributes", id, err))?;
        Ok(Attribute {
            id: AttributeId::new(id),
            owner: UserId::from_uuid(self.owner_id),
            kind,
            name,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attributes)]
pub(crate) struct NewAttributeRow<'a> {
    pub owner_id: Uuid,
    pub kind: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = recipe_attributes)]
pub(crate) struct RecipeAttributeRow {
    pub recipe_id: i64,
    pub attribute_id: i64,
}
