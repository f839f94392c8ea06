//! Request and response bodies for the recipe endpoints.
//!
//! Requests name nested tags and ingredients as `{ "name": ... }` objects;
//! any `id`, `user`, or `owner` keys are ignored because unknown keys are
//! never rejected. Responses render prices as two-decimal strings.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Attribute, AttributeKind, AttributeName, FieldUpdate, NewRecipe, Price, PriceError, Recipe,
    RecipeChanges, RecipeLink, RecipeTitle, RecipeValidationError, TimeMinutes,
    normalise_description,
};

use super::state::HttpState;

/// Nested attribute reference in a recipe payload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AttributeNameRequest {
    #[schema(example = "Thai")]
    pub name: String,
}

/// Price given either as a JSON string (`"5.25"`) or a number (`5.25`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

impl PriceInput {
    fn into_price(self) -> Result<Price, PriceError> {
        match self {
            Self::Text(raw) => raw.trim().parse(),
            Self::Number(number) => number.to_string().parse(),
        }
    }
}

fn attribute_names(
    kind: AttributeKind,
    items: Vec<AttributeNameRequest>,
) -> Result<Vec<AttributeName>, RecipeValidationError> {
    items
        .into_iter()
        .map(|item| {
            AttributeName::new(item.name)
                .map_err(|source| RecipeValidationError::AttributeName { kind, source })
        })
        .collect()
}

/// Body of `POST /api/v1/recipes`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    #[schema(example = "Thai prawn curry")]
    pub title: String,
    #[schema(example = 30)]
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.50")]
    pub price: PriceInput,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<AttributeNameRequest>,
    #[serde(default)]
    pub ingredients: Vec<AttributeNameRequest>,
}

impl TryFrom<CreateRecipeRequest> for NewRecipe {
    type Error = RecipeValidationError;

    fn try_from(value: CreateRecipeRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: RecipeTitle::new(&value.title)?,
            time_minutes: TimeMinutes::new(value.time_minutes)?,
            price: value.price.into_price()?,
            description: normalise_description(value.description),
            link: RecipeLink::optional(value.link)?,
            tags: attribute_names(AttributeKind::Tag, value.tags)?,
            ingredients: attribute_names(AttributeKind::Ingredient, value.ingredients)?,
        })
    }
}

/// Body of `PUT /api/v1/recipes/{id}`.
///
/// Omitted `description` and `link` are cleared; omitted `tags` and
/// `ingredients` keep their current associations.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceRecipeRequest {
    pub title: String,
    pub time_minutes: i64,
    #[schema(value_type = String, example = "5.50")]
    pub price: PriceInput,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<AttributeNameRequest>>,
    #[serde(default)]
    pub ingredients: Option<Vec<AttributeNameRequest>>,
}

impl TryFrom<ReplaceRecipeRequest> for RecipeChanges {
    type Error = RecipeValidationError;

    fn try_from(value: ReplaceRecipeRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: FieldUpdate::Set(RecipeTitle::new(&value.title)?),
            time_minutes: FieldUpdate::Set(TimeMinutes::new(value.time_minutes)?),
            price: FieldUpdate::Set(value.price.into_price()?),
            description: FieldUpdate::Set(normalise_description(value.description)),
            link: FieldUpdate::Set(RecipeLink::optional(value.link)?),
            tags: FieldUpdate::from(value.tags)
                .try_map(|items| attribute_names(AttributeKind::Tag, items))?,
            ingredients: FieldUpdate::from(value.ingredients)
                .try_map(|items| attribute_names(AttributeKind::Ingredient, items))?,
        })
    }
}

/// Body of `PATCH /api/v1/recipes/{id}`; only present keys change.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchRecipeRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub title: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub time_minutes: FieldUpdate<i64>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price: FieldUpdate<PriceInput>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: FieldUpdate<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub link: FieldUpdate<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<AttributeNameRequest>>)]
    pub tags: FieldUpdate<Vec<AttributeNameRequest>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<AttributeNameRequest>>)]
    pub ingredients: FieldUpdate<Vec<AttributeNameRequest>>,
}

impl TryFrom<PatchRecipeRequest> for RecipeChanges {
    type Error = RecipeValidationError;

    fn try_from(value: PatchRecipeRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title.try_map(RecipeTitle::new)?,
            time_minutes: value.time_minutes.try_map(TimeMinutes::new)?,
            price: value.price.try_map(PriceInput::into_price)?,
            description: value.description.map(normalise_description),
            link: value.link.try_map(RecipeLink::optional)?,
            tags: value
                .tags
                .try_map(|items| attribute_names(AttributeKind::Tag, items))?,
            ingredients: value
                .ingredients
                .try_map(|items| attribute_names(AttributeKind::Ingredient, items))?,
        })
    }
}

/// Query string of `GET /api/v1/recipes`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids; a recipe matches when it carries any of them.
    #[param(example = "1,2")]
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe matches when it carries any of them.
    #[param(example = "3")]
    pub ingredients: Option<String>,
}

/// Tag or ingredient as rendered inside and outside recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttributeDto {
    pub id: i64,
    pub name: String,
}

impl From<&Attribute> for AttributeDto {
    fn from(value: &Attribute) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.to_string(),
        }
    }
}

fn attribute_dtos(attributes: &[Attribute]) -> Vec<AttributeDto> {
    attributes.iter().map(AttributeDto::from).collect()
}

/// List entry: no description, no image.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryDto {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "5.50")]
    pub price: String,
    pub link: Option<String>,
    pub tags: Vec<AttributeDto>,
    pub ingredients: Vec<AttributeDto>,
}

impl From<&Recipe> for RecipeSummaryDto {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.get(),
            title: recipe.title.as_ref().to_owned(),
            time_minutes: recipe.time_minutes.get(),
            price: recipe.price.to_string(),
            link: recipe.link.as_ref().map(|link| link.as_ref().to_owned()),
            tags: attribute_dtos(&recipe.tags),
            ingredients: attribute_dtos(&recipe.ingredients),
        }
    }
}

/// Full recipe representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailDto {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "5.50")]
    pub price: String,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Public URL of the uploaded image.
    pub image: Option<String>,
    pub tags: Vec<AttributeDto>,
    pub ingredients: Vec<AttributeDto>,
}

impl RecipeDetailDto {
    pub fn new(recipe: &Recipe, state: &HttpState) -> Self {
        Self {
            id: recipe.id.get(),
            title: recipe.title.as_ref().to_owned(),
            time_minutes: recipe.time_minutes.get(),
            price: recipe.price.to_string(),
            description: recipe.description.clone(),
            link: recipe.link.as_ref().map(|link| link.as_ref().to_owned()),
            image: recipe.image.as_ref().map(|image| state.image_url(image)),
            tags: attribute_dtos(&recipe.tags),
            ingredients: attribute_dtos(&recipe.ingredients),
        }
    }
}

/// Response of `POST /api/v1/recipes/{id}/image`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeImageDto {
    pub id: i64,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn patch(body: serde_json::Value) -> PatchRecipeRequest {
        serde_json::from_value(body).expect("patch body")
    }

    #[rstest]
    fn create_accepts_string_and_number_prices() {
        for price in [json!("5.25"), json!(5.25)] {
            let request: CreateRecipeRequest = serde_json::from_value(json!({
                "title": "Curry",
                "timeMinutes": 10,
                "price": price,
            }))
            .expect("body");
            let recipe = NewRecipe::try_from(request).expect("valid");
            assert_eq!(recipe.price.to_string(), "5.25");
        }
    }

    #[rstest]
    fn create_ignores_owner_keys() {
        let request: CreateRecipeRequest = serde_json::from_value(json!({
            "title": "Curry",
            "timeMinutes": 10,
            "price": "1.00",
            "user": "someone-else",
            "owner": 42,
        }))
        .expect("unknown keys are ignored");
        assert!(NewRecipe::try_from(request).is_ok());
    }

    #[rstest]
    fn nested_names_are_validated_per_kind() {
        let request: CreateRecipeRequest = serde_json::from_value(json!({
            "title": "Curry",
            "timeMinutes": 10,
            "price": "1.00",
            "ingredients": [{"name": "   "}],
        }))
        .expect("body");
        let err = NewRecipe::try_from(request).expect_err("blank ingredient");
        assert_eq!(err.field(), "ingredients");
        assert_eq!(err.code(), "empty_name");
    }

    #[rstest]
    fn patch_distinguishes_absent_empty_and_null() {
        let absent = RecipeChanges::try_from(patch(json!({}))).expect("valid");
        assert_eq!(absent, RecipeChanges::default());

        let cleared = RecipeChanges::try_from(patch(json!({"tags": [], "link": null})))
            .expect("valid");
        assert_eq!(cleared.tags, FieldUpdate::Set(Vec::new()));
        assert_eq!(cleared.link, FieldUpdate::Set(None));
        assert_eq!(cleared.ingredients, FieldUpdate::Unchanged);
    }

    #[rstest]
    fn put_clears_optional_text_but_keeps_collections() {
        let request: ReplaceRecipeRequest = serde_json::from_value(json!({
            "title": "Curry",
            "timeMinutes": 10,
            "price": "1.00",
        }))
        .expect("body");
        let changes = RecipeChanges::try_from(request).expect("valid");
        assert_eq!(changes.description, FieldUpdate::Set(None));
        assert_eq!(changes.link, FieldUpdate::Set(None));
        assert_eq!(changes.tags, FieldUpdate::Unchanged);
    }

    #[rstest]
    #[case(json!({"price": "-1"}), "price")]
    #[case(json!({"timeMinutes": -5}), "timeMinutes")]
    #[case(json!({"title": "  "}), "title")]
    #[case(json!({"link": "ftp://example.com"}), "link")]
    fn patch_reports_the_failing_field(#[case] body: serde_json::Value, #[case] field: &str) {
        let err = RecipeChanges::try_from(patch(body)).expect_err("invalid");
        assert_eq!(err.field(), field);
    }
}
