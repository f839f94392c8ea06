//! Recipe API handlers.
//!
//! ```text
//! GET    /api/v1/recipes?tags=1,2&ingredients=3
//! POST   /api/v1/recipes
//! GET    /api/v1/recipes/{id}
//! PATCH  /api/v1/recipes/{id}
//! PUT    /api/v1/recipes/{id}
//! DELETE /api/v1/recipes/{id}
//! ```
//!
//! Every handler extracts [`Owner`] first so an anonymous caller gets `401`
//! before the body is read.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};

use crate::domain::{Error, NewRecipe, RecipeChanges, RecipeFilter, RecipeId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::{
    CreateRecipeRequest, PatchRecipeRequest, RecipeDetailDto, RecipeListQuery, RecipeSummaryDto,
    ReplaceRecipeRequest,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Owner;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id_list};

const TAGS_PARAM: FieldName = FieldName::new("tags");
const INGREDIENTS_PARAM: FieldName = FieldName::new("ingredients");

impl TryFrom<&RecipeListQuery> for RecipeFilter {
    type Error = Error;

    fn try_from(query: &RecipeListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            tags: parse_id_list(query.tags.as_deref(), TAGS_PARAM)?,
            ingredients: parse_id_list(query.ingredients.as_deref(), INGREDIENTS_PARAM)?,
        })
    }
}

/// List the caller's recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = [RecipeSummaryDto]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipes")]
pub async fn list_recipes(
    owner: Owner,
    state: web::Data<HttpState>,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeSummaryDto>>> {
    let filter = RecipeFilter::try_from(&query.into_inner())?;
    let recipes = state.recipes_query.list(owner.id(), filter).await?;
    Ok(web::Json(
        recipes.iter().map(RecipeSummaryDto::from).collect(),
    ))
}

/// Create a recipe owned by the caller, resolving tags and ingredients by name.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Created", body = RecipeDetailDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    owner: Owner,
    state: web::Data<HttpState>,
    payload: web::Json<CreateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    let recipe = NewRecipe::try_from(payload.into_inner())?;
    let created = state.recipes.create(owner.id(), recipe).await?;
    Ok(HttpResponse::Created().json(RecipeDetailDto::new(&created, &state)))
}

/// Fetch one of the caller's recipes.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetailDto),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeDetailDto>> {
    let recipe = state
        .recipes_query
        .get(owner.id(), RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(RecipeDetailDto::new(&recipe, &state)))
}

async fn apply_changes(
    owner: &Owner,
    state: &HttpState,
    id: i64,
    changes: RecipeChanges,
) -> ApiResult<web::Json<RecipeDetailDto>> {
    let recipe = state
        .recipes
        .update(owner.id(), RecipeId::new(id), changes)
        .await?;
    Ok(web::Json(RecipeDetailDto::new(&recipe, state)))
}

/// Change only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = PatchRecipeRequest,
    responses(
        (status = 200, description = "Updated", body = RecipeDetailDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "patchRecipe"
)]
#[patch("/recipes/{id}")]
pub async fn patch_recipe(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<PatchRecipeRequest>,
) -> ApiResult<web::Json<RecipeDetailDto>> {
    let changes = RecipeChanges::try_from(payload.into_inner())?;
    apply_changes(&owner, &state, path.into_inner(), changes).await
}

/// Replace the recipe's fields; omitted tag or ingredient lists are kept.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = ReplaceRecipeRequest,
    responses(
        (status = 200, description = "Replaced", body = RecipeDetailDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe"
)]
#[put("/recipes/{id}")]
pub async fn replace_recipe(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<ReplaceRecipeRequest>,
) -> ApiResult<web::Json<RecipeDetailDto>> {
    let changes = RecipeChanges::try_from(payload.into_inner())?;
    apply_changes(&owner, &state, path.into_inner(), changes).await
}

/// Delete a recipe and release its stored image.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .recipes
        .delete(owner.id(), RecipeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
