//! Tag and ingredient handlers.
//!
//! Both collections share one set of handlers; the first path segment picks
//! the kind.
//!
//! ```text
//! GET    /api/v1/{tags|ingredients}?assignedOnly=1
//! POST   /api/v1/{tags|ingredients}
//! GET    /api/v1/{tags|ingredients}/{id}
//! PATCH  /api/v1/{tags|ingredients}/{id}
//! PUT    /api/v1/{tags|ingredients}/{id}
//! DELETE /api/v1/{tags|ingredients}/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Attribute, AttributeId, AttributeKind, AttributeName, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::{AttributeDto, AttributeNameRequest};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Owner;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_flag};

const ASSIGNED_ONLY_PARAM: FieldName = FieldName::new("assignedOnly");

/// Collection segment of an attribute route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttributeCollection {
    Tags,
    Ingredients,
}

impl From<AttributeCollection> for AttributeKind {
    fn from(value: AttributeCollection) -> Self {
        match value {
            AttributeCollection::Tags => Self::Tag,
            AttributeCollection::Ingredients => Self::Ingredient,
        }
    }
}

/// Query string of the list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttributeListQuery {
    /// `1` lists only entries attached to at least one recipe.
    #[serde(rename = "assignedOnly")]
    #[param(example = "1")]
    pub assigned_only: Option<String>,
}

fn validated_name(payload: AttributeNameRequest) -> Result<AttributeName, Error> {
    AttributeName::new(payload.name).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(serde_json::json!({
            "field": "name",
            "code": err.code(),
        }))
    })
}

fn to_dtos(attributes: &[Attribute]) -> Vec<AttributeDto> {
    attributes.iter().map(AttributeDto::from).collect()
}

/// List the caller's tags or ingredients, name descending.
#[utoipa::path(
    get,
    path = "/api/v1/{kind}",
    params(
        ("kind" = AttributeCollection, Path, description = "tags or ingredients"),
        AttributeListQuery
    ),
    responses(
        (status = 200, description = "Attributes", body = [AttributeDto]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["attributes"],
    operation_id = "listAttributes"
)]
#[get("/{kind:tags|ingredients}")]
pub async fn list_attributes(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<AttributeCollection>,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeDto>>> {
    let assigned_only = parse_flag(query.assigned_only.as_deref(), ASSIGNED_ONLY_PARAM)?;
    let attributes = state
        .attributes_query
        .list(owner.id(), path.into_inner().into(), assigned_only)
        .await?;
    Ok(web::Json(to_dtos(&attributes)))
}

/// Create a tag or ingredient owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/{kind}",
    params(("kind" = AttributeCollection, Path, description = "tags or ingredients")),
    request_body = AttributeNameRequest,
    responses(
        (status = 201, description = "Created", body = AttributeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["attributes"],
    operation_id = "createAttribute"
)]
#[post("/{kind:tags|ingredients}")]
pub async fn create_attribute(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<AttributeCollection>,
    payload: web::Json<AttributeNameRequest>,
) -> ApiResult<HttpResponse> {
    let name = validated_name(payload.into_inner())?;
    let created = state
        .attributes
        .create(owner.id(), path.into_inner().into(), name)
        .await?;
    Ok(HttpResponse::Created().json(AttributeDto::from(&created)))
}

/// Fetch one of the caller's tags or ingredients.
#[utoipa::path(
    get,
    path = "/api/v1/{kind}/{id}",
    params(
        ("kind" = AttributeCollection, Path, description = "tags or ingredients"),
        ("id" = i64, Path, description = "Attribute id")
    ),
    responses(
        (status = 200, description = "Attribute", body = AttributeDto),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["attributes"],
    operation_id = "getAttribute"
)]
#[get("/{kind:tags|ingredients}/{id}")]
pub async fn get_attribute(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<(AttributeCollection, i64)>,
) -> ApiResult<web::Json<AttributeDto>> {
    let (collection, id) = path.into_inner();
    let attribute = state
        .attributes_query
        .get(owner.id(), collection.into(), AttributeId::new(id))
        .await?;
    Ok(web::Json(AttributeDto::from(&attribute)))
}

async fn rename(
    owner: &Owner,
    state: &HttpState,
    (collection, id): (AttributeCollection, i64),
    payload: AttributeNameRequest,
) -> ApiResult<web::Json<AttributeDto>> {
    let name = validated_name(payload)?;
    let renamed = state
        .attributes
        .rename(owner.id(), collection.into(), AttributeId::new(id), name)
        .await?;
    Ok(web::Json(AttributeDto::from(&renamed)))
}

/// Rename a tag or ingredient.
#[utoipa::path(
    patch,
    path = "/api/v1/{kind}/{id}",
    params(
        ("kind" = AttributeCollection, Path, description = "tags or ingredients"),
        ("id" = i64, Path, description = "Attribute id")
    ),
    request_body = AttributeNameRequest,
    responses(
        (status = 200, description = "Renamed", body = AttributeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["attributes"],
    operation_id = "patchAttribute"
)]
#[patch("/{kind:tags|ingredients}/{id}")]
pub async fn patch_attribute(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<(AttributeCollection, i64)>,
    payload: web::Json<AttributeNameRequest>,
) -> ApiResult<web::Json<AttributeDto>> {
    rename(&owner, &state, path.into_inner(), payload.into_inner()).await
}

/// Replace a tag or ingredient; `name` is its only field.
#[utoipa::path(
    put,
    path = "/api/v1/{kind}/{id}",
    params(
        ("kind" = AttributeCollection, Path, description = "tags or ingredients"),
        ("id" = i64, Path, description = "Attribute id")
    ),
    request_body = AttributeNameRequest,
    responses(
        (status = 200, description = "Replaced", body = AttributeDto),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["attributes"],
    operation_id = "replaceAttribute"
)]
#[put("/{kind:tags|ingredients}/{id}")]
pub async fn replace_attribute(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<(AttributeCollection, i64)>,
    payload: web::Json<AttributeNameRequest>,
) -> ApiResult<web::Json<AttributeDto>> {
    rename(&owner, &state, path.into_inner(), payload.into_inner()).await
}

/// Delete a tag or ingredient; recipes simply lose the association.
#[utoipa::path(
    delete,
    path = "/api/v1/{kind}/{id}",
    params(
        ("kind" = AttributeCollection, Path, description = "tags or ingredients"),
        ("id" = i64, Path, description = "Attribute id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["attributes"],
    operation_id = "deleteAttribute"
)]
#[delete("/{kind:tags|ingredients}/{id}")]
pub async fn delete_attribute(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<(AttributeCollection, i64)>,
) -> ApiResult<HttpResponse> {
    let (collection, id) = path.into_inner();
    state
        .attributes
        .delete(owner.id(), collection.into(), AttributeId::new(id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
