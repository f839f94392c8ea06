//! Recipe image upload.
//!
//! ```text
//! POST /api/v1/recipes/{id}/image   (multipart/form-data, field "image")
//! ```

use actix_multipart::{Field, Multipart};
use actix_web::{post, web};
use futures_util::StreamExt;
use utoipa::ToSchema;

use crate::domain::{Error, ImageUploadError, RecipeId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::RecipeImageDto;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::Owner;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, duplicate_field_error, missing_field_error};

const IMAGE_FIELD_NAME: &str = "image";
const IMAGE_FIELD: FieldName = FieldName::new(IMAGE_FIELD_NAME);

/// OpenAPI shape of the multipart body.
#[derive(ToSchema)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

fn multipart_error(err: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

async fn read_capped(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(multipart_error)?;
        if bytes.len() + chunk.len() > max_bytes {
            return Err(ImageUploadError::TooLarge { max: max_bytes }.into());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn drain(field: &mut Field) -> Result<(), Error> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(multipart_error)?;
    }
    Ok(())
}

/// Pull exactly one `image` field out of the form; other fields are skipped.
async fn single_image(mut payload: Multipart, max_bytes: usize) -> Result<Vec<u8>, Error> {
    let mut image = None;
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(multipart_error)?;
        if field.name() != Some(IMAGE_FIELD_NAME) {
            drain(&mut field).await?;
            continue;
        }
        if image.is_some() {
            return Err(duplicate_field_error(IMAGE_FIELD));
        }
        image = Some(read_capped(&mut field, max_bytes).await?);
    }
    image.ok_or_else(|| missing_field_error(IMAGE_FIELD))
}

/// Replace the recipe's image with the uploaded file.
///
/// The bytes must decode as PNG, JPEG, GIF, or WebP; on rejection the stored
/// image is left untouched.
#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/image",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageDto),
        (status = 400, description = "Invalid upload", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "uploadRecipeImage"
)]
#[post("/recipes/{id}/image")]
pub async fn upload_image(
    owner: Owner,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: Multipart,
) -> ApiResult<web::Json<RecipeImageDto>> {
    let id = RecipeId::new(path.into_inner());
    // A foreign or missing recipe is 404 whatever the body holds.
    state.recipes_query.get(owner.id(), id).await?;

    let bytes = single_image(payload, state.max_image_bytes()).await?;
    let recipe = state.recipes.upload_image(owner.id(), id, bytes).await?;
    Ok(web::Json(RecipeImageDto {
        id: recipe.id.get(),
        image: recipe.image.as_ref().map(|image| state.image_url(image)),
    }))
}
