//! OpenAPI documentation for the recipe API.
//!
//! Swagger UI serves this document at `/docs` in debug builds, and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::attributes::AttributeCollection;
use crate::inbound::http::images::ImageUploadForm;
use crate::inbound::http::recipes_dto::{
    AttributeDto, AttributeNameRequest, CreateRecipeRequest, PatchRecipeRequest, RecipeDetailDto,
    RecipeImageDto, RecipeSummaryDto, ReplaceRecipeRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::users::LoginRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Register the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe API",
        description = "Per-user recipes with tags, ingredients, and images."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::patch_recipe,
        crate::inbound::http::recipes::replace_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::images::upload_image,
        crate::inbound::http::attributes::list_attributes,
        crate::inbound::http::attributes::create_attribute,
        crate::inbound::http::attributes::get_attribute,
        crate::inbound::http::attributes::patch_attribute,
        crate::inbound::http::attributes::replace_attribute,
        crate::inbound::http::attributes::delete_attribute,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        CreateRecipeRequest,
        ReplaceRecipeRequest,
        PatchRecipeRequest,
        AttributeNameRequest,
        AttributeDto,
        AttributeCollection,
        RecipeSummaryDto,
        RecipeDetailDto,
        RecipeImageDto,
        ImageUploadForm,
    )),
    tags(
        (name = "users", description = "Login and logout"),
        (name = "recipes", description = "Recipes owned by the caller"),
        (name = "attributes", description = "Tags and ingredients owned by the caller"),
        (name = "health", description = "Health checks for orchestration")
    )
)]
pub struct ApiDoc;
