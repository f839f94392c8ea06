//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod attributes;
pub mod error;
pub mod health;
pub mod images;
pub mod recipes;
pub mod recipes_dto;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register extractor error handlers and every `/api/v1` route.
///
/// Callers supply [`state::HttpState`] as app data and wrap the app in a
/// session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(
            web::scope("/api/v1")
                .service(users::login)
                .service(users::logout)
                .service(recipes::list_recipes)
                .service(recipes::create_recipe)
                .service(images::upload_image)
                .service(recipes::get_recipe)
                .service(recipes::patch_recipe)
                .service(recipes::replace_recipe)
                .service(recipes::delete_recipe)
                .service(attributes::list_attributes)
                .service(attributes::create_attribute)
                .service(attributes::get_attribute)
                .service(attributes::patch_attribute)
                .service(attributes::replace_attribute)
                .service(attributes::delete_attribute),
        );
}
