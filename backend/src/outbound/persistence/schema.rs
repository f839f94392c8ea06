//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts allowed to log in.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        owner_id -> Uuid,
        title -> Varchar,
        time_minutes -> Int4,
        price -> Numeric,
        description -> Nullable<Text>,
        link -> Nullable<Varchar>,
        /// Store-relative key such as `recipes/<uuid>.png`.
        image_key -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tags and ingredients, distinguished by `kind`.
    attributes (id) {
        id -> Int8,
        owner_id -> Uuid,
        kind -> Varchar,
        name -> Varchar,
    }
}

diesel::table! {
    recipe_attributes (recipe_id, attribute_id) {
        recipe_id -> Int8,
        attribute_id -> Int8,
    }
}

diesel::joinable!(recipe_attributes -> recipes (recipe_id));
diesel::joinable!(recipe_attributes -> attributes (attribute_id));

diesel::allow_tables_to_appear_in_same_query!(users, recipes, attributes, recipe_attributes);
