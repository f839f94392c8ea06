//! Behaviour of the in-memory adapter, including rollback on failure.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::{FieldUpdate, Price, RecipeTitle, TimeMinutes};

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

fn names(raw: &[&str]) -> Vec<AttributeName> {
    raw.iter()
        .map(|name| AttributeName::new(name).expect("valid name"))
        .collect()
}

fn draft(tags: &[&str], ingredients: &[&str]) -> NewRecipe {
    NewRecipe {
        title: RecipeTitle::new("Thai prawn curry").expect("title"),
        time_minutes: TimeMinutes::new(30).expect("minutes"),
        price: "5.50".parse::<Price>().expect("price"),
        description: None,
        link: None,
        tags: names(tags),
        ingredients: names(ingredients),
    }
}

fn tag_names(recipe: &Recipe) -> Vec<&str> {
    recipe.tags.iter().map(|tag| tag.name.as_ref()).collect()
}

#[rstest]
#[tokio::test]
async fn create_reuses_existing_and_creates_missing(store: InMemoryStore, owner: UserId) {
    let indian = AttributeRepository::create(
        &store,
        &owner,
        AttributeKind::Tag,
        AttributeName::new("Indian").expect("name"),
    )
    .await
    .expect("seed tag");

    let recipe = RecipeRepository::create(&store, &owner, draft(&["Thai", "Indian"], &[]))
        .await
        .expect("create");

    assert_eq!(recipe.tags.len(), 2);
    assert!(recipe.tags.iter().any(|tag| tag.id == indian.id));
    let all = AttributeRepository::list(&store, &owner, AttributeKind::Tag, false)
        .await
        .expect("list");
    assert_eq!(all.len(), 2);
}

#[rstest]
#[tokio::test]
async fn other_owners_attributes_are_never_reused(store: InMemoryStore, owner: UserId) {
    let stranger = UserId::random();
    let foreign = AttributeRepository::create(
        &store,
        &stranger,
        AttributeKind::Tag,
        AttributeName::new("Vegan").expect("name"),
    )
    .await
    .expect("seed");

    let recipe = RecipeRepository::create(&store, &owner, draft(&["Vegan"], &[]))
        .await
        .expect("create");

    assert_ne!(recipe.tags[0].id, foreign.id);
    assert_eq!(recipe.tags[0].owner, owner);
}

#[rstest]
#[tokio::test]
async fn duplicate_names_attach_once(store: InMemoryStore, owner: UserId) {
    let recipe = RecipeRepository::create(&store, &owner, draft(&["Thai", "Thai"], &[]))
        .await
        .expect("create");
    assert_eq!(tag_names(&recipe), vec!["Thai"]);
}

#[rstest]
#[tokio::test]
async fn update_replaces_only_supplied_collections(store: InMemoryStore, owner: UserId) {
    let created = RecipeRepository::create(&store, &owner, draft(&["Thai"], &["Prawns"]))
        .await
        .expect("create");
    let changes = RecipeChanges {
        tags: FieldUpdate::Set(names(&["Lunch"])),
        ..RecipeChanges::default()
    };

    let updated = RecipeRepository::update(&store, &owner, created.id, changes)
        .await
        .expect("update")
        .expect("owned");

    assert_eq!(tag_names(&updated), vec!["Lunch"]);
    assert_eq!(updated.ingredients.len(), 1);
    assert_eq!(updated.ingredients[0].name.as_ref(), "Prawns");
}

#[rstest]
#[tokio::test]
async fn empty_collection_clears_links_but_keeps_attributes(store: InMemoryStore, owner: UserId) {
    let created = RecipeRepository::create(&store, &owner, draft(&["Thai"], &[]))
        .await
        .expect("create");
    let changes = RecipeChanges {
        tags: FieldUpdate::Set(Vec::new()),
        ..RecipeChanges::default()
    };

    let updated = RecipeRepository::update(&store, &owner, created.id, changes)
        .await
        .expect("update")
        .expect("owned");

    assert!(updated.tags.is_empty());
    let tags = AttributeRepository::list(&store, &owner, AttributeKind::Tag, false)
        .await
        .expect("list");
    assert_eq!(tags.len(), 1);
    let assigned = AttributeRepository::list(&store, &owner, AttributeKind::Tag, true)
        .await
        .expect("list");
    assert!(assigned.is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_association_leaves_no_new_attributes(store: InMemoryStore, owner: UserId) {
    store.fail_next_attach();

    let result = RecipeRepository::create(&store, &owner, draft(&["Thai"], &[])).await;

    assert!(matches!(result, Err(RecipeRepositoryError::Query { .. })));
    let tags = AttributeRepository::list(&store, &owner, AttributeKind::Tag, false)
        .await
        .expect("list");
    assert!(tags.is_empty());
    let recipes = RecipeRepository::list(&store, &owner, &RecipeFilter::default())
        .await
        .expect("list");
    assert!(recipes.is_empty());
}

#[rstest]
#[tokio::test]
async fn list_is_owner_scoped_and_newest_first(store: InMemoryStore, owner: UserId) {
    let first = RecipeRepository::create(&store, &owner, draft(&[], &[]))
        .await
        .expect("first");
    let second = RecipeRepository::create(&store, &owner, draft(&[], &[]))
        .await
        .expect("second");
    RecipeRepository::create(&store, &UserId::random(), draft(&[], &[]))
        .await
        .expect("foreign");

    let listed = RecipeRepository::list(&store, &owner, &RecipeFilter::default())
        .await
        .expect("list");

    let ids: Vec<_> = listed.iter().map(|recipe| recipe.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[rstest]
#[tokio::test]
async fn rename_is_visible_through_recipes(store: InMemoryStore, owner: UserId) {
    let created = RecipeRepository::create(&store, &owner, draft(&["Thai"], &[]))
        .await
        .expect("create");
    let tag = created.tags[0].clone();

    AttributeRepository::rename(
        &store,
        &owner,
        AttributeKind::Tag,
        tag.id,
        AttributeName::new("Thai food").expect("name"),
    )
    .await
    .expect("rename")
    .expect("owned");

    let reloaded = RecipeRepository::find(&store, &owner, created.id)
        .await
        .expect("find")
        .expect("owned");
    assert_eq!(tag_names(&reloaded), vec!["Thai food"]);
}

#[rstest]
#[tokio::test]
async fn attribute_kind_mismatch_is_treated_as_missing(store: InMemoryStore, owner: UserId) {
    let tag = AttributeRepository::create(
        &store,
        &owner,
        AttributeKind::Tag,
        AttributeName::new("Thai").expect("name"),
    )
    .await
    .expect("create");

    let found = AttributeRepository::find(&store, &owner, AttributeKind::Ingredient, tag.id)
        .await
        .expect("find");
    assert!(found.is_none());
    let deleted = AttributeRepository::delete(&store, &owner, AttributeKind::Ingredient, tag.id)
        .await
        .expect("delete");
    assert!(!deleted);
}

#[rstest]
#[tokio::test]
async fn replace_image_reports_previous(store: InMemoryStore, owner: UserId) {
    let created = RecipeRepository::create(&store, &owner, draft(&[], &[]))
        .await
        .expect("create");
    let first = ImageRef::fresh(crate::domain::ImageFormat::Png);
    let second = ImageRef::fresh(crate::domain::ImageFormat::Jpeg);

    let initial = RecipeRepository::replace_image(&store, &owner, created.id, Some(first.clone()))
        .await
        .expect("replace")
        .expect("owned");
    assert_eq!(initial.previous, None);

    let swapped = RecipeRepository::replace_image(&store, &owner, created.id, Some(second.clone()))
        .await
        .expect("replace")
        .expect("owned");
    assert_eq!(swapped.previous, Some(first));
    assert_eq!(swapped.recipe.image, Some(second));
}

#[rstest]
#[tokio::test]
async fn seeded_users_are_found_by_email(store: InMemoryStore) {
    let email = EmailAddress::new("cook@example.com").expect("email");
    let account = store.seed_user(email.clone(), "hash");

    let found = store.find_by_email(&email).await.expect("lookup");

    assert_eq!(found, Some(account));
}
