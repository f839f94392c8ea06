//! Integration tests for the Diesel adapters against embedded PostgreSQL.
//!
//! These exercise the SQL the in-memory store cannot: exact-name reuse under
//! the C collation, owner-scoped row locking, and transaction rollback when
//! a write fails part way through.

use recipe_backend::domain::ports::{
    AttributeRepository, RecipeRepository, RecipeRepositoryError, UserRepository,
};
use recipe_backend::domain::{
    AttributeKind, AttributeName, EmailAddress, FieldUpdate, ImageFormat, ImageRef, NewRecipe,
    Price, Recipe, RecipeChanges, RecipeFilter, RecipeTitle, TimeMinutes, UserId,
};
use recipe_backend::outbound::persistence::{
    DieselAttributeRepository, DieselRecipeRepository, DieselUserRepository,
};
use rstest::{fixture, rstest};

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{Database, handle_cluster_setup_failure, provision};

const COUNT_ATTRIBUTES: &str = "SELECT COUNT(*) FROM attributes WHERE owner_id = $1";

struct TestContext {
    recipes: DieselRecipeRepository,
    attributes: DieselAttributeRepository,
    users: DieselUserRepository,
    alice: UserId,
    bob: UserId,
    db: Database,
}

impl TestContext {
    fn block_on<F: std::future::Future>(&self, work: F) -> F::Output {
        self.db.runtime.block_on(work)
    }

    fn attribute_count(&self, owner: &UserId) -> i64 {
        self.db.count(COUNT_ATTRIBUTES, &[owner.as_uuid()])
    }

    fn create(&self, owner: &UserId, recipe: NewRecipe) -> Recipe {
        self.block_on(self.recipes.create(owner, recipe))
            .expect("create recipe")
    }

    fn update(&self, owner: &UserId, recipe: &Recipe, changes: RecipeChanges) -> Option<Recipe> {
        self.block_on(self.recipes.update(owner, recipe.id, changes))
            .expect("update recipe")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let db = provision()?;
    let alice = db.seed_user("alice@example.com", "not-a-real-hash");
    let bob = db.seed_user("bob@example.com", "not-a-real-hash");
    Ok(TestContext {
        recipes: DieselRecipeRepository::new(db.pool.clone()),
        attributes: DieselAttributeRepository::new(db.pool.clone()),
        users: DieselUserRepository::new(db.pool.clone()),
        alice,
        bob,
        db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn names(raw: &[&str]) -> Vec<AttributeName> {
    raw.iter()
        .map(|name| AttributeName::new(name).expect("valid attribute name"))
        .collect()
}

fn curry(tags: &[&str], ingredients: &[&str]) -> NewRecipe {
    NewRecipe {
        title: RecipeTitle::new("Curry").expect("valid title"),
        time_minutes: TimeMinutes::new(30).expect("valid time"),
        price: "5.50".parse::<Price>().expect("valid price"),
        description: None,
        link: None,
        tags: names(tags),
        ingredients: names(ingredients),
    }
}

fn retag(tags: &[&str]) -> RecipeChanges {
    RecipeChanges {
        tags: FieldUpdate::Set(names(tags)),
        ..RecipeChanges::default()
    }
}

fn attached(recipe: &Recipe, kind: AttributeKind) -> Vec<&str> {
    recipe
        .attributes(kind)
        .iter()
        .map(|attribute| attribute.name.as_ref())
        .collect()
}

#[rstest]
fn create_reuses_tags_matching_by_exact_name(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };

    let first = ctx.create(&ctx.alice, curry(&["Indian"], &[]));
    let second = ctx.create(&ctx.alice, curry(&["Indian", "Thai"], &["Prawns"]));

    assert_eq!(attached(&second, AttributeKind::Tag), ["Indian", "Thai"]);
    assert_eq!(second.tags[0].id, first.tags[0].id);
    assert_eq!(attached(&second, AttributeKind::Ingredient), ["Prawns"]);
    assert_eq!(ctx.attribute_count(&ctx.alice), 3);

    let tags = ctx
        .block_on(ctx.attributes.list(&ctx.alice, AttributeKind::Tag, false))
        .expect("list tags");
    let listed: Vec<&str> = tags.iter().map(|tag| tag.name.as_ref()).collect();
    assert_eq!(listed, ["Thai", "Indian"]);
}

#[rstest]
fn tag_names_match_case_sensitively(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };

    let upper = ctx.create(&ctx.alice, curry(&["Indian"], &[]));
    let lower = ctx.create(&ctx.alice, curry(&["indian"], &[]));

    assert_ne!(upper.tags[0].id, lower.tags[0].id);
    assert_eq!(ctx.attribute_count(&ctx.alice), 2);
}

#[rstest]
fn same_names_under_different_owners_stay_separate(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };

    let mine = ctx.create(&ctx.alice, curry(&["Indian"], &[]));
    let theirs = ctx.create(&ctx.bob, curry(&["Indian"], &[]));

    assert_ne!(mine.tags[0].id, theirs.tags[0].id);
    assert_eq!(theirs.tags[0].owner, ctx.bob);
}

#[rstest]
fn update_replaces_the_whole_tag_set(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&["Indian", "Thai"], &["Rice"]));

    let updated = ctx
        .update(&ctx.alice, &recipe, retag(&["Thai", "Spicy"]))
        .expect("owned recipe");

    assert_eq!(attached(&updated, AttributeKind::Tag), ["Thai", "Spicy"]);
    assert_eq!(attached(&updated, AttributeKind::Ingredient), ["Rice"]);
    // Detached tags stay in the owner's catalogue.
    assert_eq!(ctx.attribute_count(&ctx.alice), 4);
}

#[rstest]
fn empty_list_clears_the_set(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&["Indian"], &["Rice"]));

    let updated = ctx
        .update(&ctx.alice, &recipe, retag(&[]))
        .expect("owned recipe");
    assert!(updated.tags.is_empty());
    assert_eq!(attached(&updated, AttributeKind::Ingredient), ["Rice"]);

    let reloaded = ctx
        .block_on(ctx.recipes.find(&ctx.alice, recipe.id))
        .expect("find recipe")
        .expect("recipe exists");
    assert!(reloaded.tags.is_empty());
}

#[rstest]
fn foreign_update_writes_nothing(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&["Indian"], &[]));

    let changes = RecipeChanges {
        title: FieldUpdate::Set(RecipeTitle::new("Stolen").expect("valid title")),
        ..retag(&["Fresh"])
    };
    assert_eq!(ctx.update(&ctx.bob, &recipe, changes), None);

    assert_eq!(ctx.attribute_count(&ctx.bob), 0);
    let untouched = ctx
        .block_on(ctx.recipes.find(&ctx.alice, recipe.id))
        .expect("find recipe");
    assert_eq!(untouched, Some(recipe));
}

#[rstest]
fn foreign_recipes_behave_as_missing(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&[], &[]));
    let image = Some(ImageRef::fresh(ImageFormat::Png));

    let found = ctx.block_on(ctx.recipes.find(&ctx.bob, recipe.id));
    let replaced = ctx.block_on(ctx.recipes.replace_image(&ctx.bob, recipe.id, image));
    let deleted = ctx.block_on(ctx.recipes.delete(&ctx.bob, recipe.id));

    assert_eq!(found.expect("find"), None);
    assert_eq!(replaced.expect("replace image"), None);
    assert_eq!(deleted.expect("delete"), None);
    let listed = ctx
        .block_on(ctx.recipes.list(&ctx.bob, &RecipeFilter::default()))
        .expect("list");
    assert!(listed.is_empty());
}

#[rstest]
fn failed_link_insert_rolls_back_new_attributes(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    ctx.db.batch_execute(concat!(
        "CREATE FUNCTION reject_links() RETURNS trigger AS $$ ",
        "BEGIN RAISE EXCEPTION 'links disabled'; END $$ LANGUAGE plpgsql; ",
        "CREATE TRIGGER reject_links BEFORE INSERT ON recipe_attributes ",
        "FOR EACH ROW EXECUTE FUNCTION reject_links();",
    ));

    let result = ctx.block_on(ctx.recipes.create(&ctx.alice, curry(&["Indian"], &["Rice"])));

    assert!(matches!(result, Err(RecipeRepositoryError::Query { .. })));
    assert_eq!(ctx.attribute_count(&ctx.alice), 0);
    assert_eq!(ctx.db.count("SELECT COUNT(*) FROM recipes", &[]), 0);
}

#[rstest]
fn failed_retag_keeps_previous_links(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&["Indian"], &[]));
    ctx.db.batch_execute(concat!(
        "CREATE FUNCTION reject_links() RETURNS trigger AS $$ ",
        "BEGIN RAISE EXCEPTION 'links disabled'; END $$ LANGUAGE plpgsql; ",
        "CREATE TRIGGER reject_links BEFORE INSERT ON recipe_attributes ",
        "FOR EACH ROW EXECUTE FUNCTION reject_links();",
    ));

    let result = ctx.block_on(ctx.recipes.update(&ctx.alice, recipe.id, retag(&["Thai"])));

    assert!(matches!(result, Err(RecipeRepositoryError::Query { .. })));
    assert_eq!(ctx.attribute_count(&ctx.alice), 1);
    let reloaded = ctx
        .block_on(ctx.recipes.find(&ctx.alice, recipe.id))
        .expect("find recipe");
    assert_eq!(reloaded, Some(recipe));
}

#[rstest]
fn list_filters_by_any_listed_tag(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let indian = ctx.create(&ctx.alice, curry(&["Indian"], &[]));
    let thai = ctx.create(&ctx.alice, curry(&["Thai"], &[]));
    ctx.create(&ctx.alice, curry(&["French"], &[]));

    let filter = RecipeFilter {
        tags: vec![indian.tags[0].id, thai.tags[0].id],
        ingredients: Vec::new(),
    };
    let listed = ctx
        .block_on(ctx.recipes.list(&ctx.alice, &filter))
        .expect("list");

    let ids: Vec<_> = listed.iter().map(|recipe| recipe.id).collect();
    assert_eq!(ids, [thai.id, indian.id]);
}

#[rstest]
fn replace_image_returns_the_previous_reference(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&[], &[]));
    let first = ImageRef::fresh(ImageFormat::Png);
    let second = ImageRef::fresh(ImageFormat::Jpeg);

    let initial = ctx
        .block_on(ctx.recipes.replace_image(&ctx.alice, recipe.id, Some(first.clone())))
        .expect("replace image")
        .expect("owned recipe");
    assert_eq!(initial.previous, None);

    let swapped = ctx
        .block_on(ctx.recipes.replace_image(&ctx.alice, recipe.id, Some(second.clone())))
        .expect("replace image")
        .expect("owned recipe");
    assert_eq!(swapped.previous, Some(first));
    assert_eq!(swapped.recipe.image, Some(second));
}

#[rstest]
fn delete_removes_links_but_keeps_attributes(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let recipe = ctx.create(&ctx.alice, curry(&["Indian"], &["Rice"]));

    let deleted = ctx
        .block_on(ctx.recipes.delete(&ctx.alice, recipe.id))
        .expect("delete");

    assert_eq!(deleted, Some(recipe));
    assert_eq!(ctx.db.count("SELECT COUNT(*) FROM recipe_attributes", &[]), 0);
    assert_eq!(ctx.attribute_count(&ctx.alice), 2);
}

#[rstest]
fn users_are_found_by_email(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else { return };
    let email = EmailAddress::new("alice@example.com").expect("valid email");
    let missing = EmailAddress::new("carol@example.com").expect("valid email");

    let account = ctx
        .block_on(ctx.users.find_by_email(&email))
        .expect("query users")
        .expect("seeded account");
    assert_eq!(account.id, ctx.alice);

    let absent = ctx
        .block_on(ctx.users.find_by_email(&missing))
        .expect("query users");
    assert!(absent.is_none());
}
