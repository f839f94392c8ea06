//! Process-local repository adapter.
//!
//! [`InMemoryStore`] implements every persistence port over one mutex-guarded
//! snapshot. Each write runs against a clone of the snapshot and is committed
//! only when it succeeds, so a failure midway through reconciliation leaves
//! no created attributes or links behind. Used when no database URL is
//! configured and by the integration tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
#[cfg(any(test, feature = "test-support"))]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::ports::{
    AttributeRepository, AttributeRepositoryError, RecipeRepository, RecipeRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Attribute, AttributeId, AttributeKind, AttributeName, EmailAddress, ImageRef,
    ImageReplacement, NewRecipe, PlanEntry, Recipe, RecipeChanges, RecipeFilter, RecipeId,
    ReconciliationPlan, UserAccount, UserId, listing_order,
};

const KINDS: [AttributeKind; 2] = [AttributeKind::Tag, AttributeKind::Ingredient];

/// Failure inside the store, mapped onto each port's query error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
struct StoreFault(String);

impl From<StoreFault> for RecipeRepositoryError {
    fn from(fault: StoreFault) -> Self {
        Self::query(fault.0)
    }
}

impl From<StoreFault> for AttributeRepositoryError {
    fn from(fault: StoreFault) -> Self {
        Self::query(fault.0)
    }
}

impl From<StoreFault> for UserRepositoryError {
    fn from(fault: StoreFault) -> Self {
        Self::query(fault.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    last_recipe_id: i64,
    last_attribute_id: i64,
    /// Stored without nested attributes; `links` is authoritative.
    recipes: BTreeMap<RecipeId, Recipe>,
    attributes: BTreeMap<AttributeId, Attribute>,
    links: BTreeSet<(RecipeId, AttributeId)>,
    users: Vec<UserAccount>,
}

impl Snapshot {
    fn owned_recipe(&self, owner: &UserId, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id).filter(|recipe| &recipe.owner == owner)
    }

    fn owned_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Option<&Attribute> {
        self.attributes
            .get(&id)
            .filter(|attribute| &attribute.owner == owner && attribute.kind == kind)
    }

    fn linked(&self, recipe: RecipeId) -> impl Iterator<Item = AttributeId> + '_ {
        self.links
            .range((recipe, AttributeId::new(i64::MIN))..=(recipe, AttributeId::new(i64::MAX)))
            .map(|(_, attribute)| *attribute)
    }

    /// Attach nested attributes, ordered by id.
    fn hydrate(&self, stored: &Recipe) -> Recipe {
        let mut recipe = stored.clone();
        for attribute in self.linked(stored.id).filter_map(|id| self.attributes.get(&id)) {
            match attribute.kind {
                AttributeKind::Tag => recipe.tags.push(attribute.clone()),
                AttributeKind::Ingredient => recipe.ingredients.push(attribute.clone()),
            }
        }
        recipe
    }

    fn insert_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Attribute {
        self.last_attribute_id += 1;
        let attribute = Attribute {
            id: AttributeId::new(self.last_attribute_id),
            owner: owner.clone(),
            kind,
            name,
        };
        self.attributes.insert(attribute.id, attribute.clone());
        attribute
    }

    /// Resolve names to ids, creating the missing attributes.
    fn reconcile(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        names: &[AttributeName],
    ) -> Vec<AttributeId> {
        let existing: Vec<Attribute> = self
            .attributes
            .values()
            .filter(|attribute| {
                &attribute.owner == owner && attribute.kind == kind && names.contains(&attribute.name)
            })
            .cloned()
            .collect();
        ReconciliationPlan::new(names, &existing)
            .into_entries()
            .into_iter()
            .map(|entry| match entry {
                PlanEntry::Reuse(id) => id,
                PlanEntry::Create(name) => self.insert_attribute(owner, kind, name).id,
            })
            .collect()
    }

    fn unlink_kind(&mut self, recipe: RecipeId, kind: AttributeKind) {
        let attributes = &self.attributes;
        self.links.retain(|(linked_recipe, attribute)| {
            *linked_recipe != recipe
                || attributes
                    .get(attribute)
                    .is_some_and(|attribute| attribute.kind != kind)
        });
    }
}

/// Mutex-guarded store implementing the recipe, attribute, and user ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<Snapshot>,
    #[cfg(any(test, feature = "test-support"))]
    fail_next_attach: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account that can log in.
    pub fn seed_user(&self, email: EmailAddress, password_hash: impl Into<String>) -> UserAccount {
        let account = UserAccount {
            id: UserId::random(),
            email,
            password_hash: password_hash.into(),
        };
        match self.state.lock() {
            Ok(mut state) => state.users.push(account.clone()),
            Err(poisoned) => poisoned.into_inner().users.push(account.clone()),
        }
        account
    }

    /// Make the next association step fail after attributes were created.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next_attach(&self) {
        self.fail_next_attach.store(true, Ordering::SeqCst);
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T, StoreFault> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreFault("in-memory store lock poisoned".to_owned()))?;
        Ok(f(&state))
    }

    /// Run `f` on a working copy and commit it only on success.
    fn write<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> Result<T, StoreFault>,
    ) -> Result<T, StoreFault> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreFault("in-memory store lock poisoned".to_owned()))?;
        let mut working = state.clone();
        let value = f(&mut working)?;
        *state = working;
        Ok(value)
    }

    fn attach(
        &self,
        snapshot: &mut Snapshot,
        recipe: RecipeId,
        ids: Vec<AttributeId>,
    ) -> Result<(), StoreFault> {
        #[cfg(any(test, feature = "test-support"))]
        if self.fail_next_attach.swap(false, Ordering::SeqCst) {
            return Err(StoreFault("injected association failure".to_owned()));
        }
        snapshot
            .links
            .extend(ids.into_iter().map(|attribute| (recipe, attribute)));
        Ok(())
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let recipes = self.read(|snapshot| {
            snapshot
                .recipes
                .values()
                .rev()
                .filter(|recipe| &recipe.owner == owner)
                .map(|recipe| snapshot.hydrate(recipe))
                .filter(|recipe| filter.matches(recipe))
                .collect()
        })?;
        Ok(recipes)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let recipe = self.read(|snapshot| {
            snapshot
                .owned_recipe(owner, id)
                .map(|recipe| snapshot.hydrate(recipe))
        })?;
        Ok(recipe)
    }

    async fn create(
        &self,
        owner: &UserId,
        recipe: NewRecipe,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let created = self.write(|snapshot| {
            snapshot.last_recipe_id += 1;
            let id = RecipeId::new(snapshot.last_recipe_id);
            let stored = Recipe {
                id,
                owner: owner.clone(),
                title: recipe.title.clone(),
                time_minutes: recipe.time_minutes,
                price: recipe.price.clone(),
                description: recipe.description.clone(),
                link: recipe.link.clone(),
                image: None,
                tags: Vec::new(),
                ingredients: Vec::new(),
            };
            snapshot.recipes.insert(id, stored.clone());
            for kind in KINDS {
                let names = recipe.names(kind);
                if names.is_empty() {
                    continue;
                }
                let ids = snapshot.reconcile(owner, kind, names);
                self.attach(snapshot, id, ids)?;
            }
            Ok(snapshot.hydrate(&stored))
        })?;
        Ok(created)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let updated = self.write(|snapshot| {
            let Some(mut stored) = snapshot.owned_recipe(owner, id).cloned() else {
                return Ok(None);
            };
            changes.apply_scalars(&mut stored);
            snapshot.recipes.insert(id, stored.clone());
            for kind in KINDS {
                let Some(names) = changes.names(kind).as_set() else {
                    continue;
                };
                snapshot.unlink_kind(id, kind);
                let ids = snapshot.reconcile(owner, kind, names);
                self.attach(snapshot, id, ids)?;
            }
            Ok(Some(snapshot.hydrate(&stored)))
        })?;
        Ok(updated)
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let removed = self.write(|snapshot| {
            let Some(stored) = snapshot.owned_recipe(owner, id).cloned() else {
                return Ok(None);
            };
            let recipe = snapshot.hydrate(&stored);
            snapshot.recipes.remove(&id);
            snapshot.links.retain(|(linked, _)| *linked != id);
            Ok(Some(recipe))
        })?;
        Ok(removed)
    }

    async fn replace_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: Option<ImageRef>,
    ) -> Result<Option<ImageReplacement>, RecipeRepositoryError> {
        let replaced = self.write(|snapshot| {
            let Some(mut stored) = snapshot.owned_recipe(owner, id).cloned() else {
                return Ok(None);
            };
            let previous = std::mem::replace(&mut stored.image, image);
            snapshot.recipes.insert(id, stored.clone());
            Ok(Some(ImageReplacement {
                recipe: snapshot.hydrate(&stored),
                previous,
            }))
        })?;
        Ok(replaced)
    }
}

#[async_trait]
impl AttributeRepository for InMemoryStore {
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let mut attributes: Vec<Attribute> = self.read(|snapshot| {
            snapshot
                .attributes
                .values()
                .filter(|attribute| &attribute.owner == owner && attribute.kind == kind)
                .filter(|attribute| {
                    !assigned_only
                        || snapshot
                            .links
                            .iter()
                            .any(|(_, linked)| *linked == attribute.id)
                })
                .cloned()
                .collect()
        })?;
        attributes.sort_by(listing_order);
        Ok(attributes)
    }

    async fn find(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<Option<Attribute>, AttributeRepositoryError> {
        let attribute =
            self.read(|snapshot| snapshot.owned_attribute(owner, kind, id).cloned())?;
        Ok(attribute)
    }

    async fn create(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, AttributeRepositoryError> {
        let attribute = self.write(|snapshot| Ok(snapshot.insert_attribute(owner, kind, name)))?;
        Ok(attribute)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<Option<Attribute>, AttributeRepositoryError> {
        let renamed = self.write(|snapshot| {
            if snapshot.owned_attribute(owner, kind, id).is_none() {
                return Ok(None);
            }
            let renamed = snapshot.attributes.get_mut(&id).map(|attribute| {
                attribute.name = name;
                attribute.clone()
            });
            Ok(renamed)
        })?;
        Ok(renamed)
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<bool, AttributeRepositoryError> {
        let removed = self.write(|snapshot| {
            if snapshot.owned_attribute(owner, kind, id).is_none() {
                return Ok(false);
            }
            snapshot.attributes.remove(&id);
            snapshot.links.retain(|(_, linked)| *linked != id);
            Ok(true)
        })?;
        Ok(removed)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let account = self.read(|snapshot| {
            snapshot
                .users
                .iter()
                .find(|account| &account.email == email)
                .cloned()
        })?;
        Ok(account)
    }
}

#[cfg(test)]
mod tests;
