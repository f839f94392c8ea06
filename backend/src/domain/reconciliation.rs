//! Resolve-or-create planning for nested tag and ingredient names.
//!
//! A recipe payload names its tags and ingredients instead of referencing
//! ids. Before the association set is replaced, every name is matched against
//! the owner's existing attributes of the same kind. Matching is exact and
//! case-sensitive on the trimmed name. Repeated names collapse to one entry
//! and, when the owner already holds several attributes with the same name,
//! the one with the lowest id is reused.
//!
//! Planning is pure so every repository adapter executes the same decisions
//! inside its own transaction.

use std::collections::{HashMap, HashSet};

use super::{Attribute, AttributeId, AttributeName};

/// One resolved position in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEntry {
    /// Attach an existing attribute.
    Reuse(AttributeId),
    /// Create an attribute with this name, then attach it.
    Create(AttributeName),
}

/// Ordered, duplicate-free resolution of a name list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    entries: Vec<PlanEntry>,
}

impl ReconciliationPlan {
    /// Match `names` against `existing`.
    ///
    /// `existing` must already be narrowed to one owner and one kind.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::{
    ///     Attribute, AttributeId, AttributeKind, AttributeName, PlanEntry, ReconciliationPlan,
    ///     UserId,
    /// };
    ///
    /// let owner = UserId::random();
    /// let indian = Attribute {
    ///     id: AttributeId::new(7),
    ///     owner,
    ///     kind: AttributeKind::Tag,
    ///     name: AttributeName::new("Indian").unwrap(),
    /// };
    /// let names = ["Thai", "Indian"].map(|n| AttributeName::new(n).unwrap());
    /// let plan = ReconciliationPlan::new(&names, &[indian]);
    /// assert_eq!(
    ///     plan.entries(),
    ///     &[
    ///         PlanEntry::Create(AttributeName::new("Thai").unwrap()),
    ///         PlanEntry::Reuse(AttributeId::new(7)),
    ///     ]
    /// );
    /// ```
    pub fn new(names: &[AttributeName], existing: &[Attribute]) -> Self {
        let mut by_name: HashMap<&AttributeName, AttributeId> = HashMap::new();
        for attribute in existing {
            by_name
                .entry(&attribute.name)
                .and_modify(|id| *id = (*id).min(attribute.id))
                .or_insert(attribute.id);
        }

        let mut seen = HashSet::new();
        let entries = names
            .iter()
            .filter(|name| seen.insert(*name))
            .map(|name| match by_name.get(name) {
                Some(id) => PlanEntry::Reuse(*id),
                None => PlanEntry::Create(name.clone()),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PlanEntry> {
        self.entries
    }

    /// Ids reused without creating anything.
    pub fn reused(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Reuse(id) => Some(*id),
            PlanEntry::Create(_) => None,
        })
    }

    /// Names that need a new attribute.
    pub fn to_create(&self) -> impl Iterator<Item = &AttributeName> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            PlanEntry::Create(name) => Some(name),
            PlanEntry::Reuse(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttributeKind, UserId};
    use rstest::{fixture, rstest};

    fn name(raw: &str) -> AttributeName {
        AttributeName::new(raw).expect("valid name")
    }

    fn names(raw: &[&str]) -> Vec<AttributeName> {
        raw.iter().map(|value| name(value)).collect()
    }

    #[fixture]
    fn existing() -> Vec<Attribute> {
        let owner = UserId::random();
        [(3, "Indian"), (8, "Vegan"), (2, "Vegan"), (5, "Breakfast")]
            .into_iter()
            .map(|(id, label)| Attribute {
                id: AttributeId::new(id),
                owner: owner.clone(),
                kind: AttributeKind::Tag,
                name: name(label),
            })
            .collect()
    }

    #[rstest]
    fn empty_names_yield_empty_plan(existing: Vec<Attribute>) {
        assert!(ReconciliationPlan::new(&[], &existing).is_empty());
    }

    #[rstest]
    fn reuses_existing_and_creates_missing_in_payload_order(existing: Vec<Attribute>) {
        let plan = ReconciliationPlan::new(&names(&["Thai", "Indian"]), &existing);
        assert_eq!(
            plan.entries(),
            &[PlanEntry::Create(name("Thai")), PlanEntry::Reuse(AttributeId::new(3))]
        );
    }

    #[rstest]
    fn repeated_names_resolve_once(existing: Vec<Attribute>) {
        let plan =
            ReconciliationPlan::new(&names(&["Thai", "Indian", "Thai", "Indian"]), &existing);
        assert_eq!(plan.to_create().count(), 1);
        assert_eq!(plan.reused().collect::<Vec<_>>(), vec![AttributeId::new(3)]);
    }

    #[rstest]
    fn duplicate_stored_names_prefer_lowest_id(existing: Vec<Attribute>) {
        let plan = ReconciliationPlan::new(&names(&["Vegan"]), &existing);
        assert_eq!(plan.entries(), &[PlanEntry::Reuse(AttributeId::new(2))]);
    }

    #[rstest]
    #[case("indian")]
    #[case("INDIAN")]
    fn matching_is_case_sensitive(existing: Vec<Attribute>, #[case] raw: &str) {
        let plan = ReconciliationPlan::new(&names(&[raw]), &existing);
        assert_eq!(plan.entries(), &[PlanEntry::Create(name(raw))]);
    }

    #[rstest]
    fn surrounding_whitespace_is_ignored(existing: Vec<Attribute>) {
        let plan = ReconciliationPlan::new(&names(&["  Breakfast "]), &existing);
        assert_eq!(plan.entries(), &[PlanEntry::Reuse(AttributeId::new(5))]);
    }
}
