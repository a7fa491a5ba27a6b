//! Immutable id-keyed collections swapped wholesale on reload.

use std::collections::HashMap;

use crate::entity::{EntityId, Identified};

/// Entities of one kind keyed by identifier.
///
/// A collection is never patched in place; the store replaces it with a new
/// value built from a complete payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: HashMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl<T: Identified> Collection<T> {
    /// Build a collection from a complete payload.
    ///
    /// A later duplicate identifier replaces an earlier one.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.id().clone(), item))
                .collect(),
        }
    }

    /// Look up an element.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.items.get(id)
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.items.contains_key(id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the elements in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NamedPlace;
    use rstest::rstest;

    fn place(id: &str, name: &str) -> NamedPlace {
        NamedPlace {
            id: EntityId::from(id),
            name: name.to_owned(),
            positions: Vec::new(),
            parcels: Vec::new(),
        }
    }

    #[rstest]
    fn later_duplicate_wins() {
        let collection = Collection::from_items([place("t1", "Old"), place("t1", "New")]);
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.get(&EntityId::from("t1")).map(|p| p.name.as_str()),
            Some("New")
        );
    }

    #[rstest]
    fn missing_id_is_absent() {
        let collection = Collection::from_items([place("t1", "Le Bourg")]);
        assert!(collection.get(&EntityId::from("t2")).is_none());
        assert!(!collection.contains(&EntityId::from("t2")));
    }
}
