//! Query results

use std::iter::Copied;
use std::slice::Iter;

use super::Entity;

/// Entities matching a set of component kinds.
///
/// The match is taken when the query runs; creating or destroying entities
/// afterwards does not change it. Iterate it as many times as needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entities: Vec<Entity>,
}

impl Query {
    pub(crate) fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn iter(&self) -> Copied<Iter<'_, Entity>> {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.binary_search(&entity).is_ok()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }
}

impl IntoIterator for Query {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = Entity;
    type IntoIter = Copied<Iter<'a, Entity>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
