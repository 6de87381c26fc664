use std::collections::btree_map::{BTreeMap, Entry};

use pokedex_catalog::types::PokemonId;

/// Catalog ids mapped to the names seen for them.
///
/// The catalog detail endpoint is keyed by name while collection entries
/// reference catalog items by id. The index is filled as catalog pages are
/// viewed and is append-only: the first name recorded for an id is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdNameIndex {
    names: BTreeMap<PokemonId, String>,
}

impl IdNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` for `id` unless the id is already known.
    ///
    /// Returns whether the pair was inserted.
    pub fn insert(&mut self, id: PokemonId, name: impl Into<String>) -> bool {
        match self.names.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(name.into());
                true
            },
        }
    }

    /// Record every pair not already known, returning how many were new.
    pub fn merge<N: Into<String>>(
        &mut self,
        pairs: impl IntoIterator<Item = (PokemonId, N)>,
    ) -> usize {
        pairs
            .into_iter()
            .map(|(id, name)| self.insert(id, name))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn get(&self, id: PokemonId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: PokemonId) -> bool {
        self.names.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PokemonId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

impl<N: Into<String>> Extend<(PokemonId, N)> for IdNameIndex {
    fn extend<T: IntoIterator<Item = (PokemonId, N)>>(&mut self, iter: T) {
        self.merge(iter);
    }
}

impl<N: Into<String>> FromIterator<(PokemonId, N)> for IdNameIndex {
    fn from_iter<T: IntoIterator<Item = (PokemonId, N)>>(iter: T) -> Self {
        let mut index = Self::new();
        index.merge(iter);
        index
    }
}
