use crate::classification::domain::embedding::Embedding;
use crate::shared::group::{Group, GroupCatalog};

/// Known-face embeddings per group, kept in catalog order.
///
/// Built once at startup and shared read-only afterwards. A group without
/// references is legal; it simply never matches.
#[derive(Clone, Debug)]
pub struct ReferenceSet {
    catalog: GroupCatalog,
    references: Vec<Vec<Embedding>>,
}

impl ReferenceSet {
    pub fn new(catalog: GroupCatalog) -> Self {
        let references = vec![Vec::new(); catalog.len()];
        Self {
            catalog,
            references,
        }
    }

    pub fn catalog(&self) -> &GroupCatalog {
        &self.catalog
    }

    /// Appends a reference for `group`. Groups not in the catalog are ignored.
    pub fn add(&mut self, group: &Group, embedding: Embedding) {
        if self.catalog.get(group.name()) == Some(group) {
            self.references[group.rank()].push(embedding);
        } else {
            log::warn!("Ignoring reference for unknown group '{group}'");
        }
    }

    pub fn references(&self, group: &Group) -> &[Embedding] {
        match self.catalog.get(group.name()) {
            Some(known) if known == group => &self.references[group.rank()],
            _ => &[],
        }
    }

    /// Groups paired with their references, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&Group, &[Embedding])> {
        self.catalog
            .iter()
            .zip(self.references.iter().map(Vec::as_slice))
    }

    pub fn total(&self) -> usize {
        self.references.iter().map(Vec::len).sum()
    }
}
