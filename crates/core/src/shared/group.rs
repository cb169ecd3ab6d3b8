use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::shared::constants::DEFAULT_GROUPS;

/// One of the fixed classification categories.
///
/// Groups order by their position in the [`GroupCatalog`]. That order is
/// the tie-break everywhere a vote between groups is counted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    rank: usize,
    name: Arc<str>,
}

impl Group {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"science"` → `"Science"`.
    pub fn title(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// `"science"` → `"SCIENCE"`.
    pub fn banner(&self) -> String {
        self.name.to_uppercase()
    }
}

impl Ord for Group {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Group {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GroupCatalogError {
    #[error("at least one group is required")]
    Empty,
    #[error("group names must not be blank")]
    Blank,
    #[error("group '{0}' is listed more than once")]
    Duplicate(String),
}

/// The ordered, immutable set of groups known to the program.
#[derive(Clone, Debug)]
pub struct GroupCatalog {
    groups: Vec<Group>,
}

impl GroupCatalog {
    pub fn new<I, S>(names: I) -> Result<Self, GroupCatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut groups = Vec::new();
        for (rank, name) in names.into_iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(GroupCatalogError::Blank);
            }
            if !seen.insert(name.to_string()) {
                return Err(GroupCatalogError::Duplicate(name.to_string()));
            }
            groups.push(Group {
                rank,
                name: Arc::from(name),
            });
        }
        if groups.is_empty() {
            return Err(GroupCatalogError::Empty);
        }
        Ok(Self { groups })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(Group::name).collect()
    }
}

impl Default for GroupCatalog {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS
                .iter()
                .enumerate()
                .map(|(rank, name)| Group {
                    rank,
                    name: Arc::from(*name),
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a GroupCatalog {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
