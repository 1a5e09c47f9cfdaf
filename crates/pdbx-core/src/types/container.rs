use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

use super::category::DataCategory;
use super::{fold, validate_block_name, validate_item_part};

/// Name given to a container read from a `global_` block.
pub const GLOBAL_BLOCK_NAME: &str = "blank-global";

/// One `data_<name>` block: an ordered collection of categories.
///
/// A container flagged global stands for a `global_` block and is written
/// without its name. Category names are unique case-insensitively and keep the casing they
/// were first inserted with. Iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContainerRepr", into = "ContainerRepr")]
pub struct DataContainer {
    name: String,
    global: bool,
    categories: Vec<DataCategory>,
    index: HashMap<String, usize>,
}

impl DataContainer {
    /// Creates an empty container. The name may be empty but must not
    /// contain whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        validate_block_name(&name)?;
        Ok(Self {
            name,
            global: false,
            categories: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Creates an empty container for a `global_` block.
    pub fn global() -> Self {
        Self {
            name: GLOBAL_BLOCK_NAME.to_string(),
            global: true,
            categories: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn set_global(&mut self, global: bool) {
        self.global = global;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ModelError> {
        let name = name.into();
        validate_block_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&fold(name))
    }

    pub fn category(&self, name: &str) -> Option<&DataCategory> {
        self.index.get(&fold(name)).map(|&i| &self.categories[i])
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut DataCategory> {
        match self.index.get(&fold(name)) {
            Some(&i) => Some(&mut self.categories[i]),
            None => None,
        }
    }

    /// Like [`category`](Self::category) but reports a missing category as
    /// a lookup error.
    pub fn get(&self, name: &str) -> Result<&DataCategory, ModelError> {
        self.category(name)
            .ok_or_else(|| ModelError::CategoryNotFound(name.to_string()))
    }

    /// Fetches a category, creating an empty one at the end if needed.
    pub fn category_or_insert(&mut self, name: &str) -> Result<&mut DataCategory, ModelError> {
        let key = fold(name);
        let position = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let category = DataCategory::new(name)?;
                self.categories.push(category);
                self.index.insert(key, self.categories.len() - 1);
                self.categories.len() - 1
            }
        };
        Ok(&mut self.categories[position])
    }

    /// Adds a category, failing if one with the same name already exists.
    pub fn add(&mut self, category: DataCategory) -> Result<(), ModelError> {
        let key = fold(category.name());
        if self.index.contains_key(&key) {
            return Err(ModelError::DuplicateCategory(category.name().to_string()));
        }
        self.index.insert(key, self.categories.len());
        self.categories.push(category);
        Ok(())
    }

    /// Adds a category, replacing any existing one of the same name in
    /// place. Returns the replaced category.
    pub fn insert(&mut self, category: DataCategory) -> Option<DataCategory> {
        let key = fold(category.name());
        match self.index.get(&key) {
            Some(&i) => {
                tracing::debug!(category = category.name(), "replacing category");
                Some(std::mem::replace(&mut self.categories[i], category))
            }
            None => {
                self.index.insert(key, self.categories.len());
                self.categories.push(category);
                None
            }
        }
    }

    /// Removes a category; later categories keep their relative order.
    pub fn remove(&mut self, name: &str) -> Option<DataCategory> {
        let position = self.index.remove(&fold(name))?;
        let removed = self.categories.remove(position);
        self.reindex();
        Some(removed)
    }

    /// Renames a category in place.
    pub fn rename(&mut self, name: &str, new_name: impl Into<String>) -> Result<(), ModelError> {
        let new_name = new_name.into();
        validate_item_part(&new_name, false)?;
        let old_key = fold(name);
        let position = *self
            .index
            .get(&old_key)
            .ok_or_else(|| ModelError::CategoryNotFound(name.to_string()))?;
        let new_key = fold(&new_name);
        if new_key != old_key && self.index.contains_key(&new_key) {
            return Err(ModelError::DuplicateCategory(new_name));
        }
        self.index.remove(&old_key);
        self.index.insert(new_key, position);
        self.categories[position].set_name(new_name);
        Ok(())
    }

    /// Categories in insertion order.
    pub fn categories(&self) -> std::slice::Iter<'_, DataCategory> {
        self.categories.iter()
    }

    pub fn categories_mut(&mut self) -> std::slice::IterMut<'_, DataCategory> {
        self.categories.iter_mut()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(DataCategory::name)
    }

    /// Reads one value by category, attribute, and row.
    pub fn value(&self, category: &str, attribute: &str, row: usize) -> Result<&str, ModelError> {
        self.get(category)?.value(attribute, row)
    }

    fn reindex(&mut self) {
        self.index = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (fold(c.name()), i))
            .collect();
    }
}

impl<'a> IntoIterator for &'a DataContainer {
    type Item = &'a DataCategory;
    type IntoIter = std::slice::Iter<'a, DataCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

impl IntoIterator for DataContainer {
    type Item = DataCategory;
    type IntoIter = std::vec::IntoIter<DataCategory>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.into_iter()
    }
}

#[derive(Serialize, Deserialize)]
struct ContainerRepr {
    name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    global: bool,
    #[serde(default)]
    categories: Vec<DataCategory>,
}

impl TryFrom<ContainerRepr> for DataContainer {
    type Error = ModelError;

    fn try_from(repr: ContainerRepr) -> Result<Self, Self::Error> {
        let mut container = DataContainer::new(repr.name)?;
        container.global = repr.global;
        for category in repr.categories {
            container.add(category)?;
        }
        Ok(container)
    }
}

impl From<DataContainer> for ContainerRepr {
    fn from(container: DataContainer) -> Self {
        Self {
            name: container.name,
            global: container.global,
            categories: container.categories,
        }
    }
}
