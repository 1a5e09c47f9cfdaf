use super::category::DataCategory;

/// A borrowed view of one row of a [`DataCategory`].
///
/// Values are positional; named access goes through the category's
/// attribute index.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    category: &'a DataCategory,
    values: &'a [String],
}

impl<'a> Row<'a> {
    pub(crate) fn new(category: &'a DataCategory, values: &'a [String]) -> Self {
        Self { category, values }
    }

    /// Looks up a value by attribute name (case-insensitive).
    pub fn get(&self, attribute: &str) -> Option<&'a str> {
        self.category
            .attribute_index(attribute)
            .map(|i| self.values[i].as_str())
    }

    /// The values in attribute order.
    pub fn values(&self) -> &'a [String] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(attribute, value)` pairs in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.category
            .attributes()
            .iter()
            .zip(self.values.iter())
            .map(|(a, v)| (a.as_str(), v.as_str()))
    }
}

impl std::ops::Index<usize> for Row<'_> {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.values[index]
    }
}
