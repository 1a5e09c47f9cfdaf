use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

use super::row::Row;
use super::value::UNKNOWN;
use super::{fold, validate_item_part};

/// One named table of a data block, e.g. `_atom_site`.
///
/// Rows are stored positionally and share a single case-insensitive
/// attribute index. Every row holds exactly one value per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CategoryRepr", into = "CategoryRepr")]
pub struct DataCategory {
    name: String,
    attributes: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl DataCategory {
    /// Creates an empty category with no attributes and no rows.
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        validate_item_part(&name, false)?;
        Ok(Self {
            name,
            attributes: Vec::new(),
            index: HashMap::new(),
            rows: Vec::new(),
        })
    }

    /// Creates a category with the given attributes and no rows.
    pub fn with_attributes<I, S>(name: impl Into<String>, attributes: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut category = Self::new(name)?;
        for attribute in attributes {
            category.add_attribute(attribute)?;
        }
        Ok(category)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Attribute names in declaration order, with their original casing.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the category has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.index.contains_key(&fold(attribute))
    }

    /// Column index of an attribute (case-insensitive).
    pub fn attribute_index(&self, attribute: &str) -> Option<usize> {
        self.index.get(&fold(attribute)).copied()
    }

    /// Declares a new attribute and returns its column index.
    ///
    /// Existing rows are padded with the unknown marker `?`.
    pub fn add_attribute(&mut self, attribute: impl Into<String>) -> Result<usize, ModelError> {
        let attribute = attribute.into();
        validate_item_part(&attribute, true)?;
        let key = fold(&attribute);
        if self.index.contains_key(&key) {
            return Err(ModelError::DuplicateAttribute {
                category: self.name.clone(),
                attribute,
            });
        }
        let position = self.attributes.len();
        self.attributes.push(attribute);
        self.index.insert(key, position);
        for row in &mut self.rows {
            row.push(UNKNOWN.to_string());
        }
        Ok(position)
    }

    /// Renames an attribute in place, keeping its column position.
    pub fn rename_attribute(
        &mut self,
        attribute: &str,
        new_name: impl Into<String>,
    ) -> Result<(), ModelError> {
        let new_name = new_name.into();
        validate_item_part(&new_name, true)?;
        let position = self.require_attribute(attribute)?;
        let new_key = fold(&new_name);
        if let Some(&existing) = self.index.get(&new_key) {
            if existing != position {
                return Err(ModelError::DuplicateAttribute {
                    category: self.name.clone(),
                    attribute: new_name,
                });
            }
        }
        self.index.remove(&fold(attribute));
        self.index.insert(new_key, position);
        self.attributes[position] = new_name;
        Ok(())
    }

    /// Appends one row. The number of values must equal the attribute count.
    pub fn append_row<I, S>(&mut self, values: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = values.into_iter().map(Into::into).collect();
        if row.len() != self.attributes.len() {
            return Err(ModelError::ArityMismatch {
                category: self.name.clone(),
                expected: self.attributes.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Sets a value in a key-value (single-row) category.
    ///
    /// Declares the attribute if it is new and creates the row if the
    /// category is still empty; other attributes of a new row start as `?`.
    pub fn set_value(
        &mut self,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        if self.rows.len() > 1 {
            return Err(ModelError::MultipleRows {
                category: self.name.clone(),
                rows: self.rows.len(),
            });
        }
        let attribute = attribute.into();
        let position = match self.attribute_index(&attribute) {
            Some(position) => position,
            None => self.add_attribute(attribute)?,
        };
        if self.rows.is_empty() {
            self.rows
                .push(vec![UNKNOWN.to_string(); self.attributes.len()]);
        }
        self.rows[0][position] = value.into();
        Ok(())
    }

    /// Overwrites the value of an existing attribute in an existing row.
    pub fn set_value_at(
        &mut self,
        attribute: &str,
        row: usize,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        let position = self.require_attribute(attribute)?;
        self.require_row(row)?;
        self.rows[row][position] = value.into();
        Ok(())
    }

    /// Reads one value.
    ///
    /// A missing attribute or row is a lookup error; a stored `?` or `.` is
    /// returned as-is.
    pub fn value(&self, attribute: &str, row: usize) -> Result<&str, ModelError> {
        let position = self.require_attribute(attribute)?;
        self.require_row(row)?;
        Ok(&self.rows[row][position])
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row::new(self, values))
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |values| Row::new(self, values))
    }

    /// All values of one attribute, top to bottom.
    pub fn column(&self, attribute: &str) -> Result<impl Iterator<Item = &str> + '_, ModelError> {
        let position = self.require_attribute(attribute)?;
        Ok(self.rows.iter().map(move |row| row[position].as_str()))
    }

    /// Removes a row and returns its values.
    pub fn remove_row(&mut self, index: usize) -> Result<Vec<String>, ModelError> {
        self.require_row(index)?;
        Ok(self.rows.remove(index))
    }

    /// True when both categories declare the same attributes in the same
    /// order, compared case-insensitively.
    pub fn same_attributes(&self, other: &DataCategory) -> bool {
        self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .zip(other.attributes.iter())
                .all(|(a, b)| fold(a) == fold(b))
    }

    /// Moves all rows of `other` onto the end of this category, matching
    /// columns by attribute name.
    ///
    /// Attributes only `other` declares are added, padding earlier rows
    /// with `?`. Columns `other` lacks are `?` in the moved rows.
    pub fn extend_rows(&mut self, other: DataCategory) -> Result<(), ModelError> {
        let mut targets = Vec::with_capacity(other.attributes.len());
        for attribute in other.attributes {
            let position = match self.attribute_index(&attribute) {
                Some(position) => position,
                None => self.add_attribute(attribute)?,
            };
            targets.push(position);
        }
        let width = self.attributes.len();
        for values in other.rows {
            let mut row = vec![UNKNOWN.to_string(); width];
            for (&position, value) in targets.iter().zip(values) {
                row[position] = value;
            }
            self.rows.push(row);
        }
        Ok(())
    }

    /// Replaces every value of `attribute` equal to `old` with `new` and
    /// returns how many were replaced. An unknown attribute replaces nothing.
    pub fn replace_value(&mut self, old: &str, new: &str, attribute: &str) -> usize {
        let Some(position) = self.attribute_index(attribute) else {
            return 0;
        };
        let mut count = 0;
        for row in &mut self.rows {
            if row[position] == old {
                row[position] = new.to_string();
                count += 1;
            }
        }
        count
    }

    /// Replaces every occurrence of the substring `old` inside the values of
    /// `attribute`. Returns true if any value changed.
    pub fn replace_substring(&mut self, old: &str, new: &str, attribute: &str) -> bool {
        let Some(position) = self.attribute_index(attribute) else {
            return false;
        };
        if old.is_empty() {
            return false;
        }
        let mut changed = false;
        for row in &mut self.rows {
            if row[position].contains(old) {
                row[position] = row[position].replace(old, new);
                changed |= old != new;
            }
        }
        changed
    }

    fn require_attribute(&self, attribute: &str) -> Result<usize, ModelError> {
        self.attribute_index(attribute)
            .ok_or_else(|| ModelError::AttributeNotFound {
                category: self.name.clone(),
                attribute: attribute.to_string(),
            })
    }

    fn require_row(&self, row: usize) -> Result<(), ModelError> {
        if row < self.rows.len() {
            Ok(())
        } else {
            Err(ModelError::RowOutOfRange {
                category: self.name.clone(),
                row,
                rows: self.rows.len(),
            })
        }
    }
}

/// Wire form used by serde: the attribute index is rebuilt on the way in.
#[derive(Serialize, Deserialize)]
struct CategoryRepr {
    name: String,
    attributes: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl TryFrom<CategoryRepr> for DataCategory {
    type Error = ModelError;

    fn try_from(repr: CategoryRepr) -> Result<Self, Self::Error> {
        let mut category = DataCategory::with_attributes(repr.name, repr.attributes)?;
        for row in repr.rows {
            category.append_row(row)?;
        }
        Ok(category)
    }
}

impl From<DataCategory> for CategoryRepr {
    fn from(category: DataCategory) -> Self {
        Self {
            name: category.name,
            attributes: category.attributes,
            rows: category.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelErrorKind;

    fn atom_site() -> DataCategory {
        let mut cat =
            DataCategory::with_attributes("atom_site", ["group_PDB", "id", "type_symbol"]).unwrap();
        cat.append_row(["ATOM", "1", "N"]).unwrap();
        cat.append_row(["ATOM", "2", "C"]).unwrap();
        cat
    }

    #[test]
    fn append_row_checks_arity() {
        let mut cat = atom_site();
        let err = cat.append_row(["ATOM", "3"]).unwrap_err();
        assert_eq!(err.kind(), ModelErrorKind::Precondition);
        assert!(matches!(
            err,
            ModelError::ArityMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
        assert_eq!(cat.row_count(), 2);
    }

    #[test]
    fn value_lookup() {
        let cat = atom_site();
        assert_eq!(cat.value("type_symbol", 1).unwrap(), "C");
        assert_eq!(cat.value("GROUP_pdb", 0).unwrap(), "ATOM");
    }

    #[test]
    fn lookup_errors_are_distinct_from_null_markers() {
        let mut cat = DataCategory::new("cell").unwrap();
        cat.set_value("length_a", "?").unwrap();
        assert_eq!(cat.value("length_a", 0).unwrap(), "?");

        let err = cat.value("length_b", 0).unwrap_err();
        assert!(err.is_lookup());
        assert!(matches!(err, ModelError::AttributeNotFound { .. }));

        let err = cat.value("length_a", 1).unwrap_err();
        assert!(matches!(err, ModelError::RowOutOfRange { row: 1, rows: 1, .. }));
    }

    #[test]
    fn attribute_names_are_unique_case_insensitively() {
        let mut cat = DataCategory::new("entry").unwrap();
        cat.add_attribute("id").unwrap();
        let err = cat.add_attribute("ID").unwrap_err();
        assert!(matches!(err, ModelError::DuplicateAttribute { .. }));
        assert_eq!(cat.attributes(), &["id".to_string()]);
    }

    #[test]
    fn add_attribute_pads_existing_rows() {
        let mut cat = atom_site();
        let position = cat.add_attribute("occupancy").unwrap();
        assert_eq!(position, 3);
        assert_eq!(cat.value("occupancy", 0).unwrap(), "?");
        assert_eq!(cat.value("occupancy", 1).unwrap(), "?");
        cat.append_row(["HETATM", "3", "O", "1.0"]).unwrap();
    }

    #[test]
    fn set_value_builds_a_single_row() {
        let mut cat = DataCategory::new("cell").unwrap();
        cat.set_value("entry_id", "1ABC").unwrap();
        cat.set_value("length_a", "50.0").unwrap();
        cat.set_value("entry_id", "2XYZ").unwrap();
        assert_eq!(cat.row_count(), 1);
        assert_eq!(cat.attributes(), &["entry_id".to_string(), "length_a".to_string()]);
        assert_eq!(cat.value("entry_id", 0).unwrap(), "2XYZ");
    }

    #[test]
    fn set_value_rejects_loops() {
        let mut cat = atom_site();
        let err = cat.set_value("id", "9").unwrap_err();
        assert!(matches!(err, ModelError::MultipleRows { rows: 2, .. }));
    }

    #[test]
    fn set_value_at_overwrites() {
        let mut cat = atom_site();
        cat.set_value_at("id", 1, "20").unwrap();
        assert_eq!(cat.value("id", 1).unwrap(), "20");
        assert!(cat.set_value_at("id", 5, "x").unwrap_err().is_lookup());
    }

    #[test]
    fn rows_iterate_in_insertion_order() {
        let cat = atom_site();
        let ids: Vec<_> = cat.rows().map(|r| r.get("id").unwrap()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        let symbols: Vec<_> = cat.column("type_symbol").unwrap().collect();
        assert_eq!(symbols, vec!["N", "C"]);
    }

    #[test]
    fn remove_row() {
        let mut cat = atom_site();
        let removed = cat.remove_row(0).unwrap();
        assert_eq!(removed, vec!["ATOM", "1", "N"]);
        assert_eq!(cat.row_count(), 1);
        assert!(cat.remove_row(3).is_err());
    }

    #[test]
    fn rename_attribute_keeps_position() {
        let mut cat = atom_site();
        cat.rename_attribute("id", "Id").unwrap();
        assert_eq!(cat.attributes()[1], "Id");
        assert_eq!(cat.value("id", 0).unwrap(), "1");
        assert!(cat.rename_attribute("id", "type_symbol").is_err());
        assert!(cat.rename_attribute("nope", "x").unwrap_err().is_lookup());
    }

    #[test]
    fn extend_rows_with_same_layout() {
        let mut a = atom_site();
        let mut b = DataCategory::with_attributes("atom_site", ["GROUP_PDB", "ID", "TYPE_SYMBOL"])
            .unwrap();
        b.append_row(["ATOM", "3", "O"]).unwrap();
        assert!(a.same_attributes(&b));
        a.extend_rows(b).unwrap();
        assert_eq!(a.row_count(), 3);
        assert_eq!(a.attribute_count(), 3);
        assert_eq!(a.value("type_symbol", 2).unwrap(), "O");
    }

    #[test]
    fn extend_rows_matches_columns_by_name() {
        let mut a = atom_site();
        let mut b =
            DataCategory::with_attributes("atom_site", ["type_symbol", "occupancy", "id"]).unwrap();
        b.append_row(["S", "0.5", "3"]).unwrap();
        assert!(!a.same_attributes(&b));
        a.extend_rows(b).unwrap();

        assert_eq!(a.attributes(), &["group_PDB", "id", "type_symbol", "occupancy"]);
        assert_eq!(a.row(2).unwrap().values(), &["?", "3", "S", "0.5"]);
        assert_eq!(a.value("occupancy", 0).unwrap(), "?");
        assert_eq!(a.value("group_PDB", 1).unwrap(), "ATOM");
    }

    #[test]
    fn replace_value_counts_matches() {
        let mut cat = atom_site();
        cat.append_row(["HETATM", "3", "O"]).unwrap();
        assert_eq!(cat.replace_value("ATOM", "HETATM", "GROUP_PDB"), 2);
        let groups: Vec<_> = cat.column("group_PDB").unwrap().collect();
        assert_eq!(groups, vec!["HETATM", "HETATM", "HETATM"]);
        assert_eq!(cat.replace_value("ATOM", "X", "group_PDB"), 0);
        assert_eq!(cat.replace_value("N", "X", "occupancy"), 0);
    }

    #[test]
    fn replace_substring_edits_in_place() {
        let mut cat = DataCategory::with_attributes("struct", ["title"]).unwrap();
        cat.append_row(["Crystal structure of lysozyme"]).unwrap();
        cat.append_row(["NMR structure"]).unwrap();
        assert!(cat.replace_substring("structure", "model", "title"));
        assert_eq!(cat.value("title", 0).unwrap(), "Crystal model of lysozyme");
        assert_eq!(cat.value("title", 1).unwrap(), "NMR model");
        assert!(!cat.replace_substring("absent", "x", "title"));
        assert!(!cat.replace_substring("NMR", "x", "pdbx_descriptor"));
    }

    #[test]
    fn invalid_names_rejected() {
        assert!(DataCategory::new("").is_err());
        assert!(DataCategory::new("atom site").is_err());
        assert!(DataCategory::new("atom.site").is_err());
        let mut cat = DataCategory::new("atom_site").unwrap();
        assert!(cat.add_attribute("").is_err());
    }
}
