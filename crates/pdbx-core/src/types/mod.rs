pub mod category;
pub mod container;
pub mod row;
pub mod value;

pub use category::DataCategory;
pub use container::{DataContainer, GLOBAL_BLOCK_NAME};
pub use row::Row;
pub use value::{is_inapplicable, is_null, is_unknown, INAPPLICABLE, UNKNOWN};

use crate::error::ModelError;

/// Case-folded lookup key for category and attribute names.
pub(crate) fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Characters that end a token in CIF text: space, tab, CR, LF and form feed.
pub(crate) fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0c')
}

/// Category and attribute names become part of an `_category.attribute`
/// tag, so they must be non-empty and free of token separators. Category
/// names additionally cannot contain `.`, which separates the two halves.
pub(crate) fn validate_item_part(name: &str, allow_dot: bool) -> Result<(), ModelError> {
    let ok = !name.is_empty()
        && !name.contains(is_separator)
        && (allow_dot || !name.contains('.'));
    if ok {
        Ok(())
    } else {
        Err(ModelError::InvalidName(name.to_string()))
    }
}

/// Block names follow `data_` directly; an empty name is allowed.
pub(crate) fn validate_block_name(name: &str) -> Result<(), ModelError> {
    if name.contains(is_separator) {
        Err(ModelError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_is_case_insensitive() {
        assert_eq!(fold("Atom_Site"), fold("atom_site"));
    }

    #[test]
    fn item_parts() {
        assert!(validate_item_part("atom_site", false).is_ok());
        assert!(validate_item_part("pdbx_PDB_model_num", true).is_ok());
        assert!(validate_item_part("a.b", true).is_ok());
        for bad in ["", "atom site", "a\tb"] {
            assert!(validate_item_part(bad, true).is_err(), "expected invalid: {bad:?}");
        }
        assert!(validate_item_part("a.b", false).is_err());
    }

    #[test]
    fn only_cif_separators_are_rejected() {
        assert!(validate_item_part("a\u{a0}b", true).is_ok());
        assert!(validate_item_part("a\x0cb", true).is_err());
        assert!(validate_item_part("a\rb", false).is_err());
        assert!(validate_block_name("x\u{2003}y").is_ok());
        assert!(validate_block_name("x\ny").is_err());
    }

    #[test]
    fn block_names() {
        assert!(validate_block_name("").is_ok());
        assert!(validate_block_name("1ABC").is_ok());
        assert!(validate_block_name("two words").is_err());
    }
}
