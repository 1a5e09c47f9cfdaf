//! # pdbx-core
//!
//! In-memory model for PDBx/mmCIF data.
//!
//! A file holds an ordered list of [`DataContainer`]s (`data_` blocks). Each
//! container holds ordered [`DataCategory`] tables, and each category holds
//! attribute names plus rows of string values. Values are never interpreted:
//! the markers `?` and `.` are stored verbatim and only classified on request
//! through [`is_unknown`] and [`is_inapplicable`].
//!
//! # Example
//!
//! ```
//! use pdbx_core::{DataCategory, DataContainer};
//!
//! let mut container = DataContainer::new("1ABC").unwrap();
//! let mut atoms = DataCategory::with_attributes("atom_site", ["id", "type_symbol"]).unwrap();
//! atoms.append_row(["1", "N"]).unwrap();
//! atoms.append_row(["2", "C"]).unwrap();
//! container.add(atoms).unwrap();
//!
//! assert_eq!(container.value("atom_site", "type_symbol", 1).unwrap(), "C");
//! assert!(container.value("atom_site", "occupancy", 0).unwrap_err().is_lookup());
//! ```

pub mod error;
pub mod types;

pub use error::{ModelError, ModelErrorKind};
pub use types::{
    is_inapplicable, is_null, is_unknown, DataCategory, DataContainer, Row, GLOBAL_BLOCK_NAME,
    INAPPLICABLE, UNKNOWN,
};
