//! Row structs.
//!
//! Each submodule holds the `FromRow` shape of a table and its conversion
//! into the domain type from `emlak_core`. Text-backed enum columns are
//! parsed during conversion; a value outside the check constraint is a
//! [`StorageError`](emlak_core::error::StorageError).

pub mod listing;
pub mod profile;
pub mod submission;

use std::str::FromStr;

use emlak_core::error::{CoreError, StorageError};

/// Parse a text column into its domain enum.
pub(crate) fn parse_column<T>(column: &str, raw: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = CoreError>,
{
    raw.parse()
        .map_err(|e| StorageError::new(format!("invalid value in column {column}: {e}")))
}

/// Optional variant of [`parse_column`].
pub(crate) fn parse_optional_column<T>(
    column: &str,
    raw: Option<&str>,
) -> Result<Option<T>, StorageError>
where
    T: FromStr<Err = CoreError>,
{
    raw.map(|value| parse_column(column, value)).transpose()
}
