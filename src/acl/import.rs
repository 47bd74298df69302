//! Parsing of external ACL identifiers

use super::model::{AclDeclaration, ID_FIELD_COUNT, ID_SEPARATOR};
use crate::error::{AclError, Result};

/// Split an import id into a declaration.
///
/// Only the segment count is checked. Token legality is left to the next
/// translation, so an id naming an unknown operation still imports.
pub fn parse_import_id(id: &str) -> Result<AclDeclaration> {
    let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
    let fields: [&str; ID_FIELD_COUNT] = parts
        .as_slice()
        .try_into()
        .map_err(|_| AclError::InvalidImportId {
            segments: parts.len(),
        })?;
    Ok(AclDeclaration::from_fields(fields.map(str::to_string)))
}
