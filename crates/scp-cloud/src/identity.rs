//! Composite identifiers for child resources (`<parent>:<child>`)

use crate::error::{CloudError, Result};

pub const ID_SEPARATOR: char = ':';

/// Join a parent and a child identifier
///
/// The parent must not contain the separator, otherwise the result could not
/// be split back.
pub fn merge_id(parent: &str, child: &str) -> Result<String> {
    if parent.contains(ID_SEPARATOR) {
        return Err(CloudError::invalid_input(
            "id",
            format!("parent id '{}' must not contain '{}'", parent, ID_SEPARATOR),
        ));
    }
    Ok(format!("{}{}{}", parent, ID_SEPARATOR, child))
}

/// Split at the first separator into `(parent, child)`
pub fn split_id(id: &str) -> Result<(&str, &str)> {
    id.split_once(ID_SEPARATOR).ok_or_else(|| {
        CloudError::invalid_input(
            "id",
            format!("'{}' is not of the form <parent>{}<child>", id, ID_SEPARATOR),
        )
    })
}
