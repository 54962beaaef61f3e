//! Category path to search query derivation.

use common::error::AppError;

/// Root nodes of the category tree that carry no search value.
const GENERIC_ROOTS: [&str; 3] = ["ABB Products", "All Categories", "Products"];

/// Turn a `"A > B > C"` category path into a space-separated search query,
/// dropping generic root segments.
///
/// `"ABB Products > HPR > Rectifier > MCR"` becomes `"HPR Rectifier MCR"`.
/// A path ending in an empty segment is malformed and rejected.
pub fn derive_search_query(full_path: &str) -> Result<String, AppError> {
    if full_path.trim().is_empty() {
        return Err(AppError::Validation(
            "Missing full_path parameter".to_string(),
        ));
    }

    let segments = full_path.split(" > ").map(str::trim).collect::<Vec<_>>();
    if segments.last().is_some_and(|segment| segment.is_empty()) {
        return Err(AppError::Validation(
            "Category path ends in an empty segment".to_string(),
        ));
    }

    let query = segments
        .into_iter()
        .filter(|segment| !segment.is_empty() && !GENERIC_ROOTS.contains(segment))
        .collect::<Vec<_>>()
        .join(" ");

    if query.is_empty() {
        return Err(AppError::Validation(
            "Category path contains no searchable segments".to_string(),
        ));
    }

    Ok(query)
}
