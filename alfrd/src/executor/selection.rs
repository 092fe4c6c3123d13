//! Choosing which registered steps a run executes.

use crate::errors::SelectionError;

/// Selects the contiguous slice of `order` from `start` through `end`.
///
/// `end` defaults to `start`, selecting a single step.
///
/// # Errors
///
/// Returns `SelectionError::UnknownStep` if either name is not in `order`,
/// or `SelectionError::EmptyRange` if `end` comes before `start`.
pub fn select_steps(
    order: &[String],
    start: &str,
    end: Option<&str>,
) -> Result<Vec<String>, SelectionError> {
    let end = end.unwrap_or(start);
    let first = position(order, start)?;
    let last = position(order, end)?;
    if last < first {
        return Err(SelectionError::EmptyRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(order[first..=last].to_vec())
}

/// Checks that every name in an explicit step list is registered.
///
/// # Errors
///
/// Returns `SelectionError::UnknownStep` for the first unknown name.
pub fn check_steps(order: &[String], names: &[String]) -> Result<Vec<String>, SelectionError> {
    for name in names {
        position(order, name)?;
    }
    Ok(names.to_vec())
}

fn position(order: &[String], name: &str) -> Result<usize, SelectionError> {
    order
        .iter()
        .position(|s| s == name)
        .ok_or_else(|| SelectionError::UnknownStep {
            name: name.to_string(),
        })
}
