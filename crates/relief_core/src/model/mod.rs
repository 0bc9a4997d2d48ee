//! Domain model for incidents and the relief updates logged against them.
//!
//! # Responsibility
//! - Define canonical records shared by the registry, ledger and workflows.
//! - Provide lenient label parsing for enum values received from stores.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never minted client-side.
//! - `Incident::relief_updates` is kept newest-first.

pub mod incident;
pub mod relief;

/// Folds a free-form enum label into a comparison key.
///
/// Lowercases and drops spaces, `_` and `-`, so `"In Progress"`,
/// `"in_progress"` and `"InProgress"` all compare equal.
pub(crate) fn label_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::label_key;

    #[test]
    fn label_key_ignores_case_and_separators() {
        assert_eq!(label_key("In Progress"), "inprogress");
        assert_eq!(label_key("in_progress"), "inprogress");
        assert_eq!(label_key("IN-PROGRESS"), "inprogress");
    }
}
