use crate::core::strings::{split_outside_quotes, strip_quotes};
use crate::types::database::DatabaseDBC;
use crate::types::errors::StatementError;

/// Decode a `BA_DEF_DEF_ "<name>" <value>;` statement: the value is appended
/// under the `"Default"` tag of the attribute's global entry. Statements with
/// too few tokens are skipped.
pub(crate) fn decode(db: &mut DatabaseDBC, stmt: &str) -> Result<(), StatementError> {
    let s: &str = stmt.trim().trim_end_matches(';');
    let tokens: Vec<String> = split_outside_quotes(s);
    if tokens.len() < 3 {
        return Ok(());
    }

    let name: &str = strip_quotes(&tokens[1]);
    let value: &str = strip_quotes(&tokens[2]);
    db.push_attribute(name, "Default", value.to_string());
    Ok(())
}
