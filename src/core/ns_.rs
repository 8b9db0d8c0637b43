use crate::types::database::DatabaseDBC;
use crate::types::errors::StatementError;

/// Decode an `NS_ :` block: one indented symbol name per line after the
/// header. Symbols are kept in file order, without duplicates.
pub(crate) fn decode(db: &mut DatabaseDBC, block: &str) -> Result<(), StatementError> {
    for line in block.lines().skip(1) {
        let symbol: &str = line.trim();
        if symbol.is_empty() {
            continue;
        }
        if !db.new_symbols.iter().any(|s| s == symbol) {
            db.new_symbols.push(symbol.to_string());
        }
    }
    Ok(())
}
