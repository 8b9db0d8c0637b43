use crate::types::database::DatabaseDBC;
use crate::types::errors::StatementError;

/// Decode a `BU_ : name1 name2 ...` line. Accepts both `BU_:` and `BU_ :`.
/// Every listed name becomes an ECU; names already created by an earlier
/// reference are left untouched.
pub(crate) fn decode(db: &mut DatabaseDBC, line: &str) -> Result<(), StatementError> {
    let Some((_, names)) = line.split_once(':') else {
        return Ok(());
    };
    for name in names.split_ascii_whitespace() {
        db.add_ecu_if_absent(name);
    }
    Ok(())
}
