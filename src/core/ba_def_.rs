use crate::core::strings::{split_outside_quotes, strip_quotes};
use crate::types::database::DatabaseDBC;
use crate::types::errors::StatementError;

/// Decode a `BA_DEF_` statement.
///
/// `BA_DEF_ [BU_|BO_|SG_] "<name>" <type> <settings...>;`
///
/// Unscoped definitions land in the global attribute table under the
/// `"Definition"` tag as `[type, settings...]`. Scoped definitions are parsed
/// for their fields but not retained, with one exception: a `BO_`-scoped
/// `GenMsgSendType` has its settings list decomposed into the message
/// send-type enumeration used later by `BA_ ... BO_` statements.
pub(crate) fn decode(db: &mut DatabaseDBC, stmt: &str) -> Result<(), StatementError> {
    let s: &str = stmt.trim().trim_end_matches(';');
    let tokens: Vec<String> = split_outside_quotes(s);

    match tokens.get(1).map(String::as_str) {
        Some("BU_") | Some("SG_") => Ok(()),
        Some("BO_") => {
            let name: &str = tokens
                .get(2)
                .map(|t| strip_quotes(t))
                .ok_or(StatementError::MissingField {
                    field: "attribute name",
                })?;
            if name == "GenMsgSendType"
                && let Some(last) = tokens.last()
            {
                for (index, label) in last.split(',').enumerate() {
                    db.msg_send_types
                        .insert(index, strip_quotes(label.trim()).to_string());
                }
            }
            Ok(())
        }
        Some(_) => {
            let name: &str = strip_quotes(&tokens[1]);
            let attr_type: &String = tokens.get(2).ok_or(StatementError::MissingField {
                field: "attribute type",
            })?;
            db.push_attribute(name, "Definition", attr_type.clone());
            for setting in &tokens[3..] {
                db.push_attribute(name, "Definition", setting.clone());
            }
            Ok(())
        }
        None => Err(StatementError::MissingField {
            field: "attribute name",
        }),
    }
}
