use crate::core::strings::split_outside_quotes;
use crate::types::database::{DatabaseDBC, canonical_id_hex};
use crate::types::errors::StatementError;

/// Decode a `CM_` statement.
///
/// Only the signal-scoped form `CM_ SG_ <msgId> <signal> "<text>"` is
/// honored; it overwrites the signal's function text. Comments for other
/// scopes, or for messages/signals that do not exist, are silently ignored;
/// a comment never creates an entity.
pub(crate) fn decode(db: &mut DatabaseDBC, stmt: &str) -> Result<(), StatementError> {
    let s: &str = stmt.trim().trim_end_matches(';');
    let tokens: Vec<String> = split_outside_quotes(s);

    if tokens.get(1).map(String::as_str) != Some("SG_") {
        return Ok(());
    }

    let id_tok: &str = tokens.get(2).ok_or(StatementError::MissingField {
        field: "message id",
    })?;
    let id: u32 = id_tok
        .parse::<u32>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "message id",
            token: id_tok.to_string(),
        })?;
    let sig_name: &str = tokens.get(3).ok_or(StatementError::MissingField {
        field: "signal name",
    })?;

    let text: String = tokens[4..].join(" ");
    let text: String = text.trim().trim_matches('"').to_string();

    let id_hex: String = canonical_id_hex(id);
    if let Some(msg_key) = db.get_msg_key_by_id_hex(&id_hex)
        && let Some(sig_key) = db.get_signal_key(msg_key, sig_name)
        && let Some(sig) = db.get_signal_by_key_mut(sig_key)
    {
        sig.function = text;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{bo_, sg_};

    fn db_with_signal() -> DatabaseDBC {
        let mut db = DatabaseDBC::default();
        bo_::decode(&mut db, "BO_ 100 Motor_01: 8 Motor").unwrap();
        let msg = db.get_msg_key_by_id_hex("0x064").unwrap();
        let ecu = db.get_ecu_key_by_name("Motor").unwrap();
        sg_::decode(
            &mut db,
            msg,
            ecu,
            r#"SG_ Status : 0|1@1+ (1,0) [0|1] "" Gateway"#,
        )
        .unwrap();
        db
    }

    #[test]
    fn test_signal_comment_is_applied() {
        let mut db = db_with_signal();
        decode(&mut db, r#"CM_ SG_ 100 Status "engine status flag";"#).unwrap();
        let sig = db.get_signal_in_message("0x064", "Status").unwrap();
        assert_eq!(sig.function, "engine status flag");
    }

    #[test]
    fn test_unknown_targets_are_ignored() {
        let mut db = db_with_signal();
        decode(&mut db, r#"CM_ SG_ 999 Status "nobody home";"#).unwrap();
        decode(&mut db, r#"CM_ SG_ 100 Missing "nobody home";"#).unwrap();
        decode(&mut db, r#"CM_ BU_ Motor "node comment";"#).unwrap();
        let sig = db.get_signal_in_message("0x064", "Status").unwrap();
        assert_eq!(sig.function, "");
    }
}
