use crate::core::strings::{split_outside_quotes, strip_quotes};
use crate::types::database::{DatabaseDBC, canonical_id_hex};
use crate::types::errors::StatementError;

/// Decode a `VAL_` statement defining enumerated labels for one signal:
/// `VAL_ <msgId> <signal> <intval> "<label>" <intval> "<label>" ...;`
///
/// Pairs are merged into the signal's value table; a later pair with the
/// same raw value overwrites the earlier one. Statements referencing an
/// unknown message or signal are silently ignored.
pub(crate) fn decode(db: &mut DatabaseDBC, stmt: &str) -> Result<(), StatementError> {
    let s: &str = stmt.trim().trim_end_matches(';');
    let tokens: Vec<String> = split_outside_quotes(s);

    let id_tok: &str = tokens.get(1).ok_or(StatementError::MissingField {
        field: "message id",
    })?;
    let id: u32 = id_tok
        .parse::<u32>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "message id",
            token: id_tok.to_string(),
        })?;
    let sig_name: &str = tokens.get(2).ok_or(StatementError::MissingField {
        field: "signal name",
    })?;

    // Collect (value, label) pairs; stop at the first token that is not a
    // number, which also covers a stray trailing ';'.
    let mut pairs: Vec<(i64, String)> = Vec::new();
    let mut it = tokens[3..].iter();
    while let Some(val_tok) = it.next() {
        let Ok(raw) = val_tok.parse::<i64>() else {
            break;
        };
        let Some(label) = it.next() else {
            break;
        };
        pairs.push((raw, strip_quotes(label).to_string()));
    }

    if let Some(msg_key) = db.get_msg_key_by_id_hex(&canonical_id_hex(id))
        && let Some(sig_key) = db.get_signal_key(msg_key, sig_name)
        && let Some(sig) = db.get_signal_by_key_mut(sig_key)
    {
        for (raw, label) in pairs {
            sig.value_table.insert(raw, label);
        }
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
            r#"SG_ Status : 0|2@1+ (1,0) [0|3] "" Gateway"#,
        )
        .unwrap();
        db
    }

    #[test]
    fn test_value_table_merge() {
        let mut db = db_with_signal();
        decode(&mut db, r#"VAL_ 100 Status 1 "On" 0 "Off" ;"#).unwrap();
        decode(&mut db, r#"VAL_ 100 Status 2 "Error state" 1 "Running" ;"#).unwrap();

        let sig = db.get_signal_in_message("0x064", "Status").unwrap();
        assert_eq!(sig.value_table[&0], "Off");
        assert_eq!(sig.value_table[&1], "Running"); // overwritten
        assert_eq!(sig.value_table[&2], "Error state");
    }

    #[test]
    fn test_unknown_signal_is_ignored() {
        let mut db = db_with_signal();
        decode(&mut db, r#"VAL_ 100 Missing 1 "On" ;"#).unwrap();
        decode(&mut db, r#"VAL_ 999 Status 1 "On" ;"#).unwrap();
        let sig = db.get_signal_in_message("0x064", "Status").unwrap();
        assert!(sig.value_table.is_empty());
    }
}
