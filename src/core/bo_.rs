use crate::core::sg_;
use crate::extract;
use crate::types::database::{DatabaseDBC, EcuKey, MessageKey};
use crate::types::errors::StatementError;

/// Decode one message block: the `BO_` header line plus its nested `SG_`
/// lines.
///
/// `BO_ <decimalId> <name>: <byteLength> <txEcuName>`
///
/// The transmitting ECU is created if this is the first time its name shows
/// up; the message is registered under its canonical hexadecimal id and in
/// the ECU's tx set before any signal is attached.
pub(crate) fn decode(db: &mut DatabaseDBC, block: &str) -> Result<(), StatementError> {
    let header: &str = extract::message_header(block).ok_or(StatementError::MissingField {
        field: "message header",
    })?;

    // Strip leading "BO_"
    let after: &str = header.trim().trim_start_matches("BO_").trim();

    // 1) ID (first token, decimal)
    let mut split_once = after.splitn(2, char::is_whitespace);
    let id_str: &str = split_once.next().unwrap_or("");
    let rest: &str = split_once.next().unwrap_or("").trim();
    let id: u32 = id_str
        .parse::<u32>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "message id",
            token: id_str.to_string(),
        })?;

    // 2) NAME (everything up to the ':')
    let colon_pos: usize = rest.find(':').ok_or(StatementError::MissingField {
        field: "message name",
    })?;
    let name: &str = rest[..colon_pos].trim();

    // 3) After ':' → <byte length> <tx ecu>
    let mut it = rest[colon_pos + 1..].trim().split_ascii_whitespace();
    let len_str: &str = it.next().ok_or(StatementError::MissingField {
        field: "message byte length",
    })?;
    let byte_length: u16 = len_str
        .parse::<u16>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "message byte length",
            token: len_str.to_string(),
        })?;
    let ecu_name: &str = it.next().ok_or(StatementError::MissingField {
        field: "transmitting ecu",
    })?;

    let ecu_key: EcuKey = db.add_ecu_if_absent(ecu_name);
    let msg_key: MessageKey = db.add_message(name, id, byte_length, ecu_key)?;

    for line in extract::signal_lines(block) {
        sg_::decode(db, msg_key, ecu_key, line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_creates_ecu_and_message() {
        let mut db = DatabaseDBC::default();
        decode(&mut db, "BO_ 416 Brake_01: 8 BrakeCtl").unwrap();

        let msg = db.get_message_by_id_hex("0x1A0").unwrap();
        assert_eq!(msg.name, "Brake_01");
        assert_eq!(msg.byte_length, 8);
        assert_eq!(msg.payload, vec![0u8; 8]);

        let ecu = db.get_ecu_by_name("BrakeCtl").unwrap();
        assert!(ecu.tx_messages.contains_key("0x1A0"));
    }

    #[test]
    fn test_malformed_id_aborts() {
        let mut db = DatabaseDBC::default();
        let err = decode(&mut db, "BO_ 99999999999 Brake_01: 8 BrakeCtl").unwrap_err();
        assert!(matches!(
            err,
            StatementError::InvalidNumber {
                field: "message id",
                ..
            }
        ));
    }
}
