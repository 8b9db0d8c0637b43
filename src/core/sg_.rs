use crate::core::message_layout::{check_signal_fits, motorola_start_bit};
use crate::types::database::{DatabaseDBC, EcuKey, MessageKey};
use crate::types::errors::StatementError;
use crate::types::signal::{Endianness, SignalDBC, Signess};

/// Decode one `SG_` line nested under a message block.
///
/// `SG_ <name> [<mux>] : <start>|<len>@<1|0><+|-> (<factor>,<offset>)
/// [<min>|<max>] "<unit>" <rx1>[,<rx2>...]`
///
/// The optional multiplexer marker is recognized positionally and otherwise
/// ignored. Receiver ECUs are created on first sight and get the parent
/// message registered in their rx set. A Motorola start bit is remapped to
/// its LSB-relative equivalent before the signal is stored.
pub(crate) fn decode(
    db: &mut DatabaseDBC,
    msg_key: MessageKey,
    ecu_key: EcuKey,
    line: &str,
) -> Result<(), StatementError> {
    let line: &str = line.trim().trim_end_matches(';');
    let (left, right) = line.split_once(':').ok_or(StatementError::MissingField {
        field: "signal layout",
    })?;

    // Left part: SG_ NAME [M|mX]
    let mut left_it = left.split_ascii_whitespace();
    let _sg: &str = left_it.next().unwrap_or("");
    let name: &str = left_it.next().ok_or(StatementError::MissingField {
        field: "signal name",
    })?;

    let mut it = right.split_ascii_whitespace();

    // 1) bit info: "48|8@1+"
    let bit_info: &str = it.next().ok_or(StatementError::MissingField {
        field: "signal bit layout",
    })?;
    let (pos_len, flags) = bit_info.split_once('@').ok_or(StatementError::MissingField {
        field: "byte order flag",
    })?;
    let (start_s, len_s) = pos_len.split_once('|').ok_or(StatementError::MissingField {
        field: "signal bit length",
    })?;
    let declared_start: u16 = start_s
        .parse::<u16>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "signal start bit",
            token: start_s.to_string(),
        })?;
    let bit_length: u16 = len_s
        .parse::<u16>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "signal bit length",
            token: len_s.to_string(),
        })?;

    let mut flag_chars = flags.chars();
    let endian: Endianness = match flag_chars.next() {
        Some('1') => Endianness::Intel,
        Some('0') => Endianness::Motorola,
        _ => {
            return Err(StatementError::InvalidNumber {
                field: "byte order flag",
                token: flags.to_string(),
            });
        }
    };
    let sign: Signess = match flag_chars.next() {
        Some('+') => Signess::Unsigned,
        Some('-') => Signess::Signed,
        _ => {
            return Err(StatementError::MissingField { field: "sign flag" });
        }
    };

    // 2) "(factor,offset)", possibly split across tokens
    let scaling: String = gather_until(&mut it, '(', ')').ok_or(StatementError::MissingField {
        field: "signal scaling",
    })?;
    let inner: &str = scaling.trim_start_matches('(').trim_end_matches(')');
    let (factor_s, offset_s) = inner.split_once(',').ok_or(StatementError::MissingField {
        field: "signal offset",
    })?;
    let factor: f64 = parse_f64(factor_s, "signal factor")?;
    let offset: f64 = parse_f64(offset_s, "signal offset")?;

    // 3) "[min|max]"
    let bounds: String = gather_until(&mut it, '[', ']').ok_or(StatementError::MissingField {
        field: "signal range",
    })?;
    let inner: &str = bounds.trim_start_matches('[').trim_end_matches(']');
    let (min_s, max_s) = inner.split_once('|').ok_or(StatementError::MissingField {
        field: "signal range",
    })?;
    let min: f64 = parse_f64(min_s, "signal physical minimum")?;
    let mut max: f64 = parse_f64(max_s, "signal physical maximum")?;

    // 4) "unit", possibly containing spaces
    let unit: String = gather_until(&mut it, '"', '"')
        .map(|u| u.trim_matches('"').to_string())
        .unwrap_or_default();

    // 5) receivers (comma and/or space separated)
    let receivers: Vec<String> = it
        .flat_map(|tok| tok.split(','))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    // Degenerate range: both bounds declared 0 mean "full unscaled bit range".
    if min == 0.0 && max == 0.0 {
        max = (bit_length as f64).exp2();
    }

    let norm_min: u64 = ((min - offset) / factor).round() as u64;
    let norm_max: u64 = ((max - offset) / factor).round() as u64;
    let mut resolution: f64 = (max - min) / (norm_max as f64 - norm_min as f64);
    if !resolution.is_finite() {
        resolution = 1.0;
    }

    let (byte_length, id_hex) = {
        let msg = db
            .get_message_by_key(msg_key)
            .ok_or(StatementError::MissingField {
                field: "parent message",
            })?;
        (msg.byte_length, msg.id_hex.clone())
    };
    check_signal_fits(byte_length, declared_start, bit_length, endian)?;

    let bit_start: u16 = match endian {
        Endianness::Intel => declared_start,
        Endianness::Motorola => motorola_start_bit(declared_start, bit_length),
    };

    for rx_name in &receivers {
        let rx_key: EcuKey = db.add_ecu_if_absent(rx_name);
        if let Some(ecu) = db.get_ecu_by_key_mut(rx_key) {
            ecu.rx_messages.insert(id_hex.clone(), msg_key);
        }
    }

    let mut sig: SignalDBC = SignalDBC {
        message: msg_key,
        ecu: ecu_key,
        name: name.to_string(),
        bit_start,
        bit_length,
        endian,
        sign,
        factor,
        offset,
        min,
        max,
        norm_min,
        norm_max,
        resolution,
        unit,
        ..Default::default()
    };
    sig.value = sig.default_value;
    sig.compile_inline();
    db.add_signal(sig)?;
    Ok(())
}

fn parse_f64(token: &str, field: &'static str) -> Result<f64, StatementError> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| StatementError::InvalidNumber {
            field,
            token: token.trim().to_string(),
        })
}

/// Collect tokens from `open` until one ends with `close`; the `"unit"` and
/// `(factor,offset)` groups may be split across whitespace.
fn gather_until<'a, I>(it: &mut I, open: char, close: char) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let first: &str = it.next()?;
    if !first.starts_with(open) {
        return None;
    }
    let mut acc: String = String::from(first);
    while !(acc.ends_with(close) && acc.len() > 1) {
        match it.next() {
            Some(tok) => {
                acc.push(' ');
                acc.push_str(tok);
            }
            None => break,
        }
    }
    Some(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_message() -> (DatabaseDBC, MessageKey, EcuKey) {
        let mut db = DatabaseDBC::default();
        let ecu = db.add_ecu_if_absent("Motor");
        let msg = db.add_message("Motor_01", 100, 8, ecu).unwrap();
        (db, msg, ecu)
    }

    #[test]
    fn test_signal_fields() {
        let (mut db, msg, ecu) = db_with_message();
        decode(
            &mut db,
            msg,
            ecu,
            r#"SG_ Engine_Speed : 48|8@1+ (0.5,-10) [0|117.5] "km/h" Infotainment,Gateway"#,
        )
        .unwrap();

        let sig = db.get_signal_in_message("0x064", "Engine_Speed").unwrap();
        assert_eq!(sig.bit_start, 48);
        assert_eq!(sig.bit_length, 8);
        assert_eq!(sig.endian, Endianness::Intel);
        assert_eq!(sig.sign, Signess::Unsigned);
        assert_eq!(sig.factor, 0.5);
        assert_eq!(sig.offset, -10.0);
        assert_eq!(sig.min, 0.0);
        assert_eq!(sig.max, 117.5);
        assert_eq!(sig.norm_min, 20);
        assert_eq!(sig.norm_max, 255);
        assert_eq!(sig.unit, "km/h");

        // both receivers exist and hold the message in their rx set
        for name in ["Infotainment", "Gateway"] {
            let rx = db.get_ecu_by_name(name).unwrap();
            assert!(rx.rx_messages.contains_key("0x064"));
        }
    }

    #[test]
    fn test_degenerate_range_sentinel() {
        let (mut db, msg, ecu) = db_with_message();
        decode(
            &mut db,
            msg,
            ecu,
            r#"SG_ Counter : 0|8@1+ (1,0) [0|0] "" Gateway"#,
        )
        .unwrap();

        let sig = db.get_signal_in_message("0x064", "Counter").unwrap();
        assert_eq!(sig.max, 256.0);
        assert_eq!(sig.norm_max, 256);
        assert_eq!(sig.resolution, 1.0);
    }

    #[test]
    fn test_motorola_start_bit_is_remapped() {
        let (mut db, msg, ecu) = db_with_message();
        decode(
            &mut db,
            msg,
            ecu,
            r#"SG_ Torque : 7|8@0+ (1,0) [0|255] "Nm" Gateway"#,
        )
        .unwrap();

        let sig = db.get_signal_in_message("0x064", "Torque").unwrap();
        assert_eq!(sig.bit_start, 0);
        assert_eq!(sig.endian, Endianness::Motorola);
    }

    #[test]
    fn test_multiplexed_signal_parses() {
        let (mut db, msg, ecu) = db_with_message();
        decode(
            &mut db,
            msg,
            ecu,
            r#"SG_ Mode m2 : 8|4@1+ (1,0) [0|15] "" Gateway"#,
        )
        .unwrap();
        assert!(db.get_signal_in_message("0x064", "Mode").is_some());
    }

    #[test]
    fn test_out_of_bounds_signal_is_rejected() {
        let (mut db, msg, ecu) = db_with_message();
        let err = decode(
            &mut db,
            msg,
            ecu,
            r#"SG_ Wide : 60|8@1+ (1,0) [0|255] "" Gateway"#,
        )
        .unwrap_err();
        assert!(matches!(err, StatementError::Layout(_)));
    }

    #[test]
    fn test_duplicate_signal_name_is_rejected() {
        let (mut db, msg, ecu) = db_with_message();
        let line = r#"SG_ Status : 0|1@1+ (1,0) [0|1] "" Gateway"#;
        decode(&mut db, msg, ecu, line).unwrap();
        let err = decode(&mut db, msg, ecu, line).unwrap_err();
        assert!(matches!(err, StatementError::DuplicateSignal { .. }));
    }
}
