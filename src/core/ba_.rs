use crate::core::strings::{split_outside_quotes, strip_quotes};
use crate::types::database::{DatabaseDBC, canonical_id_hex};
use crate::types::errors::StatementError;

/// Decode a `BA_` (attribute setting) statement.
///
/// `BA_ "<name>" [BO_ <msgId>|SG_ <msgId> <signal>] <value>;`
///
/// Message-scoped settings map three well-known attribute names onto typed
/// message fields; any other message-scoped name is dropped. Signal-scoped
/// settings land in the signal's attribute map. Everything else goes to the
/// global attribute table under the `"Setting"` tag. Settings that reference
/// a message or signal the file never defined are silently ignored.
pub(crate) fn decode(db: &mut DatabaseDBC, stmt: &str) -> Result<(), StatementError> {
    let s: &str = stmt.trim().trim_end_matches(';');
    let tokens: Vec<String> = split_outside_quotes(s);

    let name: String = tokens
        .get(1)
        .map(|t| strip_quotes(t).to_string())
        .ok_or(StatementError::MissingField {
            field: "attribute name",
        })?;

    match tokens.get(2).map(String::as_str) {
        Some("BO_") => {
            let id: u32 = parse_message_id(&tokens, 3)?;
            let Some(msg_key) = db.get_msg_key_by_id_hex(&canonical_id_hex(id)) else {
                return Ok(());
            };
            let value: &str = tokens
                .get(4)
                .map(|t| strip_quotes(t))
                .ok_or(StatementError::MissingField {
                    field: "attribute value",
                })?;

            match name.as_str() {
                "GenMsgCycleTime" => {
                    let cycle: u32 =
                        value
                            .parse::<u32>()
                            .map_err(|_| StatementError::InvalidNumber {
                                field: "cycle time",
                                token: value.to_string(),
                            })?;
                    if let Some(msg) = db.get_message_by_key_mut(msg_key) {
                        msg.cycle_time = cycle;
                    }
                }
                "GenMsgSendType" => {
                    let index: usize =
                        value
                            .parse::<usize>()
                            .map_err(|_| StatementError::InvalidNumber {
                                field: "send type index",
                                token: value.to_string(),
                            })?;
                    let label: String = db
                        .msg_send_types
                        .get(&index)
                        .cloned()
                        .ok_or(StatementError::UnknownSendType { index })?;
                    if let Some(msg) = db.get_message_by_key_mut(msg_key) {
                        msg.launch_type = label;
                    }
                }
                "GenMsgDelayTime" => {
                    let delay: i32 =
                        value
                            .parse::<i32>()
                            .map_err(|_| StatementError::InvalidNumber {
                                field: "delay time",
                                token: value.to_string(),
                            })?;
                    if let Some(msg) = db.get_message_by_key_mut(msg_key) {
                        msg.delay_time = delay;
                    }
                }
                _ => {} // unrecognized message attributes are dropped
            }
            Ok(())
        }
        Some("SG_") => {
            let id: u32 = parse_message_id(&tokens, 3)?;
            let sig_name: &str = tokens.get(4).ok_or(StatementError::MissingField {
                field: "signal name",
            })?;
            let value: String = tokens[5..]
                .iter()
                .map(|t| strip_quotes(t))
                .collect::<Vec<&str>>()
                .join(" ");

            if let Some(msg_key) = db.get_msg_key_by_id_hex(&canonical_id_hex(id))
                && let Some(sig_key) = db.get_signal_key(msg_key, sig_name)
                && let Some(sig) = db.get_signal_by_key_mut(sig_key)
            {
                sig.attributes.insert(name, value);
            }
            Ok(())
        }
        Some(value) => {
            db.push_attribute(&name, "Setting", strip_quotes(value).to_string());
            Ok(())
        }
        None => Err(StatementError::MissingField {
            field: "attribute value",
        }),
    }
}

fn parse_message_id(tokens: &[String], index: usize) -> Result<u32, StatementError> {
    let id_tok: &str = tokens.get(index).ok_or(StatementError::MissingField {
        field: "message id",
    })?;
    id_tok
        .parse::<u32>()
        .map_err(|_| StatementError::InvalidNumber {
            field: "message id",
            token: id_tok.to_string(),
        })
}
