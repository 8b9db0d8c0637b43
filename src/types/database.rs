//! DatabaseDBC model (SlotMap-backed).
//!
//! This module defines the in-memory **CAN database** built by the DBC
//! parser. Storage uses **SlotMap** arenas with **stable keys**: [`EcuKey`],
//! [`MessageKey`], [`SignalKey`]. Back-references between entities (signal →
//! message, message → ECU, ECU → message) are plain keys resolved through the
//! owning database, never independent ownership.
//!
//! **Lookups** are normalized: ECU and message names are case-insensitive;
//! messages are additionally indexed by numeric id and by the canonical
//! hexadecimal id produced by [`canonical_id_hex`], which is the key every
//! later file section uses to reference a message.
//!
//! External consumers only get non-mutating views (`get_*`, `iter_*`); the
//! payload and signal values move exclusively through the codec helpers and
//! the update engine.

use serde_derive::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::{BTreeMap, HashMap};

use crate::types::ecu::EcuDBC;
use crate::types::errors::StatementError;
use crate::types::message::MessageDBC;
use crate::types::signal::SignalDBC;

// --- Stable keys (SlotMap) ---
new_key_type! { pub struct EcuKey; }
new_key_type! { pub struct MessageKey; }
new_key_type! { pub struct SignalKey; }

/// Canonical hexadecimal form of a message id: `"0x"` + uppercase hex,
/// zero-padded to a minimum of 3 digits, growing (never truncating) beyond.
///
/// Decimal 416 becomes `"0x1A0"`; decimal 4096 becomes `"0x1000"`.
pub fn canonical_id_hex(id: u32) -> String {
    format!("0x{id:03X}")
}

/// In-memory representation of a CAN database.
///
/// Holds the arenas of ECUs/messages/signals, the new-symbols table, the
/// global attribute table (attribute name → tag → settings, tags being
/// `"Definition"`, `"Default"` and `"Setting"`), the message send-type
/// enumeration and the signal-group table, plus normalized lookup maps.
/// A database is built fresh on every parse.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseDBC {
    // --- Main storage (stable-key arenas) ---
    pub(crate) ecus: SlotMap<EcuKey, EcuDBC>,
    pub(crate) messages: SlotMap<MessageKey, MessageDBC>,
    pub(crate) signals: SlotMap<SignalKey, SignalDBC>,

    // --- Global tables ---
    pub(crate) new_symbols: Vec<String>,
    pub(crate) attributes: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub(crate) msg_send_types: BTreeMap<usize, String>,
    // Populated by no parser: signal groupings stay unparsed.
    pub(crate) signal_groups: BTreeMap<String, Vec<SignalKey>>,

    // --- Lookups (case-normalized) ---
    pub(crate) ecu_key_by_name: HashMap<String, EcuKey>, // lower(name) → EcuKey
    pub(crate) msg_key_by_id: HashMap<u32, MessageKey>,  // id10 → MessageKey
    pub(crate) msg_key_by_hex: HashMap<String, MessageKey>, // canonical hex → MessageKey
    pub(crate) msg_key_by_name: HashMap<String, MessageKey>, // lower(name) → MessageKey
}

impl DatabaseDBC {
    // -------- ECUs --------

    /// Adds an ECU if not already present and returns its `EcuKey`.
    pub(crate) fn add_ecu_if_absent(&mut self, name: &str) -> EcuKey {
        if let Some(k) = self.get_ecu_key_by_name(name) {
            return k;
        }
        let key: EcuKey = self.ecus.insert(EcuDBC {
            name: name.to_string(),
            ..Default::default()
        });
        self.ecu_key_by_name.insert(name.to_lowercase(), key);
        key
    }

    pub fn get_ecu_key_by_name(&self, name: &str) -> Option<EcuKey> {
        self.ecu_key_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn get_ecu_by_key(&self, key: EcuKey) -> Option<&EcuDBC> {
        self.ecus.get(key)
    }

    /// Returns an `&EcuDBC` given the name (case-insensitive).
    pub fn get_ecu_by_name(&self, name: &str) -> Option<&EcuDBC> {
        let key: EcuKey = self.get_ecu_key_by_name(name)?;
        self.get_ecu_by_key(key)
    }

    pub(crate) fn get_ecu_by_key_mut(&mut self, key: EcuKey) -> Option<&mut EcuDBC> {
        self.ecus.get_mut(key)
    }

    /// Iterate all ECUs in creation order.
    pub fn iter_ecus(&self) -> impl Iterator<Item = &EcuDBC> + '_ {
        self.ecus.values()
    }

    pub fn ecu_count(&self) -> usize {
        self.ecus.len()
    }

    // -------- Messages --------

    /// Adds a message with a zeroed payload, indexes it under its numeric,
    /// canonical-hex and lowercase-name keys, and registers it in the
    /// transmitting ECU's tx set.
    ///
    /// Fails if the canonical id is already assigned.
    pub(crate) fn add_message(
        &mut self,
        name: &str,
        id: u32,
        byte_length: u16,
        ecu_key: EcuKey,
    ) -> Result<MessageKey, StatementError> {
        let id_hex: String = canonical_id_hex(id);
        if self.msg_key_by_hex.contains_key(&id_hex) {
            return Err(StatementError::DuplicateMessageId { id_hex });
        }

        let msg_key: MessageKey = self.messages.insert(MessageDBC {
            id,
            id_hex: id_hex.clone(),
            name: name.to_string(),
            byte_length,
            ecu: Some(ecu_key),
            payload: vec![0u8; byte_length as usize],
            signals: Vec::new(),
            ..Default::default()
        });

        self.msg_key_by_id.insert(id, msg_key);
        self.msg_key_by_hex.insert(id_hex.clone(), msg_key);
        self.msg_key_by_name.insert(name.to_lowercase(), msg_key);

        if let Some(ecu) = self.ecus.get_mut(ecu_key) {
            ecu.tx_messages.insert(id_hex, msg_key);
        }

        Ok(msg_key)
    }

    pub fn get_msg_key_by_id(&self, id: u32) -> Option<MessageKey> {
        self.msg_key_by_id.get(&id).copied()
    }

    pub fn get_msg_key_by_id_hex(&self, id_hex: &str) -> Option<MessageKey> {
        self.msg_key_by_hex.get(id_hex).copied()
    }

    pub fn get_msg_key_by_name(&self, name: &str) -> Option<MessageKey> {
        self.msg_key_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn get_message_by_key(&self, key: MessageKey) -> Option<&MessageDBC> {
        self.messages.get(key)
    }

    pub(crate) fn get_message_by_key_mut(&mut self, key: MessageKey) -> Option<&mut MessageDBC> {
        self.messages.get_mut(key)
    }

    /// Returns a `&MessageDBC` given the numeric CAN ID.
    pub fn get_message_by_id(&self, id: u32) -> Option<&MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_id(id)?;
        self.get_message_by_key(key)
    }

    /// Returns a `&MessageDBC` given the canonical hexadecimal ID.
    pub fn get_message_by_id_hex(&self, id_hex: &str) -> Option<&MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_id_hex(id_hex)?;
        self.get_message_by_key(key)
    }

    /// Returns a `&MessageDBC` given the name (case-insensitive).
    pub fn get_message_by_name(&self, name: &str) -> Option<&MessageDBC> {
        let key: MessageKey = self.get_msg_key_by_name(name)?;
        self.get_message_by_key(key)
    }

    /// Iterate all messages in creation order.
    pub fn iter_messages(&self) -> impl Iterator<Item = &MessageDBC> + '_ {
        self.messages.values()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    // -------- Signals --------

    /// Adds a fully built signal to the database and links it into its
    /// parent message. Fails if the message already owns a signal with the
    /// same name.
    pub(crate) fn add_signal(&mut self, sig: SignalDBC) -> Result<SignalKey, StatementError> {
        let msg_key: MessageKey = sig.message;
        if let Some(msg) = self.messages.get(msg_key) {
            if msg
                .signals
                .iter()
                .filter_map(|&k| self.signals.get(k))
                .any(|s| s.name == sig.name)
            {
                return Err(StatementError::DuplicateSignal {
                    name: sig.name.clone(),
                    id_hex: msg.id_hex.clone(),
                });
            }
        }

        let sig_key: SignalKey = self.signals.insert(sig);
        if let Some(msg) = self.messages.get_mut(msg_key) {
            msg.signals.push(sig_key);
        }
        Ok(sig_key)
    }

    pub fn get_signal_by_key(&self, key: SignalKey) -> Option<&SignalDBC> {
        self.signals.get(key)
    }

    pub(crate) fn get_signal_by_key_mut(&mut self, key: SignalKey) -> Option<&mut SignalDBC> {
        self.signals.get_mut(key)
    }

    /// Looks a signal up by name inside one message.
    pub fn get_signal_key(&self, msg_key: MessageKey, name: &str) -> Option<SignalKey> {
        let msg: &MessageDBC = self.messages.get(msg_key)?;
        msg.signals
            .iter()
            .copied()
            .find(|&k| self.signals.get(k).is_some_and(|s| s.name == name))
    }

    /// Looks a signal up by canonical message id and signal name, the way
    /// `CM_`/`BA_`/`VAL_` statements reference one.
    pub fn get_signal_in_message(&self, id_hex: &str, name: &str) -> Option<&SignalDBC> {
        let msg_key: MessageKey = self.get_msg_key_by_id_hex(id_hex)?;
        let sig_key: SignalKey = self.get_signal_key(msg_key, name)?;
        self.signals.get(sig_key)
    }

    /// Iterate all signals in creation order.
    pub fn iter_signals(&self) -> impl Iterator<Item = &SignalDBC> + '_ {
        self.signals.values()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    // -------- Signal values through the codec --------

    /// Decodes the signal's current raw value from its message payload.
    pub fn signal_value(&self, key: SignalKey) -> Option<u64> {
        let sig: &SignalDBC = self.signals.get(key)?;
        let msg: &MessageDBC = self.messages.get(sig.message)?;
        Some(sig.extract_raw_u64(&msg.payload))
    }

    /// Encodes a raw value into the signal's message payload and commits it
    /// as the signal's current value. Returns `false` when the key chain is
    /// broken.
    pub fn set_signal_value(&mut self, key: SignalKey, raw: u64) -> bool {
        let Some(sig) = self.signals.get(key) else {
            return false;
        };
        let Some(msg) = self.messages.get_mut(sig.message) else {
            return false;
        };
        sig.insert_raw_u64(&mut msg.payload, raw);
        if let Some(sig) = self.signals.get_mut(key) {
            sig.value = raw;
        }
        true
    }

    /// Decodes the signal's current physical value.
    pub fn signal_physical(&self, key: SignalKey) -> Option<f64> {
        let raw: u64 = self.signal_value(key)?;
        self.signals.get(key).map(|s| s.to_physical(raw))
    }

    /// Encodes a physical value. Returns `false` when the signal's factor is
    /// zero or the key chain is broken.
    pub fn set_signal_physical(&mut self, key: SignalKey, physical: f64) -> bool {
        let Some(raw) = self.signals.get(key).and_then(|s| s.from_physical(physical)) else {
            return false;
        };
        self.set_signal_value(key, raw)
    }

    // -------- Global tables --------

    /// Symbol names captured from the `NS_` block, in file order.
    pub fn new_symbols(&self) -> &[String] {
        &self.new_symbols
    }

    /// Global attribute table: attribute name → tag → settings.
    pub fn attributes(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.attributes
    }

    /// Message send-type enumeration (index → label) decomposed from a
    /// `BO_`-scoped `GenMsgSendType` definition.
    pub fn msg_send_types(&self) -> &BTreeMap<usize, String> {
        &self.msg_send_types
    }

    /// Signal groupings. Always empty: `SIG_GROUP_` statements are not
    /// parsed.
    pub fn signal_groups(&self) -> &BTreeMap<String, Vec<SignalKey>> {
        &self.signal_groups
    }

    /// Appends a value under one tag of the global attribute table.
    pub(crate) fn push_attribute(&mut self, name: &str, tag: &str, value: String) {
        self.attributes
            .entry(name.to_string())
            .or_default()
            .entry(tag.to_string())
            .or_default()
            .push(value);
    }

    /// Clear the database.
    pub fn clear(&mut self) {
        *self = DatabaseDBC::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_id_hex() {
        assert_eq!(canonical_id_hex(416), "0x1A0");
        assert_eq!(canonical_id_hex(4096), "0x1000");
        assert_eq!(canonical_id_hex(100), "0x064");
        assert_eq!(canonical_id_hex(0), "0x000");
        assert_eq!(canonical_id_hex(0x16A9_549D), "0x16A9549D");
    }

    #[test]
    fn test_duplicate_message_id_is_rejected() {
        let mut db = DatabaseDBC::default();
        let ecu = db.add_ecu_if_absent("Motor");
        db.add_message("Motor_01", 100, 8, ecu).unwrap();
        let err = db.add_message("Motor_02", 100, 8, ecu).unwrap_err();
        assert!(matches!(
            err,
            StatementError::DuplicateMessageId { id_hex } if id_hex == "0x064"
        ));
    }
}
