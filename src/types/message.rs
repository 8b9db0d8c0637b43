use serde_derive::{Deserialize, Serialize};

use crate::types::database::{DatabaseDBC, EcuKey, SignalKey};
use crate::types::signal::SignalDBC;

/// CAN message defined in the database.
///
/// Maintains the numeric ID (`id`), the canonical hexadecimal ID (`id_hex`,
/// the lookup key used everywhere a message is referenced across sections),
/// the `name`, payload length (`byte_length`), the live payload buffer, and
/// scheduling metadata filled in later by `BA_` statements.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MessageDBC {
    /// Numeric CAN ID (base 10).
    pub id: u32,
    /// Canonical hexadecimal CAN ID (`"0x..."`, uppercase, min 3 digits).
    pub id_hex: String,
    /// Message name.
    pub name: String,
    /// Payload length in bytes.
    pub byte_length: u16,
    /// Transmitting ECU. The ECU does not own the message; the database does.
    pub ecu: Option<EcuKey>,
    /// Current payload bytes; always `byte_length` long, zeroed at creation.
    pub payload: Vec<u8>,
    /// Cycle time in milliseconds (`GenMsgCycleTime`; 0 when not cyclic).
    pub cycle_time: u32,
    /// Delay before sending in milliseconds (`GenMsgDelayTime`).
    pub delay_time: i32,
    /// Send behavior label resolved from the send-type enumeration.
    pub launch_type: String,
    /// Signals that belong to this message (names unique within it).
    pub signals: Vec<SignalKey>,
}

impl MessageDBC {
    /// True if the message is sent on a time interval.
    pub fn cyclic(&self) -> bool {
        self.cycle_time != 0
    }

    /// Convenience iterator over the `SignalDBC`s belonging to this message.
    pub fn signals<'a>(&'a self, db: &'a DatabaseDBC) -> impl Iterator<Item = &'a SignalDBC> + 'a {
        self.signals
            .iter()
            .filter_map(move |&key| db.get_signal_by_key(key))
    }

    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = MessageDBC::default();
    }
}
