use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::database::MessageKey;

/// ECU (network node) defined in the database.
///
/// ECUs are created lazily the first time their name shows up in any section:
/// the `BU_` list, a `BO_` header, or an `SG_` receiver list. They never own
/// messages; both maps hold keys resolved through the owning
/// [`DatabaseDBC`](crate::types::database::DatabaseDBC), keyed by the
/// canonical hexadecimal message id.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct EcuDBC {
    /// ECU name (unique, case-insensitive lookup key).
    pub name: String,
    /// Messages this ECU transmits.
    pub tx_messages: BTreeMap<String, MessageKey>,
    /// Messages this ECU is declared to receive.
    pub rx_messages: BTreeMap<String, MessageKey>,
}

impl EcuDBC {
    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = EcuDBC::default();
    }
}
