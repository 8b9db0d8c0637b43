use serde_derive::{Deserialize, Serialize};

/// A raw CAN frame as delivered by whatever transport feeds the database:
/// a numeric identifier plus the payload bytes. This is the entire contract
/// the update path requires from the bus side.
#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CanFrame {
    /// Numeric CAN ID (base 10).
    pub id: u32,
    /// Payload bytes.
    pub data: Vec<u8>,
}

impl CanFrame {
    pub fn new(id: u32, data: Vec<u8>) -> Self {
        CanFrame { id, data }
    }
}
