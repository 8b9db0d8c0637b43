//! # dbc_tools
//!
//! Rust utilities for parsing and modeling **automotive CAN** databases.
//!
//! ## Highlights
//! - **DBC parser**: load a CAN communication matrix from `.dbc` text into a
//!   SlotMap-backed [`DatabaseDBC`]: ECUs, messages, signals, attributes and
//!   value tables, cross-referenced through stable keys.
//! - **Fast lookups**: normalized helpers (`get_message_by_id/_id_hex/_name`,
//!   `get_ecu_by_name`, `get_signal_in_message`); every cross-section
//!   reference resolves through the canonical hexadecimal id
//!   ([`canonical_id_hex`]).
//! - **Signal codec**: `extract_raw_u64` / `insert_raw_u64` map a signal's
//!   declared position, length and byte order onto payload bytes, with
//!   linear physical scaling on top.
//! - **Live updates**: feed received [`CanFrame`]s to
//!   `DatabaseDBC::update_message` and get back the list of signals whose
//!   decoded value actually changed.
//!
//! ```no_run
//! use dbc_tools::parse;
//!
//! let db = parse::from_file("example.dbc").expect("Failed to parse DBC file");
//! println!("Parsed {} messages", db.message_count());
//! ```

pub mod parse;
pub mod types;
pub mod update;

pub(crate) mod core;
pub(crate) mod extract;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::parse::DbcFile;
#[doc(inline)]
pub use crate::types::{
    canframe::CanFrame,
    database::{DatabaseDBC, EcuKey, MessageKey, SignalKey, canonical_id_hex},
    ecu::EcuDBC,
    errors::{DbcParseError, MessageLayoutError, StatementError},
    message::MessageDBC,
    signal::{Endianness, SignalDBC, Signess},
};
#[doc(inline)]
pub use crate::update::MessageUpdate;
