//! Statement extraction.
//!
//! Each recognized statement kind gets its own compiled pattern and its own
//! independent scan over the full file text; there is no single tokenizing
//! pass. Kinds may overlap textually (a message block contains its signal
//! lines) and are queried independently, in file order. The fixed order in
//! which the kinds must be *processed* lives in [`crate::parse`].

use regex::Regex;
use std::sync::LazyLock;

// BO_ <decimalId> <name>: <byteLength> <txEcuName>
const BO_LINE: &str = r"BO_[ \t]+\d+[ \t]+\w+[ \t]*:[ \t]*\d+[ \t]+\w+";

// SG_ <name> [<mux>] : <start>|<len>@<1|0><+|-> (<factor>,<offset>) [<min>|<max>] "<unit>" <rx1>[,<rx2>...]
const SG_LINE: &str = r#"SG_[ \t]+\w+(?:[ \t]+\w+)?[ \t]*:[ \t]*\d+\|\d+@[01][+-][ \t]+\([^)]*\)[ \t]+\[[^\]]*\][ \t]+"[^"]*"(?:[ \t]+[\w,]+)*"#;

// NS_ : followed by indented symbol names, one per line
static NS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NS_[ \t]*:[ \t\r]*\n(?:[ \t]+\S+[ \t\r]*\n?)*").unwrap());

// BU_ : name1 name2 ...
static BU_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*BU_[ \t]*:[^\r\n]*").unwrap());

static BO_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(BO_LINE).unwrap());

// A message header plus zero or more nested signal lines.
static BO_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{BO_LINE}(?:\s+{SG_LINE})*")).unwrap());

static SG_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(SG_LINE).unwrap());

// CM_ <scope> <target...> "<text>"; the quoted text may span lines
static CM_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*CM_[ \t]+\w+[ \t]+\w+(?:[ \t]+\w+)*[ \t]+"[^"]*""#).unwrap()
});

static BA_DEF_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*BA_DEF_[ \t]+[^;\r\n]*;").unwrap());

static BA_DEF_DEF_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*BA_DEF_DEF_[ \t]+[^;\r\n]*;").unwrap());

static BA_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*BA_[ \t]+[^;\r\n]*;").unwrap());

static VAL_STMT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*VAL_[ \t]+[^;\r\n]*;").unwrap());

pub(crate) fn new_symbol_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    NS_BLOCK.find_iter(text).map(|m| m.as_str())
}

pub(crate) fn ecu_lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    BU_LINE.find_iter(text).map(|m| m.as_str())
}

pub(crate) fn message_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    BO_BLOCK.find_iter(text).map(|m| m.as_str())
}

/// The `BO_` header line of a message block.
pub(crate) fn message_header(block: &str) -> Option<&str> {
    BO_HEADER.find(block).map(|m| m.as_str())
}

/// The nested `SG_` lines of a message block.
pub(crate) fn signal_lines(block: &str) -> impl Iterator<Item = &str> + '_ {
    SG_LINES.find_iter(block).map(|m| m.as_str())
}

pub(crate) fn comment_statements(text: &str) -> impl Iterator<Item = &str> + '_ {
    CM_STMT.find_iter(text).map(|m| m.as_str())
}

pub(crate) fn attribute_definitions(text: &str) -> impl Iterator<Item = &str> + '_ {
    BA_DEF_STMT.find_iter(text).map(|m| m.as_str())
}

pub(crate) fn attribute_defaults(text: &str) -> impl Iterator<Item = &str> + '_ {
    BA_DEF_DEF_STMT.find_iter(text).map(|m| m.as_str())
}

pub(crate) fn attribute_settings(text: &str) -> impl Iterator<Item = &str> + '_ {
    BA_STMT.find_iter(text).map(|m| m.as_str())
}

pub(crate) fn value_tables(text: &str) -> impl Iterator<Item = &str> + '_ {
    VAL_STMT.find_iter(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
VERSION "1.0"

NS_ :
	NS_DESC_
	CM_
	BA_DEF_

BU_: Motor Gateway

BO_ 100 Motor_01: 8 Motor
 SG_ Status : 61|1@1+ (1,0) [0|1] "" Gateway
 SG_ Speed m0 : 48|8@1+ (1,0) [0|255] "km/h" Gateway

BO_ 200 Gateway_01: 2 Gateway

CM_ SG_ 100 Speed "vehicle speed";
BA_DEF_ "Baudrate" INT 1 1000000;
BA_DEF_DEF_ "Baudrate" 500000;
BA_ "Baudrate" 500000;
VAL_ 100 Status 1 "On" 0 "Off" ;
"#;

    #[test]
    fn test_statement_scans() {
        assert_eq!(new_symbol_blocks(SAMPLE).count(), 1);
        assert_eq!(ecu_lines(SAMPLE).count(), 1);
        assert_eq!(comment_statements(SAMPLE).count(), 1);
        assert_eq!(attribute_definitions(SAMPLE).count(), 1);
        assert_eq!(attribute_defaults(SAMPLE).count(), 1);
        assert_eq!(attribute_settings(SAMPLE).count(), 1);
        assert_eq!(value_tables(SAMPLE).count(), 1);
    }

    #[test]
    fn test_message_blocks_keep_their_signals() {
        let blocks: Vec<&str> = message_blocks(SAMPLE).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(signal_lines(blocks[0]).count(), 2);
        assert_eq!(signal_lines(blocks[1]).count(), 0);
        assert!(message_header(blocks[0]).unwrap().starts_with("BO_ 100"));
    }

    #[test]
    fn test_ns_block_lists_symbols() {
        let block = new_symbol_blocks(SAMPLE).next().unwrap();
        assert!(block.contains("NS_DESC_"));
        assert!(block.contains("BA_DEF_"));
        assert!(!block.contains("BU_"));
    }
}
