//! Parsing entry points.
//!
//! A parse runs one extraction scan per statement kind over the full file
//! text, in a fixed order (symbols, ECUs, message blocks, comments,
//! attribute definitions, attribute defaults, attribute settings, value
//! tables) because later sections reference entities the earlier ones
//! create. The first statement that cannot be interpreted aborts the run;
//! whatever was committed before it travels inside the error so best-effort
//! callers can keep it.

use std::fs;
use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::core;
use crate::extract;
use crate::types::database::DatabaseDBC;
use crate::types::errors::{DbcParseError, StatementError};

/// Parses a DBC file and returns a populated [`DatabaseDBC`] instance.
///
/// The file bytes are decoded as Windows-1252 and a handful of German
/// characters are transliterated to ASCII to keep downstream processing
/// UTF-8 safe.
///
/// # Errors
/// - [`DbcParseError::FileNotFound`] if the path does not exist (checked
///   before anything is read).
/// - [`DbcParseError::Read`] on I/O failures.
/// - [`DbcParseError::Loading`] when a statement is malformed; the variant
///   carries the database as populated up to that statement.
pub fn from_file(path: &str) -> Result<DatabaseDBC, DbcParseError> {
    let text: String = read_decoded(path)?;
    from_text(&text)
}

/// Parses DBC text that is already in memory.
pub fn from_text(text: &str) -> Result<DatabaseDBC, DbcParseError> {
    let mut db: DatabaseDBC = DatabaseDBC::default();
    match run_sections(&mut db, text) {
        Ok(()) => Ok(db),
        Err((statement, source)) => Err(DbcParseError::Loading {
            statement,
            source,
            partial: Box::new(db),
        }),
    }
}

/// Best-effort variant of [`from_file`]: a loading failure yields the
/// database populated up to the failure point together with `partial =
/// true`. File-level errors are still returned as errors.
pub fn from_file_partial(path: &str) -> Result<(DatabaseDBC, bool), DbcParseError> {
    match from_file(path) {
        Ok(db) => Ok((db, false)),
        Err(DbcParseError::Loading { partial, .. }) => Ok((*partial, true)),
        Err(e) => Err(e),
    }
}

/// Handle to a DBC file whose parsing is deferred.
///
/// Construction only validates that the file exists; [`DbcFile::parse`]
/// builds a fresh [`DatabaseDBC`] on every call.
#[derive(Debug, Clone)]
pub struct DbcFile {
    path: String,
}

impl DbcFile {
    /// Fails with [`DbcParseError::FileNotFound`] when the path is absent.
    pub fn new(path: &str) -> Result<Self, DbcParseError> {
        if !Path::new(path).exists() {
            return Err(DbcParseError::FileNotFound {
                path: path.to_string(),
            });
        }
        Ok(DbcFile {
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parse(&self) -> Result<DatabaseDBC, DbcParseError> {
        from_file(&self.path)
    }
}

fn run_sections(db: &mut DatabaseDBC, text: &str) -> Result<(), (String, StatementError)> {
    for block in extract::new_symbol_blocks(text) {
        core::ns_::decode(db, block).map_err(|e| (excerpt(block), e))?;
    }
    for line in extract::ecu_lines(text) {
        core::bu_::decode(db, line).map_err(|e| (excerpt(line), e))?;
    }
    for block in extract::message_blocks(text) {
        core::bo_::decode(db, block).map_err(|e| (excerpt(block), e))?;
    }
    for stmt in extract::comment_statements(text) {
        core::cm_::decode(db, stmt).map_err(|e| (excerpt(stmt), e))?;
    }
    for stmt in extract::attribute_definitions(text) {
        core::ba_def_::decode(db, stmt).map_err(|e| (excerpt(stmt), e))?;
    }
    for stmt in extract::attribute_defaults(text) {
        core::ba_def_def_::decode(db, stmt).map_err(|e| (excerpt(stmt), e))?;
    }
    for stmt in extract::attribute_settings(text) {
        core::ba_::decode(db, stmt).map_err(|e| (excerpt(stmt), e))?;
    }
    for stmt in extract::value_tables(text) {
        core::val_::decode(db, stmt).map_err(|e| (excerpt(stmt), e))?;
    }
    Ok(())
}

fn read_decoded(path: &str) -> Result<String, DbcParseError> {
    if !Path::new(path).exists() {
        return Err(DbcParseError::FileNotFound {
            path: path.to_string(),
        });
    }
    let bytes: Vec<u8> = fs::read(path).map_err(|source| DbcParseError::Read {
        path: path.to_string(),
        source,
    })?;

    // Decode as Windows-1252 and transliterate German characters.
    let (decoded, _, _) = WINDOWS_1252.decode(&bytes);
    let src: String = decoded.into_owned();
    let mut out: String = String::with_capacity(src.len());
    for ch in src.chars() {
        match ch {
            'ü' => out.push('u'),
            'ö' => out.push('o'),
            'ä' => out.push('a'),
            'ß' => {
                out.push('s');
                out.push('s');
            }
            'Ü' => out.push('U'),
            'Ö' => out.push('O'),
            'Ä' => out.push('A'),
            '¿' => out.push('?'),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// First line of a statement, shortened for error reporting.
fn excerpt(block: &str) -> String {
    let first: &str = block.lines().next().unwrap_or("").trim();
    if first.chars().count() > 72 {
        let head: String = first.chars().take(72).collect();
        format!("{head}…")
    } else {
        first.to_string()
    }
}
