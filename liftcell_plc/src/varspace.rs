//! Flat addressable variable space.
//!
//! A mapping from hierarchical path string to a typed cell, shared (by
//! protocol, not by memory) between the supervisor and the PLC core. The
//! transport that mirrors it to the wire is out of scope; in-process it is
//! the single source of truth both sides read and write.
//!
//! Writes are atomic per cell and type-checked against the kind registered
//! at startup. No cross-cell atomicity is offered — the handshake protocol
//! is designed so no invariant spans two cells without a gate.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use liftcell_common::consts::WIRE_STRING_MAX;

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int16(i16),
    Int64(i64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Kind tag for type-mismatch diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int16(_) => "Int16",
            Self::Int64(_) => "Int64",
            Self::Bool(_) => "Bool",
            Self::Str(_) => "Str",
        }
    }
}

/// Error type for variable-space operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VarSpaceError {
    /// Path was never registered.
    #[error("unknown variable path: {0}")]
    UnknownPath(String),

    /// Write or typed read with the wrong cell kind.
    #[error("type mismatch at {path}: expected {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// The flat path → cell map.
///
/// `BTreeMap` keeps `list_paths` output stable for diagnostics and tests.
#[derive(Debug, Default)]
pub struct VariableSpace {
    cells: BTreeMap<String, Value>,
    changed: BTreeSet<String>,
}

impl VariableSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cell with its initial value. The initial value fixes the
    /// cell's kind for all later writes. Re-registering a path is a setup
    /// bug and is rejected in debug builds.
    pub fn register(&mut self, path: impl Into<String>, initial: Value) {
        let path = path.into();
        let prev = self.cells.insert(path.clone(), initial);
        debug_assert!(prev.is_none(), "duplicate registration of {path}");
    }

    /// Read a cell by path.
    pub fn read(&self, path: &str) -> Result<&Value, VarSpaceError> {
        self.cells
            .get(path)
            .ok_or_else(|| VarSpaceError::UnknownPath(path.to_string()))
    }

    /// Write a cell. Returns whether the stored value actually changed;
    /// unchanged writes are suppressed so listeners only see diffs.
    pub fn write(&mut self, path: &str, value: Value) -> Result<bool, VarSpaceError> {
        let cell = self
            .cells
            .get_mut(path)
            .ok_or_else(|| VarSpaceError::UnknownPath(path.to_string()))?;

        if std::mem::discriminant(cell) != std::mem::discriminant(&value) {
            return Err(VarSpaceError::TypeMismatch {
                path: path.to_string(),
                expected: cell.kind(),
                found: value.kind(),
            });
        }

        // Oversized strings are clamped rather than rejected, matching the
        // wire limit for comment/alarm fields.
        let value = match value {
            Value::Str(s) if s.len() > WIRE_STRING_MAX => {
                let mut s = s;
                s.truncate(WIRE_STRING_MAX);
                Value::Str(s)
            }
            other => other,
        };

        if *cell == value {
            return Ok(false);
        }
        *cell = value;
        self.changed.insert(path.to_string());
        Ok(true)
    }

    /// All registered paths under a prefix, in lexical order.
    pub fn list_paths(&self, prefix: &str) -> Vec<String> {
        self.cells
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Drain the set of paths written (with an actual value change) since
    /// the previous drain. This is the tick-scoped diff the publication
    /// glue hands to transport listeners.
    pub fn drain_changes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }

    // ─── Typed accessors ────────────────────────────────────────────

    pub fn read_i16(&self, path: &str) -> Result<i16, VarSpaceError> {
        match self.read(path)? {
            Value::Int16(v) => Ok(*v),
            other => Err(type_mismatch(path, "Int16", other)),
        }
    }

    pub fn read_i64(&self, path: &str) -> Result<i64, VarSpaceError> {
        match self.read(path)? {
            Value::Int64(v) => Ok(*v),
            other => Err(type_mismatch(path, "Int64", other)),
        }
    }

    pub fn read_bool(&self, path: &str) -> Result<bool, VarSpaceError> {
        match self.read(path)? {
            Value::Bool(v) => Ok(*v),
            other => Err(type_mismatch(path, "Bool", other)),
        }
    }

    pub fn read_str(&self, path: &str) -> Result<&str, VarSpaceError> {
        match self.read(path)? {
            Value::Str(v) => Ok(v.as_str()),
            other => Err(type_mismatch(path, "Str", other)),
        }
    }

    pub fn write_i16(&mut self, path: &str, v: i16) -> Result<bool, VarSpaceError> {
        self.write(path, Value::Int16(v))
    }

    pub fn write_i64(&mut self, path: &str, v: i64) -> Result<bool, VarSpaceError> {
        self.write(path, Value::Int64(v))
    }

    pub fn write_bool(&mut self, path: &str, v: bool) -> Result<bool, VarSpaceError> {
        self.write(path, Value::Bool(v))
    }

    pub fn write_str(&mut self, path: &str, v: &str) -> Result<bool, VarSpaceError> {
        self.write(path, Value::Str(v.to_string()))
    }
}

fn type_mismatch(path: &str, expected: &'static str, found: &Value) -> VarSpaceError {
    VarSpaceError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: found.kind(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
