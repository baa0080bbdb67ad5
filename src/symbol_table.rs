//! Label to address mappings built while scanning assembly source.

use std::collections::HashMap;

/// Maps label names to byte addresses in instruction memory.
///
/// The table is populated during the front end's single scan and read-only
/// afterwards. The address recorded for a label is the program counter
/// value of the *next* instruction, not the label line itself.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    inner: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            inner: HashMap::new(),
        }
    }

    /// Records a label at the given byte address.
    ///
    /// Duplicate labels overwrite the earlier definition (last wins); the
    /// previous address is returned when that happens. Callers treat this
    /// as unspecified behavior, not a contract.
    pub fn define(&mut self, label: impl Into<String>, address: u32) -> Option<u32> {
        self.inner.insert(label.into(), address)
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.inner.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.inner.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.inner.iter().map(|(label, addr)| (label.as_str(), *addr))
    }
}
