//! Bounded in-memory logs: the tool call audit ring and the terminal log.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::models::ToolCallRecord;

pub const DEFAULT_AUDIT_CAPACITY: usize = 100;
pub const DEFAULT_TERMINAL_LINES: usize = 1_000;

/// Ring of the most recent tool calls; the oldest record is dropped once
/// the capacity is reached.
#[derive(Debug)]
pub struct AuditLog {
    capacity: usize,
    records: Mutex<VecDeque<ToolCallRecord>>,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1_024))),
        }
    }

    fn records_guard(&self) -> MutexGuard<'_, VecDeque<ToolCallRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, record: ToolCallRecord) {
        let mut records = self.records_guard();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Records, oldest first.
    pub fn records(&self) -> Vec<ToolCallRecord> {
        self.records_guard().iter().cloned().collect()
    }

    /// The last `n` records, oldest first.
    pub fn tail(&self, n: usize) -> Vec<ToolCallRecord> {
        let records = self.records_guard();
        let skip = records.len().saturating_sub(n);
        records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records_guard().is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}

/// Output of commands run through `terminal_runCommand`, line by line.
#[derive(Debug)]
pub struct TerminalLog {
    max_lines: usize,
    lines: Mutex<VecDeque<String>>,
}

impl TerminalLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines: max_lines.max(1),
            lines: Mutex::new(VecDeque::new()),
        }
    }

    fn lines_guard(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a command header and its output.
    pub fn record(&self, command: &str, stdout: &str, stderr: &str) {
        let mut lines = self.lines_guard();
        let incoming = std::iter::once(format!("$ {command}"))
            .chain(stdout.lines().map(str::to_string))
            .chain(stderr.lines().map(str::to_string));
        for line in incoming {
            if lines.len() >= self.max_lines {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let lines = self.lines_guard();
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }
}

impl Default for TerminalLog {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_LINES)
    }
}
