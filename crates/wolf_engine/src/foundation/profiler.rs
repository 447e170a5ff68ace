//! Nested timing scopes
//!
//! A scope opened while another one is running becomes its child the first
//! time it is seen. Each scope keeps the last [`Profiler::HISTORY`] samples and
//! the report prints the averages as an indented tree, with each child's share
//! of its parent.

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;

use super::time::Stopwatch;

/// Hierarchical scope timer
#[derive(Default)]
pub struct Profiler {
    running: HashMap<String, Stopwatch>,
    history: HashMap<String, VecDeque<f32>>,
    parents: HashMap<String, String>,
    /// Scope names in first-seen order so reports are stable
    order: Vec<String>,
    stack: Vec<String>,
    enabled: bool,
}

impl Profiler {
    /// Samples kept per scope
    pub const HISTORY: usize = 100;

    /// Create a profiler; a disabled one ignores every call
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Whether scopes are being recorded
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open a scope
    pub fn start(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        if !self.history.contains_key(name) {
            self.history.insert(name.to_string(), VecDeque::new());
            self.order.push(name.to_string());
            if let Some(parent) = self.stack.last() {
                self.parents.insert(name.to_string(), parent.clone());
            }
        }
        self.running.insert(name.to_string(), Stopwatch::start_new());
        self.stack.push(name.to_string());
    }

    /// Close a scope opened with [`Profiler::start`]
    pub fn end(&mut self, name: &str) {
        if !self.enabled {
            return;
        }
        let Some(mut stopwatch) = self.running.remove(name) else {
            log::warn!("Profiler scope '{}' ended without being started", name);
            return;
        };
        stopwatch.stop();
        self.record(name, stopwatch.elapsed_millis());
        if let Some(position) = self.stack.iter().rposition(|n| n == name) {
            self.stack.remove(position);
        }
    }

    /// Add a sample in milliseconds directly
    pub fn record(&mut self, name: &str, millis: f32) {
        let samples = self.history.entry(name.to_string()).or_default();
        samples.push_back(millis);
        if samples.len() > Self::HISTORY {
            samples.pop_front();
        }
        if !self.order.iter().any(|n| n == name) {
            self.order.push(name.to_string());
        }
    }

    /// Average of the recorded samples of a scope in milliseconds
    pub fn average(&self, name: &str) -> Option<f32> {
        let samples = self.history.get(name)?;
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f32>() / samples.len() as f32)
    }

    /// Indented report, one line per scope
    pub fn report(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for root in self.order.iter().filter(|n| !self.parents.contains_key(*n)) {
            self.report_scope(root, 0, &mut lines);
        }
        lines
    }

    fn report_scope(&self, name: &str, depth: usize, lines: &mut Vec<String>) {
        let average = self.average(name).unwrap_or(0.0);
        let share = match self.parents.get(name).and_then(|p| self.average(p)) {
            Some(parent) if parent > 0.0 => average / parent,
            _ => 1.0,
        };
        let mut line = String::new();
        let _ = write!(
            line,
            "{}{}: {:.2}ms ({:.2}%)",
            " ".repeat(depth),
            name,
            average,
            share * 100.0
        );
        lines.push(line);

        for child in self
            .order
            .iter()
            .filter(|n| self.parents.get(*n).is_some_and(|p| p == name))
        {
            self.report_scope(child, depth + 1, lines);
        }
    }

    /// Write the report to the log at info level
    pub fn log_report(&self) {
        log::info!("Performance:");
        for line in self.report() {
            log::info!("{}", line);
        }
    }
}
