//! Row-level evaluation warnings.
//!
//! A position that fails to evaluate becomes null and leaves a warning
//! behind. Every evaluation unit of a query records into one shared
//! [`WarningCollector`], which keeps each distinct
//! `(location, operator, category)` once, counts repeats, and stops storing
//! new keys once `max_warnings` of them exist.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use strata_common::{ComputeConfig, Location, Source};
use tracing::{debug, warn};

/// Identity of a warning; repeats of the same key only bump its count
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WarningKey {
    pub location: Location,
    pub operator: Arc<str>,
    pub category: String,
}

#[derive(Debug)]
struct WarningEntry {
    sequence: usize,
    occurrences: AtomicU64,
}

/// What happened to one `record` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First time this key was seen
    Recorded,
    /// Key already present; its count went up
    Repeated,
    /// Cap reached; the key was not stored
    Dropped,
}

/// A recorded warning and how often it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWarning {
    pub key: WarningKey,
    pub occurrences: u64,
}

/// Bounded, concurrent, deduplicating warning map for one query
#[derive(Debug)]
pub struct WarningCollector {
    entries: DashMap<WarningKey, WarningEntry>,
    /// Slots handed out so far; never exceeds `max_warnings`
    reserved: AtomicUsize,
    dropped: AtomicU64,
    max_warnings: usize,
}

impl WarningCollector {
    pub fn new(max_warnings: usize) -> Self {
        WarningCollector {
            entries: DashMap::new(),
            reserved: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
            max_warnings,
        }
    }

    pub fn from_config(config: &ComputeConfig) -> Self {
        Self::new(config.max_warnings)
    }

    pub fn max_warnings(&self) -> usize {
        self.max_warnings
    }

    /// Record `occurrences` failures under `key`
    pub fn record(&self, key: WarningKey, occurrences: u64) -> RecordOutcome {
        if let Some(entry) = self.entries.get(&key) {
            entry.occurrences.fetch_add(occurrences, Ordering::Relaxed);
            return RecordOutcome::Repeated;
        }
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                entry.get().occurrences.fetch_add(occurrences, Ordering::Relaxed);
                RecordOutcome::Repeated
            }
            Entry::Vacant(vacant) => {
                let reserved = self.reserved.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < self.max_warnings).then_some(n + 1)
                });
                match reserved {
                    Ok(sequence) => {
                        vacant.insert(WarningEntry {
                            sequence,
                            occurrences: AtomicU64::new(occurrences),
                        });
                        RecordOutcome::Recorded
                    }
                    Err(_) => {
                        self.dropped.fetch_add(occurrences, Ordering::Relaxed);
                        debug!(
                            operator = %vacant.key().operator,
                            category = %vacant.key().category,
                            "warning cap reached, dropping"
                        );
                        RecordOutcome::Dropped
                    }
                }
            }
        }
    }

    /// Number of distinct warnings stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failures whose key arrived after the cap was reached
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn occurrences(&self, key: &WarningKey) -> u64 {
        self.entries
            .get(key)
            .map_or(0, |e| e.occurrences.load(Ordering::Relaxed))
    }

    /// Stored warnings in the order they were first recorded
    pub fn snapshot(&self) -> Vec<RecordedWarning> {
        let mut recorded: Vec<(usize, RecordedWarning)> = self
            .entries
            .iter()
            .map(|e| {
                (
                    e.value().sequence,
                    RecordedWarning {
                        key: e.key().clone(),
                        occurrences: e.value().occurrences.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();
        recorded.sort_by_key(|(sequence, _)| *sequence);
        recorded.into_iter().map(|(_, w)| w).collect()
    }

    /// User-visible warning lines.
    ///
    /// Each operator location gets one header line, followed by one line per
    /// failure category seen there.
    pub fn messages(&self) -> Vec<(Location, String)> {
        let mut messages = Vec::new();
        let mut headed: Vec<(Location, Arc<str>)> = Vec::new();
        for warning in self.snapshot() {
            let key = warning.key;
            if !headed
                .iter()
                .any(|(l, o)| *l == key.location && *o == key.operator)
            {
                messages.push((
                    key.location,
                    format!(
                        "{}: evaluation of [{}] failed, treating result as null. Only first {} failures recorded.",
                        key.location, key.operator, self.max_warnings
                    ),
                ));
                headed.push((key.location, key.operator.clone()));
            }
            messages.push((key.location, format!("{}: {}", key.location, key.category)));
        }
        messages
    }

    /// Hand every message to `sink`
    pub fn publish(&self, sink: &dyn WarningSink) {
        for (location, message) in self.messages() {
            sink.add_warning(&location, &message);
        }
        let dropped = self.dropped();
        if dropped > 0 {
            warn!(dropped, max_warnings = self.max_warnings, "further evaluation failures not recorded");
        }
    }
}

/// Receives user-visible warnings
pub trait WarningSink: Send + Sync {
    fn add_warning(&self, location: &Location, message: &str);
}

/// Forwards warnings to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingWarningSink;

impl WarningSink for LoggingWarningSink {
    fn add_warning(&self, location: &Location, message: &str) {
        warn!(line = location.line, "{}", message);
    }
}

/// Keeps warnings in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingWarningSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingWarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl WarningSink for RecordingWarningSink {
    fn add_warning(&self, _location: &Location, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Per-expression handle onto the query's collector
#[derive(Debug, Clone)]
pub struct Warnings {
    collector: Arc<WarningCollector>,
    location: Location,
    operator: Arc<str>,
}

impl Warnings {
    pub fn new(collector: Arc<WarningCollector>, source: &Source) -> Self {
        Warnings {
            collector,
            location: source.location(),
            operator: source.text().into(),
        }
    }

    pub fn register_failure(&self, category: &impl fmt::Display) -> RecordOutcome {
        self.register_failures(category, 1)
    }

    /// Record the same failure for `occurrences` positions at once
    pub fn register_failures(&self, category: &impl fmt::Display, occurrences: u64) -> RecordOutcome {
        self.collector.record(
            WarningKey {
                location: self.location,
                operator: self.operator.clone(),
                category: category.to_string(),
            },
            occurrences,
        )
    }

    pub fn collector(&self) -> &Arc<WarningCollector> {
        &self.collector
    }
}
