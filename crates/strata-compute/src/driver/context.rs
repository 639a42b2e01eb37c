//! Per-query state handed to every evaluation unit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use strata_common::{ComputeConfig, Error, Result, Source};

use crate::warnings::{WarningCollector, Warnings};

/// Cooperative cancellation flag shared by all units of a query
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Error::Cancelled)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Shared configuration, warning collector and cancellation token.
///
/// Clones share the same collector and token.
#[derive(Debug, Clone)]
pub struct DriverContext {
    config: Arc<ComputeConfig>,
    warnings: Arc<WarningCollector>,
    cancellation: CancellationToken,
}

impl DriverContext {
    pub fn new(config: Arc<ComputeConfig>) -> Self {
        let warnings = Arc::new(WarningCollector::from_config(&config));
        DriverContext {
            config,
            warnings,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_parts(
        config: Arc<ComputeConfig>,
        warnings: Arc<WarningCollector>,
        cancellation: CancellationToken,
    ) -> Self {
        DriverContext {
            config,
            warnings,
            cancellation,
        }
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    pub fn warnings(&self) -> &Arc<WarningCollector> {
        &self.warnings
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Warning handle for the expression built from `source`
    pub fn warnings_for(&self, source: &Source) -> Warnings {
        Warnings::new(self.warnings.clone(), source)
    }

    /// Cancellation check for per-position loops
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            token: self.cancellation.clone(),
            interval: self.config.checkpoint_interval.max(1),
        }
    }
}

impl Default for DriverContext {
    fn default() -> Self {
        DriverContext::new(Arc::new(ComputeConfig::default()))
    }
}

/// Checks the cancellation token every `interval` positions
#[derive(Debug, Clone)]
pub struct Checkpoint {
    token: CancellationToken,
    interval: usize,
}

impl Checkpoint {
    #[inline]
    pub fn at(&self, position: usize) -> Result<()> {
        if position % self.interval == 0 {
            self.token.check()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_shared_between_clones() {
        let context = DriverContext::default();
        let other = context.clone();
        assert!(other.cancellation().check().is_ok());
        context.cancellation().cancel();
        assert!(matches!(other.cancellation().check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_checkpoint_interval() {
        let config = ComputeConfig::default().with_checkpoint_interval(4);
        let context = DriverContext::new(Arc::new(config));
        let checkpoint = context.checkpoint();
        context.cancellation().cancel();
        assert!(checkpoint.at(3).is_ok());
        assert!(matches!(checkpoint.at(4), Err(Error::Cancelled)));
    }
}
