use crate::errors::InspectionError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Polled before work on each node. Returning `true` aborts the inspection.
pub trait CancellationToken: fmt::Debug + Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// A shared flag, typically cancelled by the host when the document changes.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationToken for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct InspectionSettings {
    maybe_cancellation_token: Option<Arc<dyn CancellationToken>>,
    max_depth: usize,
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self {
            maybe_cancellation_token: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl InspectionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation_token(mut self, token: impl CancellationToken + 'static) -> Self {
        self.maybe_cancellation_token = Some(Arc::new(token));
        self
    }

    /// Maximum nesting of type inference before giving up.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn check_cancellation(&self) -> Result<(), InspectionError> {
        match &self.maybe_cancellation_token {
            Some(token) if token.is_cancelled() => Err(InspectionError::cancelled()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_cancels_clones() {
        let flag = CancellationFlag::new();
        let settings = InspectionSettings::new().with_cancellation_token(flag.clone());

        assert!(settings.check_cancellation().is_ok());
        flag.cancel();
        assert!(settings.check_cancellation().unwrap_err().is_cancelled());
    }

    #[test]
    fn defaults() {
        let settings = InspectionSettings::default();

        assert_eq!(settings.max_depth(), DEFAULT_MAX_DEPTH);
        assert!(settings.check_cancellation().is_ok());
    }
}
