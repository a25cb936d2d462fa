//! In-flight load bookkeeping

use std::collections::HashSet;
use std::fmt;

use crate::error::{LoadError, Result};

/// Which kind of asset a load produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Bim,
    PointCloud,
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadKind::Bim => write!(f, "BIM"),
            LoadKind::PointCloud => write!(f, "point cloud"),
        }
    }
}

/// At most one load per kind may be in flight.
#[derive(Debug, Default)]
pub struct LoadTracker {
    in_flight: HashSet<LoadKind>,
}

impl LoadTracker {
    /// Claim the slot for `kind`, or fail with [`LoadError::Busy`].
    pub fn begin(&mut self, kind: LoadKind) -> Result<()> {
        if !self.in_flight.insert(kind) {
            tracing::warn!("Rejected {kind} load: one is already running");
            return Err(LoadError::Busy(kind));
        }
        Ok(())
    }

    /// Fail with [`LoadError::Busy`] if `kind` is claimed, without claiming it.
    pub fn ensure_idle(&self, kind: LoadKind) -> Result<()> {
        if self.is_loading(kind) {
            tracing::warn!("Rejected {kind} load: one is already running");
            return Err(LoadError::Busy(kind));
        }
        Ok(())
    }

    pub fn finish(&mut self, kind: LoadKind) {
        self.in_flight.remove(&kind);
    }

    pub fn is_loading(&self, kind: LoadKind) -> bool {
        self.in_flight.contains(&kind)
    }

    pub fn any(&self) -> bool {
        !self.in_flight.is_empty()
    }
}
