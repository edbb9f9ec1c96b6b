//! Fleet roster abstraction

use crate::error::CoreError;

/// Supplies the ordered device identifiers for a run
pub trait FleetRoster: Send + Sync {
    /// Device identifiers in roster order
    ///
    /// # Errors
    /// Returns `CoreError::RosterUnavailable` if the roster cannot be obtained.
    fn devices(&self) -> Result<Vec<String>, CoreError>;
}

/// Fixed in-memory roster
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    devices: Vec<String>,
}

impl StaticRoster {
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: devices.into_iter().map(Into::into).collect(),
        }
    }
}

impl FleetRoster for StaticRoster {
    fn devices(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.devices.clone())
    }
}
