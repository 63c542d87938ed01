//! Simulation errors

use thiserror::Error;

use crate::types::{PointIndex, TimeIndex};

/// Simulation result type
pub type Result<T> = std::result::Result<T, Error>;

/// Simulation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid configuration: {field} {reason}")]
    Configuration { field: &'static str, reason: String },

    #[error("no live forward neighbour for point {point} at time index {time_index}")]
    BoundaryFault {
        time_index: TimeIndex,
        point: PointIndex,
    },

    #[error("fixed endpoint {point} is erased at time index {time_index}")]
    EndpointErased {
        time_index: TimeIndex,
        point: PointIndex,
    },

    #[error("point {point} is erased at time index {time_index} but the update needs it")]
    ErasedSample {
        time_index: TimeIndex,
        point: PointIndex,
    },
}

impl Error {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            reason: reason.into(),
        }
    }
}
