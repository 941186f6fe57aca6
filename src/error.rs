// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error taxonomy for the ledger core. Validation and NotFound are kept
/// distinct so callers can map them to different response classes; store
/// failures are propagated as fatal for the current request.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("missing or invalid fields: {}", .fields.join(", "))]
    Validation { fields: Vec<String> },
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LedgerError::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
