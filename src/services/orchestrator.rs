// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LedgerResult;
use crate::services::projects::ensure_profile_config;
use crate::services::spending::{consult_spending, ConsultRequest, SpendingFilter};

/// A fan-out request naming the logical sources a caller needs merged
/// into one response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorRequest {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub consult: Option<ConsultRequest>,
}

/// Dispatches to each named source and merges the results into one keyed
/// object. Unknown source names are ignored, not rejected.
pub fn execute_queries(
    conn: &Connection,
    user: &str,
    request: &OrchestratorRequest,
) -> LedgerResult<Map<String, Value>> {
    let mut result = Map::new();

    for source in &request.sources {
        match source.as_str() {
            "spendings" => {
                let default_consult = ConsultRequest::Sum {
                    filter: SpendingFilter::default(),
                };
                let consult = request.consult.as_ref().unwrap_or(&default_consult);
                let outcome = consult_spending(conn, user, consult)?;
                result.insert(
                    "spendings".to_string(),
                    serde_json::to_value(&outcome).map_err(store_json_err)?,
                );
            }
            "profile_config" => {
                let config = ensure_profile_config(conn, user)?;
                result.insert(
                    "profile_config".to_string(),
                    serde_json::to_value(&config).map_err(store_json_err)?,
                );
            }
            other => {
                debug!(source = other, "ignoring unknown query source");
            }
        }
    }

    Ok(result)
}

fn store_json_err(e: serde_json::Error) -> crate::error::LedgerError {
    crate::error::LedgerError::Store(rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
