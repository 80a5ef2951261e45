use serde::Deserialize;
use std::io::BufRead;

use crate::domain::gateway::GatewayStatus;
use crate::domain::policy::Role;
use crate::domain::property::{PropertyType, VerificationDecision};
use crate::error::{CoreError, Result};

/// One line of a replay scenario.
///
/// Users, properties, meters, and orders are referenced by the string handles
/// the scenario introduced them with; the runner resolves those to entity ids.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// Seeds a user, standing in for the external credential flow.
    RegisterUser {
        handle: String,
        name: String,
        email: String,
        role: Role,
    },
    SubmitProperty {
        actor: String,
        handle: String,
        name: String,
        property_type: PropertyType,
        address: String,
        city: String,
    },
    DecideProperty {
        actor: String,
        property: String,
        decision: VerificationDecision,
        #[serde(default)]
        note: Option<String>,
    },
    RegisterMeter {
        actor: String,
        property: String,
        meter_number: String,
        location: String,
    },
    Purchase {
        actor: String,
        meter_number: String,
        amount: u64,
        payment_method: String,
        /// Handle later callback/poll events reference the order by.
        order: String,
    },
    /// Signed push notification from the (sandbox) gateway.
    Callback {
        order: String,
        status: GatewayStatus,
    },
    Poll {
        actor: String,
        order: String,
    },
    ChangeRole {
        actor: String,
        user: String,
        new_role: Role,
    },
    SetActive {
        actor: String,
        user: String,
        is_active: bool,
    },
    SetRate {
        actor: String,
        water_rate: u64,
    },
}

/// Reads scenario events from a JSON-lines source.
///
/// Blank lines and `#` comment lines are skipped; each remaining line must be
/// one JSON-encoded [`ScenarioEvent`].
pub struct ScenarioReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> ScenarioReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Iterator that lazily reads and decodes events, so large scenarios
    /// stream without being loaded whole.
    pub fn events(self) -> impl Iterator<Item = Result<ScenarioEvent>> {
        self.source
            .lines()
            .map(|line| line.map_err(|e| CoreError::Storage(format!("scenario read failed: {e}"))))
            .filter(|line| match line {
                Ok(line) => {
                    let trimmed = line.trim();
                    !trimmed.is_empty() && !trimmed.starts_with('#')
                }
                Err(_) => true,
            })
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line)
                    .map_err(|e| CoreError::Validation(format!("malformed scenario line: {e}")))
            })
    }
}
