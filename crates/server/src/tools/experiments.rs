//! experiment_assign tool implementation.

use crate::state::AppState;
use keigo_core::Error;
use keigo_core::prefs::Assignments;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the experiment_assign tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExperimentAssignParams {
    /// Name of a configured experiment.
    pub experiment: String,

    /// Stable visitor identifier used for bucketing.
    pub subject: String,
}

/// Output structure for the experiment_assign tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExperimentAssignOutput {
    pub experiment: String,
    pub variant: String,
}

/// Implementation of the experiment_assign tool.
pub async fn assign_impl(state: &AppState, params: ExperimentAssignParams) -> Result<CallToolResult, McpError> {
    let experiment = state
        .config
        .experiment(&params.experiment)
        .ok_or_else(|| Error::UnknownExperiment(params.experiment.clone()))?;

    let variant = Assignments::new(&state.store)
        .assign(experiment, &params.subject)
        .ok_or_else(|| Error::InvalidInput(format!("experiment '{}' has no weighted variant", experiment.name)))?;

    super::json_result(&ExperimentAssignOutput { experiment: params.experiment, variant })
}
