use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusDTO {
    pub name: String,
    pub running: bool,
    pub completed_runs: u64,
    pub failed_runs: u64,
    pub skipped_ticks: u64,
}

pub mod get_service_health {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        pub jobs: Vec<JobStatusDTO>,
    }
}
