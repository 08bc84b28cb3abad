use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBruteForceStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_failures: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(rename = "lastIPFailure", skip_serializing_if = "Option::is_none")]
    pub last_ip_failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<i64>,
}
