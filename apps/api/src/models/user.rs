use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in recruiter as reported by the identity provider.
/// Owns jobs and candidate records through their `owner_id` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}
