use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload: just enough to re-identify the user. Role is looked up
/// fresh on every request rather than trusted from the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub exp: usize,
}
