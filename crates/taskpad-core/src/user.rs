use serde::{Deserialize, Serialize};

/// Account holder. Created on signup, returned on login, never mutated
/// client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}
