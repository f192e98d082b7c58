use serde::{Deserialize, Serialize};

/// The user performing a workflow action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: String,
    pub email: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), role: role.into(), email: email.into() }
    }
}
