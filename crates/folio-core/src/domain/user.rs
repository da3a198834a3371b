use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in author, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl CurrentUser {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            image: None,
            roles: Vec::new(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Display name, ignoring blank values.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}
