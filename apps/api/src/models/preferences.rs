use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::Resource;

/// Per-user UI and notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub id: String,
    pub timezone: Option<String>,
    pub default_board: Option<String>,
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Preferences {
    const NAME: &'static str = "preferences";
    const PATH: &'static str = "preferences";

    fn id(&self) -> &str {
        &self.id
    }
}
