use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    /// Headcount band as entered on the form, e.g. "51-200".
    pub size: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Company {
    const NAME: &'static str = "company";
    const PATH: &'static str = "companies";

    fn id(&self) -> &str {
        &self.id
    }
}
