#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Full name, used when the form does not split first/last.
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Contact {
    const NAME: &'static str = "contact";
    const PATH: &'static str = "contacts";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip_through_extra() {
        let contact: Contact = serde_json::from_value(json!({
            "id": "c1",
            "firstName": "Ada",
            "linkedinUrl": "https://linkedin.com/in/ada"
        }))
        .unwrap();
        assert_eq!(contact.extra["linkedinUrl"], "https://linkedin.com/in/ada");
        let back = serde_json::to_value(&contact).unwrap();
        assert_eq!(back["linkedinUrl"], "https://linkedin.com/in/ada");
        assert_eq!(back["firstName"], "Ada");
    }
}
