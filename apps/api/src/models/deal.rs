use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::grouping::PipelineItem;
use crate::resources::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub stage_id: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub company_id: Option<String>,
    pub contact_id: Option<String>,
    pub expected_close: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Deal {
    const NAME: &'static str = "deal";
    const PATH: &'static str = "deals";

    fn id(&self) -> &str {
        &self.id
    }
}

impl PipelineItem for Deal {
    fn stage_id(&self) -> &str {
        &self.stage_id
    }

    fn amount(&self) -> Option<f64> {
        self.amount
    }
}
