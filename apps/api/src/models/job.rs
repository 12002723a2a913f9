use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::grouping::PipelineItem;
use crate::resources::Resource;

/// A job opening moving through the recruitment pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub stage_id: String,
    pub company_id: Option<String>,
    pub location: Option<String>,
    pub openings: Option<u32>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub remote: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Job {
    const NAME: &'static str = "job";
    const PATH: &'static str = "jobs";

    fn id(&self) -> &str {
        &self.id
    }
}

impl PipelineItem for Job {
    fn stage_id(&self) -> &str {
        &self.stage_id
    }
}
