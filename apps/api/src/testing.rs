//! In-memory backend used by unit and router tests.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::resources::{ApiError, Patch, Resource, ResourceApi, ScopeParams};
use crate::state::ApiFactory;

pub fn patch(value: Value) -> Patch {
    match value {
        Value::Object(map) => map,
        other => panic!("patch must be a JSON object, got {other}"),
    }
}

pub fn config() -> Config {
    Config {
        crm_api_url: "http://crm.test".to_string(),
        crm_api_token: None,
        crm_api_timeout_secs: 5,
        port: 0,
        rust_log: "debug".to_string(),
        drag_session_ttl_secs: 900,
        deal_stages: None,
        job_stages: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetAll(ScopeParams),
    Create(Patch),
    Update(String, Patch),
    Delete(String),
}

/// Records every call; after `fail_with`, every later call fails.
pub struct InMemoryApi<T> {
    records: Mutex<Vec<Value>>,
    calls: Mutex<Vec<ApiCall>>,
    failure: Mutex<Option<String>>,
    next_id: AtomicU64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InMemoryApi<T> {
    pub fn seeded(records: Vec<Value>) -> Self {
        Self {
            records: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            next_id: AtomicU64::new(1),
            _marker: PhantomData,
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(ApiError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T: Resource> ResourceApi<T> for InMemoryApi<T> {
    async fn get_all(&self, scope: &ScopeParams) -> Result<Vec<T>, ApiError> {
        self.record(ApiCall::GetAll(scope.clone()))?;
        let records = self.records.lock().unwrap().clone();
        records
            .into_iter()
            .map(|r| serde_json::from_value(r).map_err(ApiError::from))
            .collect()
    }

    async fn create(&self, patch: &Patch) -> Result<T, ApiError> {
        self.record(ApiCall::Create(patch.clone()))?;
        let mut record = patch.clone();
        let id = format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        record.insert("id".to_string(), Value::String(id));
        let record = Value::Object(record);
        let created = serde_json::from_value(record.clone())?;
        self.records.lock().unwrap().push(record);
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &Patch) -> Result<T, ApiError> {
        self.record(ApiCall::Update(id.to_string(), patch.clone()))?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r["id"] == id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: format!("{} {id} not found", T::NAME),
            })?;
        if let Value::Object(fields) = record {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(record.clone())?)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.record(ApiCall::Delete(id.to_string()))?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r["id"] != id);
        if records.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: format!("{} {id} not found", T::NAME),
            });
        }
        Ok(())
    }
}

/// Hands out in-memory backends seeded per collection path.
#[derive(Default)]
pub struct InMemoryFactory {
    pub seeds: HashMap<&'static str, Vec<Value>>,
    pub failing: HashSet<&'static str>,
}

impl InMemoryFactory {
    pub fn seed(mut self, path: &'static str, records: Vec<Value>) -> Self {
        self.seeds.insert(path, records);
        self
    }

    pub fn failing(mut self, path: &'static str) -> Self {
        self.failing.insert(path);
        self
    }
}

impl ApiFactory for InMemoryFactory {
    fn api<T: Resource>(&self) -> Arc<dyn ResourceApi<T>> {
        let api = InMemoryApi::<T>::seeded(self.seeds.get(T::PATH).cloned().unwrap_or_default());
        if self.failing.contains(T::PATH) {
            api.fail_with("network down");
        }
        Arc::new(api)
    }
}
