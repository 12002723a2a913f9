use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::Config;
use crate::models::{
    ClientInteraction, Comment, Company, Contact, Deal, EmailSequence, Integration, Job,
    Preferences, Task,
};
use crate::pipeline::{PipelineBoard, Registries};
use crate::resources::{CrmHttp, HttpResourceApi, Resource, ResourceApi, ResourceStore};

/// Builds the backend collaborator for each entity type.
pub trait ApiFactory {
    fn api<T: Resource>(&self) -> Arc<dyn ResourceApi<T>>;
}

impl ApiFactory for CrmHttp {
    fn api<T: Resource>(&self) -> Arc<dyn ResourceApi<T>> {
        Arc::new(HttpResourceApi::<T>::new(self.clone()))
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
/// One store per entity type; every handler works against the same collections.
#[derive(Clone)]
pub struct AppState {
    pub registries: Registries,
    pub contacts: ResourceStore<Contact>,
    pub companies: ResourceStore<Company>,
    pub tasks: ResourceStore<Task>,
    pub comments: ResourceStore<Comment>,
    pub interactions: ResourceStore<ClientInteraction>,
    pub sequences: ResourceStore<EmailSequence>,
    pub integrations: ResourceStore<Integration>,
    pub preferences: ResourceStore<Preferences>,
    pub deals: PipelineBoard<Deal>,
    pub jobs: PipelineBoard<Job>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let registries = config.registries()?;
        let http = CrmHttp::new(
            &config.crm_api_url,
            config.crm_api_token.clone(),
            config.crm_api_timeout_secs,
        )?;
        Ok(Self::build(config, registries, &http))
    }

    pub fn build(config: &Config, registries: Registries, factory: &impl ApiFactory) -> Self {
        let drag_ttl = Duration::from_secs(config.drag_session_ttl_secs);
        Self {
            contacts: ResourceStore::new(factory.api()),
            companies: ResourceStore::new(factory.api()),
            tasks: ResourceStore::new(factory.api()),
            comments: ResourceStore::new(factory.api()),
            interactions: ResourceStore::new(factory.api()),
            sequences: ResourceStore::new(factory.api()),
            integrations: ResourceStore::new(factory.api()),
            preferences: ResourceStore::new(factory.api()),
            deals: PipelineBoard::new(
                registries.deals.clone(),
                ResourceStore::new(factory.api()),
            )
            .with_session_ttl(drag_ttl),
            jobs: PipelineBoard::new(registries.jobs.clone(), ResourceStore::new(factory.api()))
                .with_session_ttl(drag_ttl),
            registries,
        }
    }
}

/// Picks the store for `T` out of the state.
pub trait HasStore<T> {
    fn store(&self) -> &ResourceStore<T>;
}

/// Picks the board for `T` out of the state.
pub trait HasBoard<T> {
    fn board(&self) -> &PipelineBoard<T>;
}

macro_rules! store_accessor {
    ($ty:ty, $field:ident) => {
        impl HasStore<$ty> for AppState {
            fn store(&self) -> &ResourceStore<$ty> {
                &self.$field
            }
        }
    };
}

store_accessor!(Contact, contacts);
store_accessor!(Company, companies);
store_accessor!(Task, tasks);
store_accessor!(Comment, comments);
store_accessor!(ClientInteraction, interactions);
store_accessor!(EmailSequence, sequences);
store_accessor!(Integration, integrations);
store_accessor!(Preferences, preferences);

impl HasStore<Deal> for AppState {
    fn store(&self) -> &ResourceStore<Deal> {
        self.deals.store()
    }
}

impl HasStore<Job> for AppState {
    fn store(&self) -> &ResourceStore<Job> {
        self.jobs.store()
    }
}

impl HasBoard<Deal> for AppState {
    fn board(&self) -> &PipelineBoard<Deal> {
        &self.deals
    }
}

impl HasBoard<Job> for AppState {
    fn board(&self) -> &PipelineBoard<Job> {
        &self.jobs
    }
}
