use std::sync::Arc;

use onboarding_infra::{
    DispatchError, InMemoryRecordStore, OnboardingRequest, OnboardingResponse,
    PostgresRecordStore, RequestContext, RequestDispatcher, StoreError, config::StoreConfig,
};

type InMemoryDispatcher = RequestDispatcher<Arc<InMemoryRecordStore>>;
type PersistentDispatcher = RequestDispatcher<Arc<PostgresRecordStore>>;

/// The dispatcher the routes talk to, over whichever store was configured.
#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory {
        dispatcher: Arc<InMemoryDispatcher>,
    },
    Persistent {
        dispatcher: Arc<PersistentDispatcher>,
    },
}

impl AppServices {
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        request: OnboardingRequest,
    ) -> Result<OnboardingResponse, DispatchError> {
        match self {
            AppServices::InMemory { dispatcher } => dispatcher.dispatch(ctx, request).await,
            AppServices::Persistent { dispatcher } => dispatcher.dispatch(ctx, request).await,
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            AppServices::InMemory { .. } => "in_memory",
            AppServices::Persistent { .. } => "postgres",
        }
    }
}

pub async fn build_services(config: StoreConfig) -> Result<AppServices, StoreError> {
    let services = match config {
        StoreConfig::InMemory => build_in_memory_services(),
        StoreConfig::Postgres { database_url } => build_persistent_services(&database_url).await?,
    };
    tracing::info!(backend = services.backend(), "record store ready");
    Ok(services)
}

pub fn build_in_memory_services() -> AppServices {
    let dispatcher = Arc::new(RequestDispatcher::new(Arc::new(InMemoryRecordStore::new())));
    AppServices::InMemory { dispatcher }
}

async fn build_persistent_services(database_url: &str) -> Result<AppServices, StoreError> {
    let store = PostgresRecordStore::connect(database_url).await?;
    store.ensure_schema().await?;
    let dispatcher = Arc::new(RequestDispatcher::new(Arc::new(store)));
    Ok(AppServices::Persistent { dispatcher })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_services_dispatch_through_the_dispatcher_alone() {
        let services = build_services(StoreConfig::InMemory).await.unwrap();
        assert_eq!(services.backend(), "in_memory");

        let response = services
            .dispatch(&RequestContext::new(), OnboardingRequest::List)
            .await
            .unwrap();
        assert_eq!(response, OnboardingResponse::Records(Vec::new()));
    }
}
