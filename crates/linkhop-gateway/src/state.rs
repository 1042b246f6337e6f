use std::sync::Arc;

use linkhop_cache::ConfiguredCache;
use linkhop_generator::RandomGenerator;
use linkhop_repository::Repository;

pub type GatewayRepository = Repository<ConfiguredCache, RandomGenerator>;

#[derive(Clone)]
pub struct AppState {
    repository: Arc<GatewayRepository>,
    scheme: String,
    public_host: String,
}

impl AppState {
    pub fn new(
        repository: Arc<GatewayRepository>,
        scheme: impl Into<String>,
        public_host: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            scheme: scheme.into(),
            public_host: public_host.into(),
        }
    }

    pub fn repository(&self) -> &GatewayRepository {
        &self.repository
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn public_host(&self) -> &str {
        &self.public_host
    }
}
