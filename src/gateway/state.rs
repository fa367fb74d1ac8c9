use std::sync::Arc;

use crate::access::TokenIssuer;
use crate::registry::ServiceRegistry;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceRegistry>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(services: Arc<ServiceRegistry>, tokens: Arc<TokenIssuer>) -> Self {
        Self { services, tokens }
    }
}
