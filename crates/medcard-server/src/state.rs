use crate::service::PatientService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PatientService>,
}

impl AppState {
    pub fn new(service: PatientService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
