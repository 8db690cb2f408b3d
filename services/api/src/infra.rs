use lead_intake::config::StorageConfig;
use lead_intake::intake::{
    InMemoryLeadRepository, JsonlLeadRepository, LeadIntakeService, LeadRecord, LeadRepository,
    NewLead, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store chosen at startup from configuration.
#[derive(Debug)]
pub(crate) enum LeadStore {
    Memory(InMemoryLeadRepository),
    Jsonl(JsonlLeadRepository),
}

impl LeadStore {
    pub(crate) fn from_config(config: &StorageConfig) -> Result<Self, RepositoryError> {
        match &config.path {
            Some(path) => {
                let repository = JsonlLeadRepository::open(path)?;
                info!(path = %path.display(), "persisting leads to JSON-lines store");
                Ok(Self::Jsonl(repository))
            }
            None => {
                info!("persisting leads in memory only");
                Ok(Self::Memory(InMemoryLeadRepository::default()))
            }
        }
    }
}

impl LeadRepository for LeadStore {
    fn insert(&self, lead: NewLead) -> Result<LeadRecord, RepositoryError> {
        match self {
            Self::Memory(repository) => repository.insert(lead),
            Self::Jsonl(repository) => repository.insert(lead),
        }
    }

    fn select_all(&self) -> Result<Vec<LeadRecord>, RepositoryError> {
        match self {
            Self::Memory(repository) => repository.select_all(),
            Self::Jsonl(repository) => repository.select_all(),
        }
    }
}

pub(crate) fn build_intake_service(
    config: &StorageConfig,
) -> Result<Arc<LeadIntakeService<LeadStore>>, RepositoryError> {
    let store = Arc::new(LeadStore::from_config(config)?);
    Ok(Arc::new(LeadIntakeService::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_intake::intake::LeadSubmission;

    fn submission() -> LeadSubmission {
        LeadSubmission {
            requester_role: Some("self".to_string()),
            level: Some("licence".to_string()),
            needs: Some(vec!["support".to_string()]),
            modality: Some("online".to_string()),
            weekly_hours: Some("3h".to_string()),
            goal: Some("short-term".to_string()),
            availability: Some("Week-end".to_string()),
            message: None,
        }
    }

    #[test]
    fn memory_store_is_the_default() {
        let store = LeadStore::from_config(&StorageConfig::default()).expect("store builds");
        assert!(matches!(store, LeadStore::Memory(_)));
    }

    #[test]
    fn configured_path_selects_the_jsonl_store() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let config = StorageConfig {
            path: Some(temp.path().join("leads.jsonl")),
        };

        let service = build_intake_service(&config).expect("service builds");
        let record = service.submit(submission()).expect("lead persists");

        let reopened = LeadStore::from_config(&config).expect("store reopens");
        assert!(matches!(reopened, LeadStore::Jsonl(_)));
        let listed = reopened.select_all().expect("select succeeds");
        assert_eq!(listed, vec![record]);
    }
}
