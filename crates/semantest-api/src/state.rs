//! Application state wiring the engine to its SQLite infrastructure.
//!
//! AppState holds the concrete service instance used by the CLI commands.
//! The service is generic over repository/executor/selector traits, but
//! AppState pins it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use semantest_core::execution::executor::{ElementExecutor, ExecutorResponse};
use semantest_core::selection::selector::{ElementSelection, ElementSelector};
use semantest_core::service::automation::AutomationService;
use semantest_infra::config::{load_engine_config, resolve_data_dir};
use semantest_infra::sqlite::pattern::SqlitePatternRepository;
use semantest_infra::sqlite::pool::DatabasePool;
use semantest_infra::sqlite::training::SqliteTrainingSessionRepository;
use semantest_types::config::EngineConfig;
use semantest_types::error::SelectionError;
use semantest_types::request::{ActionPayload, AutomationRequest, MessageType};

/// Concrete service type with the executor and selector generics erased at
/// construction time.
pub type ConcreteAutomationService =
    AutomationService<SqlitePatternRepository, SqliteTrainingSessionRepository>;

/// Executor used when no browser is attached. Every action fails in-band,
/// so a request routed through the CLI process resolves with a failure
/// disposition instead of wedging the pipeline.
struct DetachedExecutor;

impl ElementExecutor for DetachedExecutor {
    async fn execute(
        &self,
        _selector: &str,
        _message_type: MessageType,
        _payload: &ActionPayload,
    ) -> ExecutorResponse {
        ExecutorResponse::failed("no browser connected")
    }
}

/// Selection counterpart of [`DetachedExecutor`].
struct DetachedSelector;

impl ElementSelector for DetachedSelector {
    async fn request_selection(
        &self,
        _request: &AutomationRequest,
    ) -> Result<ElementSelection, SelectionError> {
        Err(SelectionError::Unavailable(
            "no browser connected".to_string(),
        ))
    }
}

/// Shared application state holding the wired service.
#[derive(Clone)]
pub struct AppState {
    pub automation_service: Arc<ConcreteAutomationService>,
    pub config: EngineConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire the
    /// service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_engine_config(&data_dir).await;
        tracing::debug!(path = %data_dir.display(), "Resolved data directory");

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("semantest.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        let patterns = SqlitePatternRepository::new(
            db_pool.clone(),
            config.confidence.clone(),
            config.cleanup.clone(),
        );
        let sessions = SqliteTrainingSessionRepository::new(db_pool);

        let automation_service = AutomationService::new(
            patterns,
            sessions,
            DetachedExecutor,
            DetachedSelector,
            config.clone(),
        );

        Ok(Self {
            automation_service: Arc::new(automation_service),
            config,
            data_dir,
        })
    }
}
