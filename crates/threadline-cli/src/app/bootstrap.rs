use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use threadline_application::{AuthUseCase, ChatUseCase, LoginFlow};
use threadline_core::auth::OtpService;
use threadline_core::config::AppConfig;
use threadline_core::country::ReferenceDataService;
use threadline_core::storage::BlobStore;
use threadline_core::thread::ThreadStore;
use threadline_infrastructure::{
    BlobSnapshotRepository, ConfigService, FileBlobStore, MemoryBlobStore, MockDeleteService,
    MockOtpService, MockReplyService, MockThreadSource, RestCountriesService,
    StaticCountryService, ThreadlinePaths, TieredCredentialStore,
};

/// Composition root wiring stores, services, and use cases.
pub struct AppBootstrap {
    pub config: AppConfig,
    pub store: Arc<ThreadStore>,
    pub auth: Arc<AuthUseCase>,
    pub chat: ChatUseCase,
    reference: Arc<dyn ReferenceDataService>,
    otp: Arc<dyn OtpService>,
}

impl AppBootstrap {
    /// Loads `config.toml` from `path`, or from the config directory.
    pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
        let service = match path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new()?,
        };
        let config = service
            .get_config()
            .with_context(|| format!("Failed to load {}", service.path().display()))?;
        tracing::debug!("[Bootstrap] Config loaded from {}", service.path().display());
        Ok(config)
    }

    /// Builds the application over the durable file store.
    ///
    /// The session tier lives in memory, so a token stored without
    /// "remember me" ends with the process.
    pub fn new(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let storage_dir = match data_dir {
            Some(dir) => dir.join("storage"),
            None => ThreadlinePaths::storage_dir()?,
        };
        tracing::debug!("[Bootstrap] Storage directory: {}", storage_dir.display());

        Self::assemble(
            config,
            Arc::new(FileBlobStore::new(storage_dir)),
            Arc::new(MemoryBlobStore::new()),
        )
    }

    /// Builds the application with both tiers in memory.
    pub fn in_memory(config: AppConfig) -> Result<Self> {
        Self::assemble(
            config,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(MemoryBlobStore::new()),
        )
    }

    fn assemble(
        config: AppConfig,
        durable: Arc<dyn BlobStore>,
        session: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        let snapshots = Arc::new(BlobSnapshotRepository::new(durable.clone())?);
        let credentials = Arc::new(TieredCredentialStore::new(durable, session));
        let store = Arc::new(ThreadStore::new(snapshots.clone()));

        let auth = Arc::new(AuthUseCase::new(
            store.clone(),
            credentials,
            snapshots,
            &config,
        ));
        let chat = ChatUseCase::new(
            store.clone(),
            Arc::new(MockReplyService::new(config.reply_delay())),
            Arc::new(MockDeleteService::new(config.delete_delay())),
            Arc::new(MockThreadSource::seeded(config.load_delay())),
            &config,
        );

        let reference: Arc<dyn ReferenceDataService> = if config.offline_countries {
            Arc::new(StaticCountryService::default())
        } else {
            Arc::new(RestCountriesService::new(config.countries_endpoint.clone()))
        };
        let otp: Arc<dyn OtpService> = Arc::new(MockOtpService::new(config.otp_delay()));

        Ok(Self {
            config,
            store,
            auth,
            chat,
            reference,
            otp,
        })
    }

    pub fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(
            self.reference.clone(),
            self.otp.clone(),
            self.auth.clone(),
            &self.config,
        )
    }

    /// Fails unless a session token is present.
    pub fn require_login(&self) -> Result<()> {
        self.auth
            .require_authenticated()
            .context("Run `threadline login` first")?;
        Ok(())
    }
}
