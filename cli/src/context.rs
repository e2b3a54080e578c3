//! Dependency wiring: configuration in, use cases out.

use anyhow::{Context, Result};
use gaia_application::{
    CacheMode, DetectRoleUseCase, DetectionCache, Endpoint, LlmGateway, ResponseCache,
    RoleCatalog, RunAskUseCase, RunOperatorUseCase, RunToolActionUseCase, ToolRegistry,
};
use gaia_infrastructure::{
    ConfigLoader, FileCache, FileConfig, ProcessActionLauncher, ShellCommandRunner, gateway_for,
};
use gaia_presentation::{Cli, ConsoleFormatter, InteractiveConfirmation};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Everything a command needs, built once from the CLI flags and the
/// layered configuration.
pub struct AppContext {
    pub config: FileConfig,
    pub endpoint: Endpoint,
    pub gateway: Arc<dyn LlmGateway>,
    pub roles: RoleCatalog,
    pub cache_mode: CacheMode,
    cache: Option<Arc<FileCache>>,
    cancel: CancellationToken,
}

impl AppContext {
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = ConfigLoader::load(cli.config.as_deref())
            .context("failed to load configuration")?;
        for issue in config.validate() {
            eprintln!("{}", ConsoleFormatter::warning(&format!("config {}", issue)));
        }
        apply_overrides(&mut config, cli);

        let (gateway, endpoint) = gateway_for(&config.provider.to_endpoint());
        debug!(
            provider = gateway.provider_name(),
            host = %endpoint.host,
            port = endpoint.port,
            model = %endpoint.model,
            "Provider selected"
        );

        let shell = std::env::var("SHELL").unwrap_or_else(|_| "sh".to_string());
        let roles = config.to_role_catalog(&shell, std::env::consts::OS);

        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(FileCache::new(config.cache.resolved_dir())));

        Ok(Self {
            config,
            endpoint,
            gateway,
            roles,
            cache_mode: CacheMode::from_flags(cli.no_cache, cli.refresh_cache),
            cache,
            cancel: CancellationToken::new(),
        })
    }

    /// Cancel in-flight work on Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let token = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    fn response_cache(&self) -> Option<Arc<dyn ResponseCache>> {
        self.cache
            .clone()
            .map(|cache| cache as Arc<dyn ResponseCache>)
    }

    /// Detection results are cached unless `--no-cache`; `--refresh-cache`
    /// only affects responses.
    fn detection_cache(&self) -> Option<Arc<dyn DetectionCache>> {
        if self.cache_mode == CacheMode::Bypass {
            return None;
        }
        self.cache
            .clone()
            .map(|cache| cache as Arc<dyn DetectionCache>)
    }

    pub fn detect_role_use_case(&self) -> DetectRoleUseCase {
        let settings = self.config.to_detection_settings(&self.roles);
        let detector =
            DetectRoleUseCase::new(self.gateway.clone(), &self.endpoint.model, settings);
        match self.detection_cache() {
            Some(cache) => detector.with_cache(cache),
            None => detector,
        }
    }

    pub fn ask_use_case(&self) -> RunAskUseCase {
        let use_case = RunAskUseCase::new(
            self.gateway.clone(),
            self.endpoint.clone(),
            self.roles.clone(),
            self.detect_role_use_case(),
        )
        .with_cancellation(self.cancel.clone());
        match self.response_cache() {
            Some(cache) => use_case.with_cache(cache),
            None => use_case,
        }
    }

    fn command_runner(&self) -> Arc<ShellCommandRunner> {
        Arc::new(ShellCommandRunner::new().with_timeout(self.config.operator.command_timeout()))
    }

    pub fn operator_use_case(&self) -> RunOperatorUseCase {
        let registry = Arc::new(ToolRegistry::with_defaults(self.command_runner()));
        RunOperatorUseCase::new(self.gateway.clone(), registry, &self.endpoint.model)
            .with_confirmation(Arc::new(InteractiveConfirmation::new()))
            .with_cancellation(self.cancel.clone())
    }

    pub fn tool_action_use_case(&self) -> RunToolActionUseCase {
        RunToolActionUseCase::new(
            Arc::new(self.ask_use_case()),
            self.command_runner(),
            Arc::new(ProcessActionLauncher::new()),
        )
        .with_confirmation(Arc::new(InteractiveConfirmation::new()))
        .with_cancellation(self.cancel.clone())
    }
}

/// `--model`, `--host` and `--port` win over every config layer.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(host) = &cli.host {
        config.provider.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.provider.port = port;
    }
}
