use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use thiserror::Error;

use crate::models::auth::AuthProvider;
use crate::models::config::{ServerConfig, SettingsStore};
use crate::services::assets::AssetResolver;
use crate::services::bundle::{AssetBundle, DirBundle};
use crate::services::templates::{TemplateError, TemplateInjector};

pub mod domain;
pub mod dto;
pub mod models;
pub mod routes;
pub mod services;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SettingsStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub resolver: AssetResolver,
    pub injector: Arc<TemplateInjector>,
}

impl AppState {
    /// Compiles every templated asset of `bundle`; fails on packaging faults.
    pub fn new(
        settings: Arc<SettingsStore>,
        auth: Arc<dyn AuthProvider>,
        bundle: Arc<dyn AssetBundle>,
    ) -> Result<Self, TemplateError> {
        let injector = TemplateInjector::compile(bundle.as_ref())?;
        Ok(Self {
            settings,
            auth,
            resolver: AssetResolver::new(bundle),
            injector: Arc::new(injector),
        })
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid templated asset")]
    Templates(#[from] TemplateError),
    #[error("server failed")]
    Io(#[from] std::io::Error),
}

pub async fn run(server_config: ServerConfig) -> Result<(), StartupError> {
    let bundle = DirBundle::new(&server_config.bundle_dir);
    log::info!("Serving front-end bundle from {:?}", bundle.root());

    let state = AppState::new(
        Arc::new(SettingsStore::new(server_config.settings())),
        server_config.auth_provider(),
        Arc::new(bundle),
    )?;
    let state = web::Data::new(state);
    let mount = server_config.mount_path();

    let bind_address = (server_config.address.as_str(), server_config.port);
    log::info!(
        "Listening on {}:{} under '{}/'",
        bind_address.0,
        bind_address.1,
        mount
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(web::scope(&mount).configure(routes::configure))
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
