use actix_web::{HttpResponse, web};
use log::error;

use crate::AppState;
use crate::dto::RuntimeConfig;
use crate::services::runtime_config::build_runtime_config;
use crate::services::templates::TemplateError;

pub mod main;

/// Register the index and static routes on an app or scope.
///
/// Built with `web::resource` rather than `#[get]` so the index can answer
/// other methods with 404 through `default_service`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["", "/"])
            .route(web::get().to(main::index))
            .default_service(web::to(not_found)),
    )
    .service(web::resource("/static/{tail:.*}").route(web::to(main::static_asset)));
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("404 Not Found")
}

fn server_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("500 Internal Server Error")
}

/// Build the runtime configuration off the async workers.
async fn runtime_config(state: &AppState) -> Option<RuntimeConfig> {
    let settings = state.settings.snapshot();
    let auth = state.auth.clone();

    match web::block(move || build_runtime_config(&settings, auth.as_ref())).await {
        Ok(config) => Some(config),
        Err(e) => {
            error!("Failed to build runtime config: {e}");
            None
        }
    }
}

/// Render a templated asset, or `None` when it is not registered.
fn render_asset(
    state: &AppState,
    name: &str,
    config: &RuntimeConfig,
    content_type: &'static str,
) -> Option<HttpResponse> {
    match state.injector.render(name, config) {
        Ok(body) => Some(HttpResponse::Ok().content_type(content_type).body(body)),
        Err(TemplateError::Unknown(_)) => None,
        Err(e) => {
            error!("Failed to render template {name}: {e:?}");
            Some(server_error())
        }
    }
}
