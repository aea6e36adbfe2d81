use std::io::ErrorKind;
use std::path::PathBuf;

use actix_files::{NamedFile, file_extension_to_mime};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::AppState;
use crate::domain::AssetPath;
use crate::routes::{not_found, render_asset, runtime_config, server_error};
use crate::services::assets::AssetSource;
use crate::services::templates::INDEX_TEMPLATE;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const JS_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let mut response = match runtime_config(&state).await {
        Some(config) => match render_asset(&state, INDEX_TEMPLATE, &config, HTML_CONTENT_TYPE) {
            Some(response) => response,
            None => return not_found().await,
        },
        None => server_error(),
    };

    let headers = response.headers_mut();
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(
        header::X_XSS_PROTECTION,
        header::HeaderValue::from_static("1; mode=block"),
    );
    response
}

pub async fn static_asset(
    req: HttpRequest,
    tail: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let path = match AssetPath::try_from_str(&tail) {
        Ok(path) => path,
        Err(_) => return not_found().await,
    };

    let settings = state.settings.snapshot();
    let resolver = state.resolver.clone();
    let lookup = path.clone();
    let source = match web::block(move || resolver.resolve(&lookup, settings.branding.as_ref()))
        .await
    {
        Ok(Ok(source)) => source,
        Ok(Err(e)) => {
            log::error!("Failed to resolve static asset {path}: {e:?}");
            return server_error();
        }
        Err(e) => {
            log::error!("Static asset lookup aborted for {path}: {e}");
            return server_error();
        }
    };

    match source {
        AssetSource::NotFound => not_found().await,
        AssetSource::Override(file) => serve_override(&req, file).await,
        AssetSource::Bundle(path) if path.is_script() => {
            let Some(config) = runtime_config(&state).await else {
                return server_error();
            };
            match render_asset(&state, path.as_str(), &config, JS_CONTENT_TYPE) {
                Some(response) => response,
                None => not_found().await,
            }
        }
        AssetSource::Bundle(path) => serve_bundle(&state, path).await,
    }
}

async fn serve_override(req: &HttpRequest, file: PathBuf) -> HttpResponse {
    match NamedFile::open_async(&file).await {
        Ok(named) => named.disable_content_disposition().into_response(req),
        Err(e) if e.kind() == ErrorKind::NotFound => not_found().await,
        Err(e) => {
            log::error!("Failed to open override file {file:?}: {e}");
            server_error()
        }
    }
}

async fn serve_bundle(state: &AppState, path: AssetPath) -> HttpResponse {
    let resolver = state.resolver.clone();
    let lookup = path.clone();

    match web::block(move || resolver.read_bundle(&lookup)).await {
        Ok(Ok(Some(bytes))) => HttpResponse::Ok()
            .content_type(file_extension_to_mime(path.extension().unwrap_or_default()))
            .body(bytes),
        Ok(Ok(None)) => not_found().await,
        Ok(Err(e)) => {
            log::error!("Failed to read bundle asset {path}: {e:?}");
            server_error()
        }
        Err(e) => {
            log::error!("Bundle read aborted for {path}: {e}");
            server_error()
        }
    }
}
