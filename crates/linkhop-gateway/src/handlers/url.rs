use crate::error::{AppError, Result};
use crate::model::{CreateUrlForm, DeleteUrlForm};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use linkhop_core::ShortCode;
use linkhop_repository::RepositoryError;
use tracing::{trace, warn};

/// `POST /new`: answers with the full short link as plain text.
pub async fn create_url_handler(
    State(state): State<AppState>,
    Form(form): Form<CreateUrlForm>,
) -> Result<String> {
    match state.repository().put(&form.long).await {
        Ok(code) => {
            trace!(code = %code, "created short link");
            Ok(code.to_url(state.scheme(), state.public_host()))
        }
        Err(RepositoryError::Validation(_)) => {
            Err(AppError::BadRequest("invalid long url".to_string()))
        }
        Err(e) => {
            warn!(error = %e, "failed to create short link");
            Err(AppError::Internal("generate error"))
        }
    }
}

/// `GET /{code}`: 302 to the long URL. Malformed codes, unknown codes and
/// store outages all look the same to the client.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let Ok(code) = ShortCode::parse(code) else {
        return Err(AppError::NotFound);
    };

    match state.repository().get(&code).await {
        Ok(url) => {
            trace!(code = %code, "short link matched");
            Ok((StatusCode::FOUND, [(header::LOCATION, url.into_string())]).into_response())
        }
        Err(_) => {
            trace!(code = %code, "short link not matched");
            Err(AppError::NotFound)
        }
    }
}

/// `POST /del`: removes a short link, answering `ok`.
pub async fn delete_url_handler(
    State(state): State<AppState>,
    Form(form): Form<DeleteUrlForm>,
) -> Result<&'static str> {
    let code = ShortCode::parse(form.short.trim())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.repository().delete(&code).await.map_err(|e| {
        warn!(code = %code, error = %e, "failed to delete short link");
        AppError::Internal("delete error")
    })?;

    Ok("ok")
}
