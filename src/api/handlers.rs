use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        rejection::HostRejection,
        Host, Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::models::token::{is_base10_integer, Token};
use crate::store::image_store::{ImageStore, StoredImage};
use crate::store::token_store::TokenEntry;
use crate::AppState;

// ── Multipart form ───────────────────────────────────────────

/// Fields of a registration form. The first occurrence of each field wins.
#[derive(Default)]
struct RegisterForm {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    external_url: Option<String>,
    image: Option<StoredImage>,
    /// Storage failure for the image part, reported only once the id is known to be valid.
    image_error: Option<AppError>,
}

impl RegisterForm {
    /// Remove an image that was written for a request that is being rejected.
    async fn discard_image(&mut self, images: &ImageStore) {
        if let Some(image) = self.image.take() {
            if let Err(e) = images.remove(&image.file_name).await {
                tracing::warn!(file = %image.file_name, error = %e, "failed to remove rejected upload");
            }
        }
    }
}

async fn read_form(
    images: &ImageStore,
    multipart: &mut Multipart,
    form: &mut RegisterForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(form_error)?
    {
        let name = field.name().unwrap_or_default().to_string();

        // Parts carrying a filename are files, everything else is a plain value.
        if let Some(file_name) = field.file_name().map(str::to_string) {
            if name != "image" || form.image.is_some() || form.image_error.is_some() {
                continue;
            }
            if form.id.as_deref().is_some_and(|id| !is_base10_integer(id)) {
                return Err(invalid_id());
            }
            match store_image(images, &file_name, field).await {
                Ok(image) => form.image = Some(image),
                Err(e @ (AppError::Io(_) | AppError::Internal(_))) => form.image_error = Some(e),
                Err(e) => return Err(e),
            }
            continue;
        }

        let slot = match name.as_str() {
            "id" => &mut form.id,
            "name" => &mut form.name,
            "description" => &mut form.description,
            "external_url" => &mut form.external_url,
            _ => continue,
        };
        if slot.is_none() {
            let value = field.text().await.map_err(form_error)?;
            *slot = Some(value);
        }
    }
    Ok(())
}

fn invalid_id() -> AppError {
    AppError::InvalidArgument("failed to parse id".into())
}

fn form_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::InvalidArgument(format!("failed to parse form: {}", e.body_text()))
    }
}

/// Stream an uploaded file part to disk.
async fn store_image(
    images: &ImageStore,
    original_filename: &str,
    mut field: Field<'_>,
) -> Result<StoredImage, AppError> {
    let mut writer = images.create(original_filename).await?;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "image upload interrupted");
                writer.discard().await;
                return Err(match form_error(e) {
                    AppError::PayloadTooLarge => AppError::PayloadTooLarge,
                    _ => AppError::InvalidArgument("failed to open file".into()),
                });
            }
        };
        if let Err(e) = writer.write_chunk(&chunk).await {
            writer.discard().await;
            return Err(AppError::Io(e));
        }
    }

    Ok(writer.finish().await?)
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /:id — look up a registered token
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Token>, AppError> {
    if !is_base10_integer(&id) {
        return Err(invalid_id());
    }

    state
        .tokens
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("not found".into()))
}

/// POST / — register (or overwrite) a token from a multipart form
pub async fn register_token(
    State(state): State<Arc<AppState>>,
    host: Result<Host, HostRejection>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Token>), AppError> {
    let Host(host) = host.map_err(|e| AppError::InvalidArgument(e.body_text()))?;

    let mut form = RegisterForm::default();
    if let Err(e) = read_form(&state.images, &mut multipart, &mut form).await {
        form.discard_image(&state.images).await;
        return Err(e);
    }

    let id = form.id.take().unwrap_or_default();
    if !is_base10_integer(&id) {
        form.discard_image(&state.images).await;
        return Err(invalid_id());
    }
    if let Some(e) = form.image_error.take() {
        return Err(e);
    }
    let Some(image) = form.image.take() else {
        return Err(AppError::InvalidArgument("missing file".into()));
    };

    let token = Token {
        id,
        name: form.name.unwrap_or_default(),
        description: form.description.unwrap_or_default(),
        external_url: form.external_url.unwrap_or_default(),
        image: format!("https://{}/{}", host, image.url_path()),
    };

    let replaced = state.tokens.upsert(TokenEntry {
        token: token.clone(),
        image_file: image.file_name.clone(),
    });

    tracing::info!(
        token_id = %token.id,
        image = %image.file_name,
        bytes = image.size,
        replaced = replaced.is_some(),
        "token registered"
    );

    if let Some(previous) = replaced {
        release_replaced_image(&state, &previous).await;
    }

    Ok((StatusCode::CREATED, Json(token)))
}

/// Handle the image of an overwritten registration. It stays on disk
/// unless pruning is enabled.
async fn release_replaced_image(state: &AppState, previous: &TokenEntry) {
    if !state.config.prune_replaced_images {
        tracing::debug!(
            token_id = %previous.token.id,
            image = %previous.image_file,
            "replaced image left on disk"
        );
        return;
    }

    match state.images.remove(&previous.image_file).await {
        Ok(()) => tracing::debug!(image = %previous.image_file, "pruned replaced image"),
        Err(e) => tracing::warn!(
            image = %previous.image_file,
            error = %e,
            "failed to prune replaced image"
        ),
    }
}
