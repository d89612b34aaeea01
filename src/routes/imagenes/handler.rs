use axum::{
    extract::{Extension, Json, Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::comercio::model::Comercio,
    routes::comunidad::model::ServicioComunidad,
    routes::opcion::model::OpcionServicio,
    services::images::{ImageFile, UploadedImage, is_hosted_url, validate_file},
    utils::{ApiResponse, Claims, success_to_api_response},
};

use super::model::{ImagenComercio, ImagenGeneral, ImagenServicio, ImagenServicioComunidad};

#[derive(Debug, Serialize)]
pub struct ImagenSubida {
    pub id_imagen: String,
    pub imagen_url: String,
}

/// Drains a multipart body into memory, validating type and size per
/// file. Rejects an empty body.
async fn read_files(multipart: &mut Multipart) -> Result<Vec<ImageFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Cuerpo multipart inválido: {e}")))?
    {
        if field.file_name().is_none() {
            continue;
        }

        let filename = field.file_name().unwrap_or("archivo").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("No se pudo leer el archivo: {e}")))?
            .to_vec();

        let file = ImageFile {
            filename,
            content_type,
            bytes,
        };
        validate_file(&file)?;
        files.push(file);
    }

    if files.is_empty() {
        return Err(AppError::Validation(
            "No se recibió ningún archivo".to_string(),
        ));
    }
    Ok(files)
}

#[axum::debug_handler]
pub async fn upload_general_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ImagenSubida>>>), AppError> {
    let files = read_files(&mut multipart).await?;
    let uploaded = state.images.upload(files, "general").await?;

    let mut tx = state.pool.begin().await?;
    let mut imagenes = Vec::with_capacity(uploaded.len());
    for UploadedImage { public_id, url } in &uploaded {
        let id_imagen = Uuid::new_v4().to_string();
        let imagen = ImagenGeneral::create(&mut *tx, &id_imagen, url, public_id).await?;
        imagenes.push(ImagenSubida {
            id_imagen: imagen.id_imagen,
            imagen_url: imagen.imagen_url,
        });
    }
    tx.commit().await?;

    Ok((StatusCode::CREATED, success_to_api_response(imagenes)))
}

/// Uploads gallery images for a business the caller owns. A previous
/// hosted cover is removed from the provider first, except the default
/// placeholder.
#[axum::debug_handler]
pub async fn upload_comercio_images(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id_comercio): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ImagenSubida>>>), AppError> {
    let comercio = Comercio::find_by_id(&state.pool, &id_comercio)
        .await?
        .ok_or_else(|| AppError::NotFound("Comercio no encontrado".to_string()))?;

    if comercio.id_usuario != claims.sub {
        return Err(AppError::Forbidden(
            "No tienes permiso para subir imágenes a este comercio".to_string(),
        ));
    }

    let files = read_files(&mut multipart).await?;

    if is_hosted_url(&comercio.imagen_url) && !comercio.imagen_url.contains("placeholder") {
        state.images.delete_image(&comercio.imagen_url).await;
    }

    let folder = format!("comercios/{id_comercio}");
    let uploaded = state.images.upload(files, &folder).await?;

    let mut tx = state.pool.begin().await?;
    let mut imagenes = Vec::with_capacity(uploaded.len());
    for UploadedImage { public_id, url } in &uploaded {
        let id_imagen = Uuid::new_v4().to_string();
        let imagen = ImagenComercio::create(&mut *tx, &id_imagen, &id_comercio, url, public_id).await?;
        imagenes.push(ImagenSubida {
            id_imagen: imagen.id_imagen,
            imagen_url: imagen.imagen_url,
        });
    }
    // the first uploaded image becomes the new cover; the old one was
    // already removed from the provider above
    if let Some(first) = uploaded.first() {
        Comercio::update_cover_url(&mut *tx, &id_comercio, &first.url).await?;
    }
    tx.commit().await?;

    Ok((StatusCode::CREATED, success_to_api_response(imagenes)))
}

#[axum::debug_handler]
pub async fn delete_comercio_image(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id_imagen): Path<String>,
) -> Result<StatusCode, AppError> {
    let imagen = ImagenComercio::find_by_id(&state.pool, &id_imagen)
        .await?
        .ok_or_else(|| AppError::NotFound("Imagen no encontrada".to_string()))?;

    let comercio = Comercio::find_by_id(&state.pool, &imagen.id_comercio).await?;
    match comercio {
        Some(c) if c.id_usuario == claims.sub => {}
        _ => {
            return Err(AppError::Forbidden(
                "No tienes permiso para eliminar esta imagen".to_string(),
            ));
        }
    }

    state.images.delete_image(&imagen.imagen_url).await;
    ImagenComercio::delete(&state.pool, &id_imagen).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn upload_servicio_images(
    State(state): State<AppState>,
    Path(id_opcion_servicio): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ImagenSubida>>>), AppError> {
    if OpcionServicio::find_by_id(&state.pool, &id_opcion_servicio).await?.is_none() {
        return Err(AppError::NotFound(
            "Opción de servicio no encontrada".to_string(),
        ));
    }

    let files = read_files(&mut multipart).await?;
    let folder = format!("servicios/{id_opcion_servicio}");
    let uploaded = state.images.upload(files, &folder).await?;

    let mut tx = state.pool.begin().await?;
    let mut imagenes = Vec::with_capacity(uploaded.len());
    for UploadedImage { public_id, url } in &uploaded {
        let id_imagen = Uuid::new_v4().to_string();
        let imagen =
            ImagenServicio::create(&mut *tx, &id_imagen, &id_opcion_servicio, url, public_id)
                .await?;
        imagenes.push(ImagenSubida {
            id_imagen: imagen.id_imagen,
            imagen_url: imagen.imagen_url,
        });
    }
    tx.commit().await?;

    Ok((StatusCode::CREATED, success_to_api_response(imagenes)))
}

#[axum::debug_handler]
pub async fn delete_servicio_image(
    State(state): State<AppState>,
    Path(id_imagen): Path<String>,
) -> Result<StatusCode, AppError> {
    let imagen = ImagenServicio::find_by_id(&state.pool, &id_imagen)
        .await?
        .ok_or_else(|| AppError::NotFound("Imagen no encontrada".to_string()))?;

    state.images.delete_image(&imagen.imagen_url).await;
    ImagenServicio::delete(&state.pool, &id_imagen).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn upload_comunidad_images(
    State(state): State<AppState>,
    Path(id_servicio_comunidad): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ImagenSubida>>>), AppError> {
    if ServicioComunidad::find_by_id(&state.pool, &id_servicio_comunidad).await?.is_none() {
        return Err(AppError::NotFound(
            "Servicio de comunidad no encontrado".to_string(),
        ));
    }

    let files = read_files(&mut multipart).await?;
    let folder = format!("servicios_comunidad/{id_servicio_comunidad}");
    let uploaded = state.images.upload(files, &folder).await?;

    let mut tx = state.pool.begin().await?;
    let mut imagenes = Vec::with_capacity(uploaded.len());
    for UploadedImage { public_id, url } in &uploaded {
        let id_imagen = Uuid::new_v4().to_string();
        let imagen = ImagenServicioComunidad::create(
            &mut *tx,
            &id_imagen,
            &id_servicio_comunidad,
            url,
            public_id,
        )
        .await?;
        imagenes.push(ImagenSubida {
            id_imagen: imagen.id_imagen,
            imagen_url: imagen.imagen_url,
        });
    }
    tx.commit().await?;

    Ok((StatusCode::CREATED, success_to_api_response(imagenes)))
}

#[axum::debug_handler]
pub async fn delete_comunidad_image(
    State(state): State<AppState>,
    Path(id_imagen): Path<String>,
) -> Result<StatusCode, AppError> {
    let imagen = ImagenServicioComunidad::find_by_id(&state.pool, &id_imagen)
        .await?
        .ok_or_else(|| AppError::NotFound("Imagen no encontrada".to_string()))?;

    state.images.delete_image(&imagen.imagen_url).await;
    ImagenServicioComunidad::delete(&state.pool, &id_imagen).await?;

    Ok(StatusCode::NO_CONTENT)
}
