use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::categoria::model::CategoriaComercio,
    routes::imagenes::model::ImagenHuerfana,
    utils::{ApiResponse, Claims, success_to_api_response},
};

use super::model::{ActualizarComercioRequest, Comercio, CrearComercioRequest};

#[axum::debug_handler]
pub async fn list_comercios(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Comercio>>>), AppError> {
    let comercios = Comercio::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(comercios)))
}

#[axum::debug_handler]
pub async fn get_comercio(
    State(state): State<AppState>,
    Path(id_comercio): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<Comercio>>), AppError> {
    let comercio = Comercio::find_by_id(&state.pool, &id_comercio)
        .await?
        .ok_or_else(|| AppError::NotFound("Comercio no encontrado".to_string()))?;
    Ok((StatusCode::OK, success_to_api_response(comercio)))
}

/// Businesses owned by the authenticated user.
#[axum::debug_handler]
pub async fn mis_comercios(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Comercio>>>), AppError> {
    let comercios = Comercio::list_by_owner(&state.pool, &claims.sub).await?;
    if comercios.is_empty() {
        return Err(AppError::NotFound("Comercio no encontrado".to_string()));
    }
    Ok((StatusCode::OK, success_to_api_response(comercios)))
}

#[axum::debug_handler]
pub async fn create_comercio(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CrearComercioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comercio>>), AppError> {
    if req.id_usuario != claims.sub {
        return Err(AppError::Forbidden(
            "No tienes permiso para crear comercios para otro usuario".to_string(),
        ));
    }

    if CategoriaComercio::find_by_id(&state.pool, req.id_categoria).await?.is_none() {
        return Err(AppError::NotFound("Categoría no encontrada".to_string()));
    }

    if Comercio::name_taken(&state.pool, &req.id_usuario, &req.nombre_comercio, None).await? {
        return Err(AppError::Conflict(
            "Ya existe un comercio con este nombre para tu cuenta".to_string(),
        ));
    }

    let id_comercio = Uuid::new_v4().to_string();
    let comercio = Comercio::create(&state.pool, &id_comercio, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(comercio)))
}

#[axum::debug_handler]
pub async fn update_comercio(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id_comercio): Path<String>,
    Json(req): Json<ActualizarComercioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comercio>>), AppError> {
    let comercio = Comercio::find_by_id(&state.pool, &id_comercio)
        .await?
        .ok_or_else(|| AppError::NotFound("Comercio no encontrado".to_string()))?;

    if comercio.id_usuario != claims.sub {
        return Err(AppError::Forbidden(
            "No tienes permiso para modificar este comercio".to_string(),
        ));
    }

    if let Some(nombre) = &req.nombre_comercio {
        if Comercio::name_taken(&state.pool, &comercio.id_usuario, nombre, Some(&id_comercio))
            .await?
        {
            return Err(AppError::Conflict(
                "Ya existe un comercio con este nombre en tu cuenta".to_string(),
            ));
        }
    }

    let comercio = Comercio::update(&state.pool, &id_comercio, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(comercio)))
}

/// Deletes a business and its whole subtree. Hosted images are removed
/// from the external provider first, best effort: a provider outage
/// never blocks the row delete, the leftovers land in the orphan table
/// for later reconciliation.
#[axum::debug_handler]
pub async fn delete_comercio(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id_comercio): Path<String>,
) -> Result<StatusCode, AppError> {
    let comercio = Comercio::find_by_id(&state.pool, &id_comercio)
        .await?
        .ok_or_else(|| AppError::NotFound("Comercio no encontrado".to_string()))?;

    if comercio.id_usuario != claims.sub {
        return Err(AppError::Forbidden(
            "No tienes permiso para eliminar este comercio".to_string(),
        ));
    }

    let subtree = comercio.collect_subtree_images(&state.pool).await?;
    let outcome = state.images.delete_images(subtree.urls).await;
    ImagenHuerfana::record_many(&state.pool, &outcome.failed, "delete comercio").await?;

    // children rows go with the parent through the FK cascade
    Comercio::delete(&state.pool, &id_comercio).await?;

    tracing::info!(
        "comercio {} ({}) eliminado: {} servicios, {} opciones, imágenes remotas {}/{}",
        comercio.nombre_comercio,
        id_comercio,
        subtree.servicios,
        subtree.opciones,
        outcome.succeeded,
        outcome.total,
    );

    Ok(StatusCode::NO_CONTENT)
}
