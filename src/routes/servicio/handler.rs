use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::comercio::model::Comercio,
    routes::imagenes::model::ImagenHuerfana,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{ActualizarServicioRequest, CrearServicioRequest, ServicioComercio};

#[axum::debug_handler]
pub async fn list_servicios_por_comercio(
    State(state): State<AppState>,
    Path(id_comercio): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ServicioComercio>>>), AppError> {
    let servicios = ServicioComercio::list_by_comercio(&state.pool, &id_comercio).await?;
    Ok((StatusCode::OK, success_to_api_response(servicios)))
}

#[axum::debug_handler]
pub async fn get_servicio(
    State(state): State<AppState>,
    Path(id_servicio): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<ServicioComercio>>), AppError> {
    let servicio = ServicioComercio::find_by_id(&state.pool, &id_servicio)
        .await?
        .ok_or_else(|| AppError::NotFound("Servicio no encontrado".to_string()))?;
    Ok((StatusCode::OK, success_to_api_response(servicio)))
}

#[axum::debug_handler]
pub async fn create_servicio(
    State(state): State<AppState>,
    Json(req): Json<CrearServicioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServicioComercio>>), AppError> {
    if Comercio::find_by_id(&state.pool, &req.id_comercio).await?.is_none() {
        return Err(AppError::NotFound("Comercio no encontrado".to_string()));
    }

    let id_servicio = Uuid::new_v4().to_string();
    let servicio = ServicioComercio::create(&state.pool, &id_servicio, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(servicio)))
}

#[axum::debug_handler]
pub async fn update_servicio(
    State(state): State<AppState>,
    Path(id_servicio): Path<String>,
    Json(req): Json<ActualizarServicioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServicioComercio>>), AppError> {
    if ServicioComercio::find_by_id(&state.pool, &id_servicio).await?.is_none() {
        return Err(AppError::NotFound("Servicio no encontrado".to_string()));
    }

    let servicio = ServicioComercio::update(&state.pool, &id_servicio, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(servicio)))
}

/// Deletes a servicio; the hosted images of its opciones are cleaned up
/// from the external provider before the row (and its subtree, via
/// cascade) is removed.
#[axum::debug_handler]
pub async fn delete_servicio(
    State(state): State<AppState>,
    Path(id_servicio): Path<String>,
) -> Result<StatusCode, AppError> {
    let servicio = ServicioComercio::find_by_id(&state.pool, &id_servicio)
        .await?
        .ok_or_else(|| AppError::NotFound("Servicio no encontrado".to_string()))?;

    let urls = servicio.collect_subtree_images(&state.pool).await?;
    let outcome = state.images.delete_images(urls).await;
    ImagenHuerfana::record_many(&state.pool, &outcome.failed, "delete servicio").await?;

    ServicioComercio::delete(&state.pool, &id_servicio).await?;

    tracing::info!(
        "servicio {} ({}) eliminado: imágenes remotas {}/{}",
        servicio.nombre,
        id_servicio,
        outcome.succeeded,
        outcome.total,
    );

    Ok(StatusCode::NO_CONTENT)
}
