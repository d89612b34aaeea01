use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::imagenes::model::ImagenHuerfana,
    routes::servicio::model::ServicioComercio,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{ActualizarOpcionRequest, CrearOpcionRequest, OpcionServicio};

#[axum::debug_handler]
pub async fn list_opciones_por_servicio(
    State(state): State<AppState>,
    Path(id_servicio): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<OpcionServicio>>>), AppError> {
    let opciones = OpcionServicio::list_by_servicio(&state.pool, &id_servicio).await?;
    Ok((StatusCode::OK, success_to_api_response(opciones)))
}

#[axum::debug_handler]
pub async fn get_opcion(
    State(state): State<AppState>,
    Path(id_opcion_servicio): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<OpcionServicio>>), AppError> {
    let opcion = OpcionServicio::find_by_id(&state.pool, &id_opcion_servicio)
        .await?
        .ok_or_else(|| AppError::NotFound("Opción de servicio no encontrada".to_string()))?;
    Ok((StatusCode::OK, success_to_api_response(opcion)))
}

#[axum::debug_handler]
pub async fn create_opcion(
    State(state): State<AppState>,
    Json(req): Json<CrearOpcionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OpcionServicio>>), AppError> {
    if ServicioComercio::find_by_id(&state.pool, &req.id_servicio).await?.is_none() {
        return Err(AppError::NotFound("Servicio no encontrado".to_string()));
    }

    if OpcionServicio::name_taken(&state.pool, &req.id_servicio, &req.nombre_opcion, None).await? {
        return Err(AppError::Conflict(format!(
            "Ya existe una opción con el nombre '{}' para este servicio",
            req.nombre_opcion
        )));
    }

    let id_opcion_servicio = Uuid::new_v4().to_string();
    let opcion = OpcionServicio::create(&state.pool, &id_opcion_servicio, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(opcion)))
}

#[axum::debug_handler]
pub async fn update_opcion(
    State(state): State<AppState>,
    Path(id_opcion_servicio): Path<String>,
    Json(req): Json<ActualizarOpcionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OpcionServicio>>), AppError> {
    let opcion = OpcionServicio::find_by_id(&state.pool, &id_opcion_servicio)
        .await?
        .ok_or_else(|| AppError::NotFound("Opción de servicio no encontrada".to_string()))?;

    if let Some(nombre) = &req.nombre_opcion {
        if OpcionServicio::name_taken(
            &state.pool,
            &opcion.id_servicio,
            nombre,
            Some(&id_opcion_servicio),
        )
        .await?
        {
            return Err(AppError::Conflict(format!(
                "Ya existe una opción con el nombre '{nombre}' para este servicio"
            )));
        }
    }

    let opcion = OpcionServicio::update(&state.pool, &id_opcion_servicio, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(opcion)))
}

/// Deletes an opción. Its hosted images are removed best effort before
/// the row delete; failures are recorded, never surfaced.
#[axum::debug_handler]
pub async fn delete_opcion(
    State(state): State<AppState>,
    Path(id_opcion_servicio): Path<String>,
) -> Result<StatusCode, AppError> {
    let opcion = OpcionServicio::find_by_id(&state.pool, &id_opcion_servicio)
        .await?
        .ok_or_else(|| AppError::NotFound("Opción de servicio no encontrada".to_string()))?;

    let urls = opcion.collect_image_urls(&state.pool).await?;
    let outcome = state.images.delete_images(urls).await;
    ImagenHuerfana::record_many(&state.pool, &outcome.failed, "delete opcion").await?;

    OpcionServicio::delete(&state.pool, &id_opcion_servicio).await?;

    tracing::info!(
        "opción {} ({}) eliminada: imágenes remotas {}/{}",
        opcion.nombre_opcion,
        id_opcion_servicio,
        outcome.succeeded,
        outcome.total,
    );

    Ok(StatusCode::NO_CONTENT)
}
