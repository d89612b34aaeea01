use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    routes::imagenes::model::ImagenHuerfana,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    ActualizarServicioComunidadRequest, CrearServicioComunidadRequest, ServicioComunidad,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub activos: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[axum::debug_handler]
pub async fn list_servicios_comunidad(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ServicioComunidad>>>), AppError> {
    let servicios = ServicioComunidad::list(
        &state.pool,
        query.activos,
        query.skip.unwrap_or(0).max(0),
        query.limit.unwrap_or(100).clamp(1, 100),
    )
    .await?;
    Ok((StatusCode::OK, success_to_api_response(servicios)))
}

#[axum::debug_handler]
pub async fn get_servicio_comunidad(
    State(state): State<AppState>,
    Path(id_servicio_comunidad): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<ServicioComunidad>>), AppError> {
    let servicio = ServicioComunidad::find_by_id(&state.pool, &id_servicio_comunidad)
        .await?
        .ok_or_else(|| AppError::NotFound("Servicio de comunidad no encontrado".to_string()))?;
    Ok((StatusCode::OK, success_to_api_response(servicio)))
}

#[axum::debug_handler]
pub async fn create_servicio_comunidad(
    State(state): State<AppState>,
    Json(req): Json<CrearServicioComunidadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServicioComunidad>>), AppError> {
    let id_servicio_comunidad = Uuid::new_v4().to_string();
    let servicio = ServicioComunidad::create(&state.pool, &id_servicio_comunidad, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(servicio)))
}

#[axum::debug_handler]
pub async fn update_servicio_comunidad(
    State(state): State<AppState>,
    Path(id_servicio_comunidad): Path<String>,
    Json(req): Json<ActualizarServicioComunidadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServicioComunidad>>), AppError> {
    if ServicioComunidad::find_by_id(&state.pool, &id_servicio_comunidad).await?.is_none() {
        return Err(AppError::NotFound(
            "Servicio de comunidad no encontrado".to_string(),
        ));
    }

    let servicio = ServicioComunidad::update(&state.pool, &id_servicio_comunidad, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(servicio)))
}

#[axum::debug_handler]
pub async fn delete_servicio_comunidad(
    State(state): State<AppState>,
    Path(id_servicio_comunidad): Path<String>,
) -> Result<StatusCode, AppError> {
    let servicio = ServicioComunidad::find_by_id(&state.pool, &id_servicio_comunidad)
        .await?
        .ok_or_else(|| AppError::NotFound("Servicio de comunidad no encontrado".to_string()))?;

    let urls = servicio.collect_image_urls(&state.pool).await?;
    let outcome = state.images.delete_images(urls).await;
    ImagenHuerfana::record_many(&state.pool, &outcome.failed, "delete servicio comunidad").await?;

    ServicioComunidad::delete(&state.pool, &id_servicio_comunidad).await?;

    tracing::info!(
        "servicio de comunidad {} eliminado: imágenes remotas {}/{}",
        id_servicio_comunidad,
        outcome.succeeded,
        outcome.total,
    );

    Ok(StatusCode::NO_CONTENT)
}
