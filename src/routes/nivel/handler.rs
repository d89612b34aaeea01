use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{AppState, error::AppError, utils::{ApiResponse, success_to_api_response}};

use super::model::{CrearNivelRequest, NivelUsuario};

#[axum::debug_handler]
pub async fn list_niveles(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<NivelUsuario>>>), AppError> {
    let niveles = NivelUsuario::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(niveles)))
}

#[axum::debug_handler]
pub async fn get_nivel(
    State(state): State<AppState>,
    Path(id_nvl_usuario): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<NivelUsuario>>), AppError> {
    let nivel = NivelUsuario::find_by_id(&state.pool, id_nvl_usuario)
        .await?
        .ok_or_else(|| AppError::NotFound("Nivel de usuario no encontrado".to_string()))?;
    Ok((StatusCode::OK, success_to_api_response(nivel)))
}

#[axum::debug_handler]
pub async fn create_nivel(
    State(state): State<AppState>,
    Json(req): Json<CrearNivelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NivelUsuario>>), AppError> {
    let nivel = NivelUsuario::create(&state.pool, &req.rol_usuario).await?;
    Ok((StatusCode::CREATED, success_to_api_response(nivel)))
}

#[axum::debug_handler]
pub async fn update_nivel(
    State(state): State<AppState>,
    Path(id_nvl_usuario): Path<i32>,
    Json(req): Json<CrearNivelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NivelUsuario>>), AppError> {
    if NivelUsuario::find_by_id(&state.pool, id_nvl_usuario).await?.is_none() {
        return Err(AppError::NotFound("Nivel de usuario no encontrado".to_string()));
    }

    let nivel = NivelUsuario::update(&state.pool, id_nvl_usuario, &req.rol_usuario).await?;
    Ok((StatusCode::OK, success_to_api_response(nivel)))
}

#[axum::debug_handler]
pub async fn delete_nivel(
    State(state): State<AppState>,
    Path(id_nvl_usuario): Path<i32>,
) -> Result<StatusCode, AppError> {
    let deleted = NivelUsuario::delete(&state.pool, id_nvl_usuario).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Nivel de usuario no encontrado".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
