use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{AppState, error::AppError, utils::{ApiResponse, success_to_api_response}};

use super::model::{ActualizarCategoriaRequest, CategoriaComercio, CrearCategoriaRequest};

#[axum::debug_handler]
pub async fn list_categorias(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<CategoriaComercio>>>), AppError> {
    let categorias = CategoriaComercio::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(categorias)))
}

#[axum::debug_handler]
pub async fn get_categoria(
    State(state): State<AppState>,
    Path(id_categoria): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<CategoriaComercio>>), AppError> {
    let categoria = CategoriaComercio::find_by_id(&state.pool, id_categoria)
        .await?
        .ok_or_else(|| AppError::NotFound("Categoría no encontrada".to_string()))?;
    Ok((StatusCode::OK, success_to_api_response(categoria)))
}

#[axum::debug_handler]
pub async fn create_categoria(
    State(state): State<AppState>,
    Json(req): Json<CrearCategoriaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoriaComercio>>), AppError> {
    let categoria = CategoriaComercio::create(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(categoria)))
}

#[axum::debug_handler]
pub async fn update_categoria(
    State(state): State<AppState>,
    Path(id_categoria): Path<i32>,
    Json(req): Json<ActualizarCategoriaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoriaComercio>>), AppError> {
    if CategoriaComercio::find_by_id(&state.pool, id_categoria).await?.is_none() {
        return Err(AppError::NotFound("Categoría no encontrada".to_string()));
    }

    let categoria = CategoriaComercio::update(&state.pool, id_categoria, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(categoria)))
}

#[axum::debug_handler]
pub async fn delete_categoria(
    State(state): State<AppState>,
    Path(id_categoria): Path<i32>,
) -> Result<StatusCode, AppError> {
    let deleted = CategoriaComercio::delete(&state.pool, id_categoria).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Categoría no encontrada".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
