use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    ActualizarAsesorRequest, ActualizarBrigadistaRequest, ActualizarCarreraRequest, AsesorSs,
    Brigadista, Carrera, CrearAsesorRequest, CrearBrigadistaRequest, CrearCarreraRequest,
};

#[axum::debug_handler]
pub async fn list_asesores(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<AsesorSs>>>), AppError> {
    let asesores = AsesorSs::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(asesores)))
}

#[axum::debug_handler]
pub async fn create_asesor(
    State(state): State<AppState>,
    Json(req): Json<CrearAsesorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AsesorSs>>), AppError> {
    if AsesorSs::name_taken(&state.pool, &req.nombre_asesor, None).await? {
        return Err(AppError::Conflict(
            "Ya existe un asesor con ese nombre".to_string(),
        ));
    }

    let id_asesor = Uuid::new_v4().to_string();
    let asesor = AsesorSs::create(&state.pool, &id_asesor, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(asesor)))
}

#[axum::debug_handler]
pub async fn update_asesor(
    State(state): State<AppState>,
    Path(id_asesor): Path<String>,
    Json(req): Json<ActualizarAsesorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AsesorSs>>), AppError> {
    if AsesorSs::find_by_id(&state.pool, &id_asesor).await?.is_none() {
        return Err(AppError::NotFound("Asesor no encontrado".to_string()));
    }

    if let Some(nombre) = &req.nombre_asesor {
        if AsesorSs::name_taken(&state.pool, nombre, Some(&id_asesor)).await? {
            return Err(AppError::Conflict(
                "Ya existe un asesor con ese nombre".to_string(),
            ));
        }
    }

    let asesor = AsesorSs::update(&state.pool, &id_asesor, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(asesor)))
}

#[axum::debug_handler]
pub async fn delete_asesor(
    State(state): State<AppState>,
    Path(id_asesor): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = AsesorSs::delete(&state.pool, &id_asesor).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Asesor no encontrado".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_carreras(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Carrera>>>), AppError> {
    let carreras = Carrera::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(carreras)))
}

#[axum::debug_handler]
pub async fn create_carrera(
    State(state): State<AppState>,
    Json(req): Json<CrearCarreraRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Carrera>>), AppError> {
    if Carrera::name_taken(&state.pool, &req.nombre, None).await? {
        return Err(AppError::Conflict(
            "Ya existe una carrera con ese nombre".to_string(),
        ));
    }

    let carrera = Carrera::create(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(carrera)))
}

#[axum::debug_handler]
pub async fn update_carrera(
    State(state): State<AppState>,
    Path(id_carrera): Path<i32>,
    Json(req): Json<ActualizarCarreraRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Carrera>>), AppError> {
    if Carrera::find_by_id(&state.pool, id_carrera).await?.is_none() {
        return Err(AppError::NotFound("Carrera no encontrada".to_string()));
    }

    if let Some(nombre) = &req.nombre {
        if Carrera::name_taken(&state.pool, nombre, Some(id_carrera)).await? {
            return Err(AppError::Conflict(
                "Ya existe una carrera con ese nombre".to_string(),
            ));
        }
    }

    let carrera = Carrera::update(&state.pool, id_carrera, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(carrera)))
}

#[axum::debug_handler]
pub async fn delete_carrera(
    State(state): State<AppState>,
    Path(id_carrera): Path<i32>,
) -> Result<StatusCode, AppError> {
    let deleted = Carrera::delete(&state.pool, id_carrera).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Carrera no encontrada".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_brigadistas(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Brigadista>>>), AppError> {
    let brigadistas = Brigadista::list(&state.pool).await?;
    Ok((StatusCode::OK, success_to_api_response(brigadistas)))
}

#[axum::debug_handler]
pub async fn create_brigadista(
    State(state): State<AppState>,
    Json(req): Json<CrearBrigadistaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Brigadista>>), AppError> {
    if Carrera::find_by_id(&state.pool, req.id_carrera).await?.is_none() {
        return Err(AppError::Validation("La carrera no existe".to_string()));
    }
    if Brigadista::phone_taken(&state.pool, &req.telefono, None).await? {
        return Err(AppError::Conflict(
            "Ya existe un brigadista con ese teléfono".to_string(),
        ));
    }
    if Brigadista::name_taken(&state.pool, &req.nombre_completo, None).await? {
        return Err(AppError::Conflict(
            "Ya existe un brigadista con ese nombre".to_string(),
        ));
    }

    let id_brigadista = Uuid::new_v4().to_string();
    let brigadista = Brigadista::create(&state.pool, &id_brigadista, &req).await?;
    Ok((StatusCode::CREATED, success_to_api_response(brigadista)))
}

#[axum::debug_handler]
pub async fn update_brigadista(
    State(state): State<AppState>,
    Path(id_brigadista): Path<String>,
    Json(req): Json<ActualizarBrigadistaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Brigadista>>), AppError> {
    if Brigadista::find_by_id(&state.pool, &id_brigadista).await?.is_none() {
        return Err(AppError::NotFound("Brigadista no encontrado".to_string()));
    }

    if let Some(id_carrera) = req.id_carrera {
        if Carrera::find_by_id(&state.pool, id_carrera).await?.is_none() {
            return Err(AppError::Validation("La carrera no existe".to_string()));
        }
    }
    if let Some(telefono) = &req.telefono {
        if Brigadista::phone_taken(&state.pool, telefono, Some(&id_brigadista)).await? {
            return Err(AppError::Conflict(
                "Ya existe un brigadista con ese teléfono".to_string(),
            ));
        }
    }
    if let Some(nombre) = &req.nombre_completo {
        if Brigadista::name_taken(&state.pool, nombre, Some(&id_brigadista)).await? {
            return Err(AppError::Conflict(
                "Ya existe un brigadista con ese nombre".to_string(),
            ));
        }
    }

    let brigadista = Brigadista::update(&state.pool, &id_brigadista, &req).await?;
    Ok((StatusCode::OK, success_to_api_response(brigadista)))
}

#[axum::debug_handler]
pub async fn delete_brigadista(
    State(state): State<AppState>,
    Path(id_brigadista): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = Brigadista::delete(&state.pool, &id_brigadista).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Brigadista no encontrado".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
