use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    response::IntoResponse,
};

use crate::{AppState, database::Planet, error::AppError};

use super::model::{
    CreatePlanetResponse, DeletePlanetResponse, PlanetRequest, UpdatePlanetResponse,
};

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation("invalid planet id".into()))
}

#[axum::debug_handler]
pub async fn list_planets(State(state): State<AppState>) -> Result<Json<Vec<Planet>>, AppError> {
    let planets = state.planets.list().await?;
    Ok(Json(planets))
}

#[axum::debug_handler]
pub async fn get_planet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Planet>, AppError> {
    let planet = state.planets.get(parse_id(&id)?).await?;
    Ok(Json(planet))
}

#[axum::debug_handler]
pub async fn create_planet(
    State(state): State<AppState>,
    payload: Result<Json<PlanetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected create body: {}", e);
        AppError::Validation("Invalid request body".into())
    })?;

    let planet = state.planets.create(&req.name).await?;
    Ok(Json(CreatePlanetResponse {
        message: "planet added succesfully",
        inserted_id: planet.id,
        name: planet.name,
    }))
}

#[axum::debug_handler]
pub async fn update_planet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlanetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let planet_id = parse_id(&id)?;
    let Json(req) = payload.map_err(|e| {
        tracing::debug!("Rejected update body: {}", e);
        AppError::Validation("Invalid request".into())
    })?;

    let planet = state.planets.update(planet_id, &req.name).await?;
    Ok(Json(UpdatePlanetResponse {
        message: "Planet updated",
        id,
        name: planet.name,
    }))
}

#[axum::debug_handler]
pub async fn delete_planet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.planets.delete(parse_id(&id)?).await?;
    Ok(Json(DeletePlanetResponse {
        message: "Planeted deleted",
    }))
}
