use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PlanetRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePlanetResponse {
    pub message: &'static str,
    pub inserted_id: i32,
    pub name: String,
}

/// id 原样回显路径参数，是字符串
#[derive(Debug, Serialize)]
pub struct UpdatePlanetResponse {
    pub message: &'static str,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePlanetResponse {
    pub message: &'static str,
}
