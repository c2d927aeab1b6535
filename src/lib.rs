use service::PlanetService;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod service;

#[derive(Clone)]
pub struct AppState {
    pub planets: PlanetService,
}
