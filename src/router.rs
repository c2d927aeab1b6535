use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    AppState,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};

// 行星相关的路由
pub fn planet_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(routes::planet::list_planets).post(routes::planet::create_planet),
        )
        .route(
            "/{id}",
            get(routes::planet::get_planet)
                .put(routes::planet::update_planet)
                .delete(routes::planet::delete_planet),
        )
}

// 创建主路由，限流在最外层，先于其他处理执行
pub fn create_router(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    planet_routes()
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(rate_limiter, rate_limit))
        .with_state(state)
}
