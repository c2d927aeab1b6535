use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 出错时正在执行的存储操作，决定返回的状态码和提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("planet not found")]
    NotFound(StoreOp),
    #[error("store failure during {op:?}: {source}")]
    Store {
        op: StoreOp,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn store(op: StoreOp, source: sqlx::Error) -> Self {
        AppError::Store { op, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // 读取和新增失败返回 400，修改和删除失败返回 500
            AppError::Store { op, .. } => match op {
                StoreOp::List | StoreOp::Get | StoreOp::Create => StatusCode::BAD_REQUEST,
                StoreOp::Update | StoreOp::Delete => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(StoreOp::Get) => "planet not found".into(),
            AppError::NotFound(_) => "Planet not found".into(),
            AppError::Store { op, .. } => match op {
                StoreOp::List => "error selecting planets",
                StoreOp::Get => "error scanning planet by id",
                StoreOp::Create => "error adding a planet",
                StoreOp::Update => "Error updating",
                StoreOp::Delete => "error deleting planet",
            }
            .into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.message(),
        });

        (status, body).into_response()
    }
}
