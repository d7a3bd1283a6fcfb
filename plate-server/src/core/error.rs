use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::models::OrderStatus;
use thiserror::Error;

use crate::store::StorageError;

/// 领域错误 — 核心操作的全部失败类别
///
/// 所有错误对触发调用都是终止性的：核心内部不重试，由调用层决定是否向
/// 用户暴露或在更高层重查重试。
#[derive(Error, Debug)]
pub enum CoreError {
    /// 引用的客户/订单/版材型号不存在
    #[error("{0} not found")]
    NotFound(String),

    /// 数量符号、缺失责任方等校验失败
    #[error("validation error: {0}")]
    Validation(String),

    /// 订单状态前置条件不满足（非法状态跃迁）
    #[error("invalid transition: cannot {action} from status {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },

    /// 耗用动向针对非 PROCESS 状态订单
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// 存储层错误
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

// 领域操作直接在事务上 `txn.commit()?`，补上 redb 提交错误的转换链
impl From<redb::CommitError> for CoreError {
    fn from(err: redb::CommitError) -> Self {
        CoreError::Storage(StorageError::Commit(err))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// HTTP 边界错误 — 带 IntoResponse 的对外错误类型
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("冲突: {0}")]
    Conflict(String),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(what) => ServerError::NotFound(what),
            CoreError::Validation(msg) => ServerError::Validation(msg),
            CoreError::InvalidTransition { .. } => ServerError::Conflict(err.to_string()),
            CoreError::PreconditionFailed(msg) => ServerError::Conflict(msg),
            CoreError::Storage(e) => ServerError::Internal(e.into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ServerError::NotFound(what) => {
                (StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
            }
            ServerError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ServerError::Internal(err) => {
                // 记录内部错误但不暴露详细信息
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// 处理器的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_maps_to_conflict() {
        let err = CoreError::InvalidTransition {
            from: OrderStatus::Done,
            action: "start processing",
        };
        match ServerError::from(err) {
            ServerError::Conflict(msg) => {
                assert!(msg.contains("DONE"));
                assert!(msg.contains("start processing"));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn commit_errors_convert_into_core_error() {
        // 所有领域提交点都依赖这条转换链
        fn converts<E, T: From<E>>() {}
        converts::<redb::CommitError, CoreError>();
        converts::<crate::store::StorageError, CoreError>();
    }

    #[test]
    fn not_found_keeps_resource_name() {
        match ServerError::from(CoreError::NotFound("Order abc".into())) {
            ServerError::NotFound(what) => assert_eq!(what, "Order abc"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
