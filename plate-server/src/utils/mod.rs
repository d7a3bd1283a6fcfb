//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppResponse`] - API 响应信封
//! - [`logger`] - 日志初始化

pub mod logger;

pub use logger::init_logger_with_file;

/// API 响应信封
///
/// 所有 HTTP 接口统一返回 `{success, data, error}`。
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AppResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> AppResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// 创建错误响应
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_envelope_shape() {
        let ok = AppResponse::success(42);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);

        let err: AppResponse<()> = AppResponse::error("boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }
}
