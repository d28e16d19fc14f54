// 通用的数据结构定义

use serde::{Deserialize, Serialize};

/// 通用的API响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 错误码，0表示成功，非0表示失败
    pub code: i32,
    /// 错误消息，成功时为"success"
    pub msg: String,
    /// 响应数据，错误时为None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

/// 空响应类型（用于无响应数据的API）
#[derive(Debug, Serialize, Deserialize)]
pub struct EmptyResponse {}
