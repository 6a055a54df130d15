// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 引擎错误类型
///
/// 覆盖HTTP抓取和浏览器导航两条取页路径
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// 非成功HTTP状态
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// 超时
    #[error("Timeout")]
    Timeout,

    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),

    /// 页面缺少必需字段
    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// 传输错误、超时、服务端状态码和缺字段的单次提取失败
    /// 共用同一条重试策略；其余错误不重试
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            EngineError::HttpStatus(_) => true,
            EngineError::Timeout => true,
            EngineError::MissingField(_) => true,
            EngineError::Browser(_) => true,
            EngineError::Other(_) => false,
        }
    }
}

/// 输出Sink错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sink error: {0}")]
    Other(String),
}

/// Orchestrator错误类型
///
/// 主循环只在顶层捕获一次的致命错误
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker panicked: {0}")]
    WorkerJoin(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
