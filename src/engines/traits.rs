// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::EngineError;
use async_trait::async_trait;

/// 抓取响应
///
/// `final_url`是重定向链解析后的实际地址，
/// 后续的内容策略判断和记录写入都以它为准
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// 最终URL
    pub final_url: String,
    /// HTTP状态码
    pub status: u16,
    /// 响应正文
    pub body: String,
}

/// 详情页抓取特质
///
/// 详情页无需脚本执行，可走无状态HTTP抓取；
/// 测试中以mock服务器实现替换
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    /// 抓取单个URL
    async fn fetch(&self, url: &str) -> Result<FetchResponse, EngineError>;
}
