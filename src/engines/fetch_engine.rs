// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{DetailFetcher, FetchResponse};
use crate::utils::errors::EngineError;
use async_trait::async_trait;
use std::time::Duration;

/// HTTP抓取引擎
///
/// 基于reqwest的详情页抓取实现。客户端全程复用，
/// 自动跟随HTTP重定向；脚本级重定向由上层处理。
pub struct HttpFetchEngine {
    client: reqwest::Client,
}

impl HttpFetchEngine {
    /// 创建新的HTTP抓取引擎
    ///
    /// # 参数
    ///
    /// * `user_agent` - 请求UA
    /// * `timeout` - 单次请求超时
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DetailFetcher for HttpFetchEngine {
    /// 执行HTTP抓取
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 2xx响应，正文已按响应字符集解码
    /// * `Err(EngineError)` - 传输错误或非成功状态码
    async fn fetch(&self, url: &str) -> Result<FetchResponse, EngineError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }

        // text() honors the charset header, which matters for the
        // EUC-KR encoded listing-host pages
        let body = response.text().await?;

        Ok(FetchResponse {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}
