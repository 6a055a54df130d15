// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SourceSettings;
use crate::utils::errors::EngineError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 浏览器引擎
///
/// 基于chromiumoxide的列表页抓取后端。列表页依赖脚本执行和
/// 会话状态，必须走真实浏览器；详情页则走HTTP引擎。
/// 浏览器实例由调用方持有，在成功和失败路径上都要`close`。
pub struct BrowserEngine {
    browser: tokio::sync::Mutex<Browser>,
    handler: JoinHandle<()>,
    user_agent: String,
    nav_timeout: Duration,
}

impl BrowserEngine {
    /// 启动无头浏览器
    ///
    /// # 参数
    ///
    /// * `source` - 新闻源配置（UA、导航超时）
    ///
    /// # 返回值
    ///
    /// * `Ok(BrowserEngine)` - 已就绪的引擎
    /// * `Err(EngineError)` - 启动失败
    pub async fn launch(source: &SourceSettings) -> Result<Self, EngineError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(30))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(EngineError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        // Drive browser events until the connection drops
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            handler: handle,
            user_agent: source.user_agent.clone(),
            nav_timeout: source.nav_timeout(),
        })
    }

    /// 打开新的列表页
    pub async fn open_page(&self) -> Result<ListingPage, EngineError> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?
        };

        page.set_user_agent(&self.user_agent)
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        Ok(ListingPage {
            page,
            nav_timeout: self.nav_timeout,
            loads: 0,
        })
    }

    /// 关闭浏览器，释放所有上下文
    ///
    /// 幂等且不失败：关闭错误只记录日志
    pub async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!(error = %e, "Browser close reported an error");
        }
        self.handler.abort();
        debug!("Browser engine shut down");
    }
}

/// 列表页句柄
///
/// 包装单个浏览器标签页。`loads`记录累计导航次数，
/// 调用方在超出配置上限后回收重建，避免单页内存无限增长。
pub struct ListingPage {
    page: Page,
    nav_timeout: Duration,
    loads: u32,
}

impl ListingPage {
    /// 导航到目标URL，带超时
    pub async fn goto(&mut self, url: &str) -> Result<(), EngineError> {
        self.loads += 1;
        tokio::time::timeout(self.nav_timeout, self.page.goto(url))
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Browser(e.to_string()))?;
        Ok(())
    }

    /// 等待选择器出现，带超时
    ///
    /// 超时不是致命错误：对分页列表来说它就是"没有更多页"的信号，
    /// 由调用方决定如何解释
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), EngineError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(EngineError::Timeout);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// 收集匹配选择器的所有href属性
    pub async fn link_hrefs(&self, selector: &str) -> Result<Vec<String>, EngineError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let mut hrefs = Vec::new();
        for element in elements {
            match element.attribute("href").await {
                Ok(Some(href)) => hrefs.push(href),
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "href attribute read failed, skipping element");
                }
            }
        }
        Ok(hrefs)
    }

    /// 累计导航次数
    pub fn loads(&self) -> u32 {
        self.loads
    }

    /// 关闭标签页
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!(error = %e, "Listing page close reported an error");
        }
    }
}
