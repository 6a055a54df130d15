// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{CrawlSettings, SourceSettings};
use crate::engines::browser_engine::{BrowserEngine, ListingPage};
use crate::utils::errors::EngineError;
use crate::utils::url_utils::resolve_url;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// 主要新闻列表路径
const MAIN_NEWS_PATH: &str = "/news/mainnews.naver";
/// 主要新闻链接选择器
const MAIN_LINK_SELECTOR: &str = ".articleSubject a";
/// 个股列表表格选择器（内容就绪信号）
const STOCK_TABLE_SELECTOR: &str = "table.type5";
/// 个股新闻链接选择器
const STOCK_LINK_SELECTOR: &str = "td.title > a";

/// 链接来源特质
///
/// 生产者侧的唯一入口。Orchestrator只依赖这个接口，
/// 测试用固定清单实现替换浏览器。
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// 收集主要新闻链接，最多`limit`条
    async fn collect_main_links(&self, limit: usize) -> Vec<String>;

    /// 收集单只股票的新闻链接
    async fn collect_stock_links(
        &self,
        code: &str,
        max_pages: u32,
        links_per_page: usize,
    ) -> Vec<String>;
}

/// 单页收集结果
///
/// 翻页循环的控制信号：`Stop`表示列表自然耗尽（空页或表格
/// 未出现），是正常终止而不是错误
#[derive(Debug)]
pub enum PageOutcome {
    /// 本页有产出，继续翻页
    Continue(Vec<String>),
    /// 列表耗尽，停止翻页
    Stop(&'static str),
}

/// 浏览器驱动的链接收集器
///
/// 收集失败对流水线不是致命的：任何错误都降级为空结果并记录，
/// 股票照常标记完成，下一轮全量运行可以补收。
pub struct LinkCollector {
    engine: Arc<BrowserEngine>,
    base: Url,
    selector_timeout: Duration,
    pages_per_context: u32,
}

impl LinkCollector {
    pub fn new(
        engine: Arc<BrowserEngine>,
        source: &SourceSettings,
        crawl: &CrawlSettings,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            engine,
            base: Url::parse(&source.base_url)?,
            selector_timeout: source.selector_timeout(),
            pages_per_context: crawl.pages_per_context,
        })
    }

    fn page_url(&self, path: &str) -> Result<Url, EngineError> {
        resolve_url(&self.base, path).map_err(|e| EngineError::Other(e.to_string()))
    }

    /// 个股列表页URL
    ///
    /// 列表内容渲染在`#news_frame`内嵌框架里，外层文档拿不到
    /// 表格节点。直接导航到框架自身的文档URL，让选择器在
    /// 顶层文档上生效。
    fn stock_page_url(&self, code: &str, page: u32) -> Result<Url, EngineError> {
        self.page_url(&format!("/item/news_news.naver?code={code}&page={page}"))
    }

    /// 收集单个列表页
    async fn collect_stock_page(
        &self,
        page: &mut ListingPage,
        code: &str,
        page_no: u32,
        links_per_page: usize,
    ) -> Result<PageOutcome, EngineError> {
        let url = self.stock_page_url(code, page_no)?;
        page.goto(url.as_str()).await?;

        match page
            .wait_for(STOCK_TABLE_SELECTOR, self.selector_timeout)
            .await
        {
            Ok(()) => {}
            Err(EngineError::Timeout) => return Ok(PageOutcome::Stop("listing table absent")),
            Err(e) => return Err(e),
        }

        let hrefs = page.link_hrefs(STOCK_LINK_SELECTOR).await?;
        if hrefs.is_empty() {
            return Ok(PageOutcome::Stop("empty page"));
        }

        let links = hrefs
            .into_iter()
            .take(links_per_page)
            .filter_map(|href| resolve_url(&self.base, &href).ok())
            .map(|url| url.to_string())
            .collect();
        Ok(PageOutcome::Continue(links))
    }
}

#[async_trait]
impl LinkSource for LinkCollector {
    async fn collect_main_links(&self, limit: usize) -> Vec<String> {
        let result: Result<Vec<String>, EngineError> = async {
            let mut page = self.engine.open_page().await?;
            let url = self.page_url(MAIN_NEWS_PATH)?;
            page.goto(url.as_str()).await?;
            page.wait_for(MAIN_LINK_SELECTOR, self.selector_timeout)
                .await?;
            let hrefs = page.link_hrefs(MAIN_LINK_SELECTOR).await?;
            page.close().await;

            let mut seen = HashSet::new();
            let links = hrefs
                .into_iter()
                .filter_map(|href| resolve_url(&self.base, &href).ok())
                .map(|url| url.to_string())
                .filter(|link| seen.insert(link.clone()))
                .take(limit)
                .collect();
            Ok(links)
        }
        .await;

        match result {
            Ok(links) => {
                info!(count = links.len(), "Main news links collected");
                links
            }
            Err(e) => {
                warn!(error = %e, "Main news collection failed, continuing with empty set");
                Vec::new()
            }
        }
    }

    async fn collect_stock_links(
        &self,
        code: &str,
        max_pages: u32,
        links_per_page: usize,
    ) -> Vec<String> {
        let result: Result<Vec<String>, EngineError> = async {
            let mut page = self.engine.open_page().await?;
            let mut seen = HashSet::new();
            let mut links = Vec::new();

            for page_no in 1..=max_pages {
                // Tab recycling keeps long rosters from growing a single
                // renderer without bound
                if page.loads() >= self.pages_per_context {
                    debug!(code, "Recycling listing page");
                    page.close().await;
                    page = self.engine.open_page().await?;
                }

                match self
                    .collect_stock_page(&mut page, code, page_no, links_per_page)
                    .await?
                {
                    PageOutcome::Continue(page_links) => {
                        for link in page_links {
                            if seen.insert(link.clone()) {
                                links.push(link);
                            }
                        }
                    }
                    PageOutcome::Stop(reason) => {
                        debug!(code, page_no, reason, "Pagination stopped");
                        break;
                    }
                }

                if page_no < max_pages {
                    sleep(Duration::from_millis(rand::random_range(300..=700))).await;
                }
            }

            page.close().await;
            Ok(links)
        }
        .await;

        match result {
            Ok(links) => {
                info!(code, count = links.len(), "Stock news links collected");
                links
            }
            Err(e) => {
                warn!(code, error = %e, "Stock link collection failed, continuing with empty set");
                Vec::new()
            }
        }
    }
}
