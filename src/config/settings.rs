// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含爬取流水线、新闻源和文件路径的所有配置项。
/// 原脚本的模块级常量全部收拢到这里，由Orchestrator在
/// 构造时接收（数值默认值不承载业务含义，可整体调参）。
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 爬取流水线配置
    pub crawl: CrawlSettings,
    /// 新闻源配置
    pub source: SourceSettings,
    /// 文件路径配置
    pub paths: PathSettings,
}

/// 爬取流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 每批处理的股票数量
    pub batch_size: usize,
    /// 消费者任务数量（逻辑worker数，与并发上限解耦）
    pub worker_count: usize,
    /// 链接收集阶段并发上限（浏览器导航开销大，刻意低于详情抓取）
    pub link_concurrency: usize,
    /// 详情抓取在途请求并发上限
    pub detail_concurrency: usize,
    /// 每隔多少批持久化一次进度并执行回收
    pub checkpoint_interval: usize,
    /// 每只股票最多翻页数
    pub max_pages_per_stock: u32,
    /// 列表页每页最多收集的链接数
    pub max_links_per_page: usize,
    /// 主要新闻最多收集的链接数
    pub main_news_limit: usize,
    /// 单篇文章最大尝试次数
    pub max_retries: u32,
    /// 内存高水位（0.0-1.0），超过时批间暂停
    pub memory_high_water: f64,
    /// 背压触发时的暂停秒数
    pub backpressure_pause_secs: u64,
    /// 浏览器页面复用的最大加载次数，超过后回收重建
    pub pages_per_context: u32,
}

/// 新闻源配置
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    /// 列表站基础URL
    pub base_url: String,
    /// 请求User-Agent
    pub user_agent: String,
    /// 页面导航超时（秒）
    pub nav_timeout_secs: u64,
    /// 选择器等待超时（秒）
    pub selector_timeout_secs: u64,
    /// 详情页HTTP请求超时（秒）
    pub fetch_timeout_secs: u64,
}

impl SourceSettings {
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// 文件路径配置
#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    /// 股票清单CSV路径
    pub stocks_csv: String,
    /// 进度快照文件路径
    pub progress_file: String,
    /// JSON导出目录
    pub output_dir: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、可选配置文件和环境变量加载
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Pipeline defaults mirror the original script constants
            .set_default("crawl.batch_size", 20)?
            .set_default("crawl.worker_count", 5)?
            .set_default("crawl.link_concurrency", 2)?
            .set_default("crawl.detail_concurrency", 5)?
            .set_default("crawl.checkpoint_interval", 5)?
            .set_default("crawl.max_pages_per_stock", 3)?
            .set_default("crawl.max_links_per_page", 10)?
            .set_default("crawl.main_news_limit", 10)?
            .set_default("crawl.max_retries", 2)?
            .set_default("crawl.memory_high_water", 0.85)?
            .set_default("crawl.backpressure_pause_secs", 30)?
            .set_default("crawl.pages_per_context", 25)?
            // Source defaults
            .set_default("source.base_url", "https://finance.naver.com")?
            .set_default(
                "source.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36",
            )?
            .set_default("source.nav_timeout_secs", 25)?
            .set_default("source.selector_timeout_secs", 10)?
            .set_default("source.fetch_timeout_secs", 15)?
            // Path defaults
            .set_default("paths.stocks_csv", "stocks.csv")?
            .set_default("paths.progress_file", "progress.json")?
            .set_default("paths.output_dir", ".")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("NEWSRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
