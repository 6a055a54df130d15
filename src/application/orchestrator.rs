// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::collector::LinkSource;
use crate::config::settings::Settings;
use crate::domain::models::{ArticleRecord, CrawlTarget, FetchJob, StockInfo};
use crate::engines::traits::DetailFetcher;
use crate::extract::sentiment::SentimentClassifier;
use crate::infrastructure::{NewsSink, ProgressSnapshot, ProgressStore, ResourceGuard};
use crate::queue::{QueueItem, WorkQueue};
use crate::utils::errors::OrchestratorError;
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::DetailWorker;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{error, info, warn};
use url::Url;

/// 运行总结
#[derive(Debug)]
pub struct CrawlSummary {
    pub articles: usize,
    pub elapsed: Duration,
}

/// 爬取编排器
///
/// 驱动 Init → MainNewsPhase → StocksPhase → Finalize 状态机。
/// 协作对象全部经接口注入，编排逻辑对浏览器和网络零感知，
/// 测试用固定清单和本地HTTP替身运行完整流水线。
/// 拒绝会让流水线恐慌或永久挂起的退化配置
///
/// 批大小和检查点间隔为零会在分批与取模处恐慌；worker数或
/// 并发上限为零则没有任何消费者排空队列，运行永不结束
fn validate_crawl_settings(settings: &Settings) -> Result<(), OrchestratorError> {
    let crawl = &settings.crawl;
    let nonzero = [
        ("crawl.batch_size", crawl.batch_size),
        ("crawl.checkpoint_interval", crawl.checkpoint_interval),
        ("crawl.worker_count", crawl.worker_count),
        ("crawl.link_concurrency", crawl.link_concurrency),
        ("crawl.detail_concurrency", crawl.detail_concurrency),
    ];
    for (name, value) in nonzero {
        if value == 0 {
            return Err(OrchestratorError::Config(format!("{name} must be nonzero")));
        }
    }
    Ok(())
}

pub struct CrawlOrchestrator {
    settings: Settings,
    link_source: Arc<dyn LinkSource>,
    fetcher: Arc<dyn DetailFetcher>,
    classifier: Arc<dyn SentimentClassifier>,
    guard: ResourceGuard,
    progress: ProgressStore,
    sinks: Vec<Arc<dyn NewsSink>>,
    roster: Vec<StockInfo>,
    listing_host: String,
}

impl std::fmt::Debug for CrawlOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlOrchestrator").finish_non_exhaustive()
    }
}

impl CrawlOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Settings,
        link_source: Arc<dyn LinkSource>,
        fetcher: Arc<dyn DetailFetcher>,
        classifier: Arc<dyn SentimentClassifier>,
        guard: ResourceGuard,
        progress: ProgressStore,
        sinks: Vec<Arc<dyn NewsSink>>,
        roster: Vec<StockInfo>,
    ) -> Result<Self, OrchestratorError> {
        validate_crawl_settings(&settings)?;

        let listing_host = Url::parse(&settings.source.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .ok_or_else(|| {
                OrchestratorError::Config(format!(
                    "base_url has no host: {}",
                    settings.source.base_url
                ))
            })?;

        Ok(Self {
            settings,
            link_source,
            fetcher,
            classifier,
            guard,
            progress,
            sinks,
            roster,
            listing_host,
        })
    }

    /// 执行一次完整运行
    ///
    /// 致命错误只在这里捕获一次：先紧急保存进度，有部分结果就
    /// 导出，然后再向上传播
    pub async fn run(&self) -> Result<CrawlSummary, OrchestratorError> {
        let start = Instant::now();
        let mut snapshot = self.progress.load();

        let outcome = self.run_phases(&mut snapshot).await;
        let articles = snapshot.crawled_data.len();

        match outcome {
            Ok(()) => {
                self.progress.save(&snapshot);
                self.export_all(&snapshot.crawled_data).await;
                self.progress.clear();
                info!(articles, elapsed = ?start.elapsed(), "Crawl run complete");
                Ok(CrawlSummary {
                    articles,
                    elapsed: start.elapsed(),
                })
            }
            Err(e) => {
                error!(error = %e, "Crawl run aborted, saving emergency snapshot");
                self.progress.save(&snapshot);
                if !snapshot.crawled_data.is_empty() {
                    self.export_all(&snapshot.crawled_data).await;
                }
                info!(articles, elapsed = ?start.elapsed(), "Partial results preserved");
                Err(e)
            }
        }
    }

    async fn run_phases(&self, snapshot: &mut ProgressSnapshot) -> Result<(), OrchestratorError> {
        self.main_news_phase(snapshot).await?;
        self.stocks_phase(snapshot).await
    }

    /// 主要新闻阶段
    async fn main_news_phase(
        &self,
        snapshot: &mut ProgressSnapshot,
    ) -> Result<(), OrchestratorError> {
        if snapshot.main_news_completed {
            info!("Main news already completed, skipping");
            return Ok(());
        }

        let links = self
            .link_source
            .collect_main_links(self.settings.crawl.main_news_limit)
            .await;
        let jobs: Vec<FetchJob> = links.into_iter().map(FetchJob::main).collect();

        let records = self.run_cycle(jobs).await?;
        snapshot.crawled_data.extend(records);
        snapshot.main_news_completed = true;
        self.progress.save(snapshot);
        Ok(())
    }

    /// 个股阶段
    ///
    /// 已完成的股票在入批前剔除；批内每只股票无论收到多少链接
    /// 都标记完成，空结果留给下一轮全量运行补收
    async fn stocks_phase(&self, snapshot: &mut ProgressSnapshot) -> Result<(), OrchestratorError> {
        let crawl = &self.settings.crawl;
        let completed: HashSet<&str> = snapshot
            .completed_stocks
            .iter()
            .map(String::as_str)
            .collect();
        let targets: Vec<CrawlTarget> = self
            .roster
            .iter()
            .filter(|stock| !completed.contains(stock.code.as_str()))
            .map(|stock| CrawlTarget::StockNews {
                stock: stock.clone(),
                max_pages: crawl.max_pages_per_stock,
                max_links_per_page: crawl.max_links_per_page,
            })
            .collect();

        if targets.is_empty() {
            info!("No pending stocks");
            return Ok(());
        }
        info!(pending = targets.len(), batch_size = crawl.batch_size, "Stocks phase starting");

        for (batch_no, batch) in targets.chunks(crawl.batch_size).enumerate() {
            if !self.guard.check_resources() {
                warn!(
                    pause_secs = crawl.backpressure_pause_secs,
                    "Back-pressure pause before batch"
                );
                sleep(Duration::from_secs(crawl.backpressure_pause_secs)).await;
            }

            let collected = self.collect_batch_links(batch).await;

            let jobs: Vec<FetchJob> = collected
                .iter()
                .flat_map(|(stock, links)| {
                    links
                        .iter()
                        .map(|link| FetchJob::stock(link.clone(), stock.clone()))
                })
                .collect();

            let records = self.run_cycle(jobs).await?;
            snapshot.crawled_data.extend(records);

            for (stock, _) in &collected {
                if !snapshot.completed_stocks.contains(&stock.code) {
                    snapshot.completed_stocks.push(stock.code.clone());
                }
            }

            if (batch_no + 1) % crawl.checkpoint_interval == 0 {
                info!(batch_no = batch_no + 1, "Checkpoint");
                self.progress.save(snapshot);
                self.guard.reclaim();
            }
        }
        Ok(())
    }

    /// 批内并发收集链接，受link_concurrency信号量约束
    async fn collect_batch_links(
        &self,
        batch: &[CrawlTarget],
    ) -> Vec<(StockInfo, Vec<String>)> {
        let limiter = Arc::new(Semaphore::new(self.settings.crawl.link_concurrency));
        let collections = batch.iter().filter_map(|target| match target {
            CrawlTarget::StockNews {
                stock,
                max_pages,
                max_links_per_page,
            } => {
                let limiter = limiter.clone();
                let source = self.link_source.clone();
                let stock = stock.clone();
                let max_pages = *max_pages;
                let links_per_page = *max_links_per_page;
                Some(async move {
                    let _permit = limiter.acquire().await;
                    let links = source
                        .collect_stock_links(&stock.code, max_pages, links_per_page)
                        .await;
                    (stock, links)
                })
            }
            CrawlTarget::MainNews => None,
        });
        futures::future::join_all(collections).await
    }

    /// 一轮生产者/消费者循环
    ///
    /// 全部任务先入队，再启动消费者；队列排空后投放哨兵并等待
    /// 所有worker退出，返回本轮提取结果
    async fn run_cycle(&self, jobs: Vec<FetchJob>) -> Result<Vec<ArticleRecord>, OrchestratorError> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let crawl = &self.settings.crawl;
        let total = jobs.len();

        let queue = Arc::new(WorkQueue::new());
        let results: Arc<Mutex<Vec<ArticleRecord>>> = Arc::new(Mutex::new(Vec::new()));
        let limiter = Arc::new(Semaphore::new(crawl.detail_concurrency));
        let retry = RetryPolicy::new(crawl.max_retries, Duration::from_secs(1));

        for job in jobs {
            queue.put(QueueItem::Job(job));
        }

        let workers: Vec<_> = (0..crawl.worker_count)
            .map(|worker_id| {
                let worker = DetailWorker::new(
                    worker_id,
                    queue.clone(),
                    self.fetcher.clone(),
                    self.classifier.clone(),
                    results.clone(),
                    limiter.clone(),
                    retry.clone(),
                    self.listing_host.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        while queue.size() > 0 {
            sleep(Duration::from_millis(200)).await;
        }
        queue.put_poison_pills(crawl.worker_count);

        for handle in workers {
            handle
                .await
                .map_err(|e| OrchestratorError::WorkerJoin(e.to_string()))?;
        }

        let records = std::mem::take(&mut *results.lock());
        info!(total, extracted = records.len(), "Fetch cycle complete");
        Ok(records)
    }

    /// 导出到所有Sink
    ///
    /// 单个Sink失败只记录，既不中断运行也不影响其他Sink
    async fn export_all(&self, records: &[ArticleRecord]) {
        for sink in &self.sinks {
            if let Err(e) = sink.export(records).await {
                warn!(sink = sink.name(), error = %e, "Export failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::traits::FetchResponse;
    use crate::extract::sentiment::LexiconClassifier;
    use crate::utils::errors::EngineError;
    use async_trait::async_trait;

    struct EmptySource;

    #[async_trait]
    impl LinkSource for EmptySource {
        async fn collect_main_links(&self, _limit: usize) -> Vec<String> {
            Vec::new()
        }

        async fn collect_stock_links(
            &self,
            _code: &str,
            _max_pages: u32,
            _links_per_page: usize,
        ) -> Vec<String> {
            Vec::new()
        }
    }

    struct EmptyFetcher;

    #[async_trait]
    impl DetailFetcher for EmptyFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, EngineError> {
            Ok(FetchResponse {
                final_url: url.to_string(),
                status: 200,
                body: String::new(),
            })
        }
    }

    fn build(mutate: fn(&mut Settings)) -> Result<CrawlOrchestrator, OrchestratorError> {
        let mut settings = Settings::new().expect("default settings");
        mutate(&mut settings);
        CrawlOrchestrator::new(
            settings,
            Arc::new(EmptySource),
            Arc::new(EmptyFetcher),
            Arc::new(LexiconClassifier),
            crate::infrastructure::ResourceGuard::new(1.0),
            crate::infrastructure::ProgressStore::new(
                std::env::temp_dir().join("newsrs-validate.json"),
            ),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn default_settings_pass_validation() {
        assert!(build(|_| {}).is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = build(|s| s.crawl.batch_size = 0).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(_)));
    }

    #[test]
    fn zero_checkpoint_interval_is_rejected() {
        let err = build(|s| s.crawl.checkpoint_interval = 0).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(_)));
    }

    #[test]
    fn zero_worker_count_is_rejected() {
        let err = build(|s| s.crawl.worker_count = 0).unwrap_err();
        assert!(matches!(err, OrchestratorError::Config(_)));
    }

    #[test]
    fn zero_concurrency_caps_are_rejected() {
        assert!(build(|s| s.crawl.link_concurrency = 0).is_err());
        assert!(build(|s| s.crawl.detail_concurrency = 0).is_err());
    }
}
