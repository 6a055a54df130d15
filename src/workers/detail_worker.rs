// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::format_datetime;
use crate::domain::models::{ArticleRecord, FetchJob, JobKind};
use crate::engines::traits::{DetailFetcher, FetchResponse};
use crate::extract::article::extract_article;
use crate::extract::sentiment::SentimentClassifier;
use crate::queue::{QueueItem, WorkQueue};
use crate::utils::errors::EngineError;
use crate::utils::retry_policy::RetryPolicy;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 政策排除标记：体育频道文章无正文模板，直接放弃
const EXCLUDED_URL_MARKER: &str = "m.sports.naver.com";

/// 列表站脚本重定向的目标提取
///
/// 公告页的赋值写法不统一：`top.`前缀、引号风格和等号两侧的
/// 空白都有变体，统一按最宽松的形状匹配
static REDIRECT_TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:top\.)?location\.href\s*=\s*['"]([^'"]+)['"]"#).expect("valid regex")
});

/// 详情页消费者
///
/// 从队列逐条取任务抓详情，直到遇到终止哨兵。并发上限由
/// 共享信号量控制，与worker数量解耦。
pub struct DetailWorker {
    worker_id: usize,
    queue: Arc<WorkQueue>,
    fetcher: Arc<dyn DetailFetcher>,
    classifier: Arc<dyn SentimentClassifier>,
    results: Arc<Mutex<Vec<ArticleRecord>>>,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
    listing_host: String,
}

impl DetailWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        worker_id: usize,
        queue: Arc<WorkQueue>,
        fetcher: Arc<dyn DetailFetcher>,
        classifier: Arc<dyn SentimentClassifier>,
        results: Arc<Mutex<Vec<ArticleRecord>>>,
        limiter: Arc<Semaphore>,
        retry: RetryPolicy,
        listing_host: String,
    ) -> Self {
        Self {
            worker_id,
            queue,
            fetcher,
            classifier,
            results,
            limiter,
            retry,
            listing_host,
        }
    }

    /// 消费循环
    ///
    /// 单篇失败不会中断循环；只有哨兵能让worker退出
    pub async fn run(self) {
        let mut processed = 0usize;
        loop {
            match self.queue.get().await {
                QueueItem::PoisonPill => {
                    info!(worker_id = self.worker_id, processed, "Worker exiting");
                    break;
                }
                QueueItem::Job(job) => {
                    let permit = match self.limiter.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };
                    if let Some(record) = fetch_article_details(
                        self.fetcher.as_ref(),
                        self.classifier.as_ref(),
                        &self.listing_host,
                        &job,
                        &self.retry,
                    )
                    .await
                    {
                        self.results.lock().push(record);
                        processed += 1;
                    }
                    drop(permit);
                    // Politeness jitter between consecutive fetches
                    sleep(Duration::from_millis(rand::random_range(100..=500))).await;
                }
            }
        }
    }
}

/// 抓取并提取单篇文章
///
/// 传输和提取失败按策略线性退避重试；重试耗尽、政策排除
/// 和不可重试错误都归结为`None`，绝不向上抛错。
pub async fn fetch_article_details(
    fetcher: &dyn DetailFetcher,
    classifier: &dyn SentimentClassifier,
    listing_host: &str,
    job: &FetchJob,
    retry: &RetryPolicy,
) -> Option<ArticleRecord> {
    for attempt in 0..retry.max_attempts {
        match attempt_article(fetcher, classifier, listing_host, job).await {
            Ok(result) => return result,
            Err(e) if e.is_retryable() && retry.should_retry(attempt) => {
                warn!(url = %job.url, attempt, error = %e, "Detail fetch failed, backing off");
                sleep(retry.backoff(attempt)).await;
            }
            Err(e) => {
                warn!(url = %job.url, error = %e, "Detail fetch gave up");
                return None;
            }
        }
    }
    None
}

/// 单次抓取尝试
///
/// `Ok(None)`是政策排除的正常结束，`Err`才进入重试判定
async fn attempt_article(
    fetcher: &dyn DetailFetcher,
    classifier: &dyn SentimentClassifier,
    listing_host: &str,
    job: &FetchJob,
) -> Result<Option<ArticleRecord>, EngineError> {
    let response = resolve_final_page(fetcher, listing_host, &job.url).await?;

    if response.final_url.contains(EXCLUDED_URL_MARKER) {
        debug!(url = %response.final_url, "Sports article excluded by policy");
        return Ok(None);
    }

    let extract = extract_article(&response.body)?;

    let sentiment = match &job.kind {
        JobKind::Stock(_) => {
            let input = format!("{} {}", extract.title, extract.content_text);
            Some(classifier.classify(&input))
        }
        JobKind::Main => None,
    };

    let stock = job.kind.stock_info();
    Ok(Some(ArticleRecord {
        news_type: job.kind.news_type(),
        stock_code: stock.map(|s| s.code.clone()),
        stock_name: stock.map(|s| s.name.clone()),
        url: response.final_url,
        title: extract.title,
        content: extract.content_html,
        source: extract.source,
        category: extract.category,
        thumbnail_url: extract.thumbnail_url,
        published_at: format_datetime(extract.published_at),
        crawled_at: format_datetime(chrono::Local::now().naive_local()),
        sentiment,
    }))
}

/// 解析到真正的文章页
///
/// 列表站对新闻链接返回一页内联脚本跳转，而不是HTTP重定向。
/// 最终URL仍停留在列表站时，从正文里取出跳转目标再抓一次；
/// 取不到目标就带着公告页继续，让提取阶段决定成败。
async fn resolve_final_page(
    fetcher: &dyn DetailFetcher,
    listing_host: &str,
    url: &str,
) -> Result<FetchResponse, EngineError> {
    let response = fetcher.fetch(url).await?;

    if response.final_url.contains(listing_host) {
        if let Some(target) = REDIRECT_TARGET_RE
            .captures(&response.body)
            .and_then(|caps| caps.get(1))
        {
            debug!(from = %response.final_url, to = %target.as_str(), "Following script redirect");
            return fetcher.fetch(target.as_str()).await;
        }
    }

    Ok(response)
}
