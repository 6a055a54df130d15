// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 流水线集成测试
//!
//! 用固定链接清单替换浏览器、本地mock服务器替换新闻源，
//! 跑完整的 Init → MainNewsPhase → StocksPhase → Finalize 状态机。

use async_trait::async_trait;
use newsrs::application::CrawlOrchestrator;
use newsrs::collector::LinkSource;
use newsrs::config::settings::Settings;
use newsrs::domain::models::StockInfo;
use newsrs::engines::fetch_engine::HttpFetchEngine;
use newsrs::engines::traits::DetailFetcher;
use newsrs::extract::sentiment::{LexiconClassifier, SentimentClassifier};
use newsrs::infrastructure::{
    JsonFileSink, NewsSink, ProgressSnapshot, ProgressStore, ResourceGuard,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 固定清单链接源
///
/// 记录每次个股收集的代码，并在收集时刻读取进度文件，
/// 供断言批次划分和批后检查点对后续批次可见
struct FixedLinkSource {
    main: Vec<String>,
    stocks: HashMap<String, Vec<String>>,
    collected_codes: Arc<Mutex<Vec<String>>>,
    progress_file: Option<PathBuf>,
    /// 每次个股收集时进度文件里已完成的代码
    checkpoint_log: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl FixedLinkSource {
    fn completed_in_snapshot(&self) -> Vec<String> {
        let Some(path) = &self.progress_file else {
            return Vec::new();
        };
        std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<ProgressSnapshot>(&raw).ok())
            .map(|snapshot| snapshot.completed_stocks)
            .unwrap_or_default()
    }
}

#[async_trait]
impl LinkSource for FixedLinkSource {
    async fn collect_main_links(&self, limit: usize) -> Vec<String> {
        self.main.iter().take(limit).cloned().collect()
    }

    async fn collect_stock_links(
        &self,
        code: &str,
        _max_pages: u32,
        links_per_page: usize,
    ) -> Vec<String> {
        self.collected_codes.lock().push(code.to_string());
        self.checkpoint_log
            .lock()
            .push((code.to_string(), self.completed_in_snapshot()));
        self.stocks
            .get(code)
            .map(|links| links.iter().take(links_per_page).cloned().collect())
            .unwrap_or_default()
    }
}

fn article_html(title: &str) -> String {
    format!(
        r#"<html><head>
            <meta property="og:image" content="https://img.example.com/t.jpg"/>
        </head><body>
            <div class="media_end_head_top_logo"><img alt="연합뉴스"/></div>
            <div class="media_end_head_info_datestamp_time" data-date-time="2025-03-14 09:30:00"></div>
            <h2 id="title_area"><span>{title}</span></h2>
            <article id="dic_area">주가 강세 흐름이 이어졌다.</article>
        </body></html>"#
    )
}

async fn article_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/article/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html("기사 제목")))
        .mount(&server)
        .await;
    server
}

fn stock(code: &str, name: &str) -> StockInfo {
    StockInfo {
        code: code.to_string(),
        name: name.to_string(),
    }
}

fn test_settings(dir: &Path) -> Settings {
    let mut settings = Settings::new().expect("default settings");
    settings.crawl.batch_size = 2;
    settings.crawl.worker_count = 2;
    settings.crawl.detail_concurrency = 2;
    settings.crawl.checkpoint_interval = 1;
    settings.crawl.main_news_limit = 5;
    settings.crawl.max_retries = 2;
    settings.crawl.memory_high_water = 1.0;
    settings.crawl.backpressure_pause_secs = 0;
    settings.paths.progress_file = dir.join("progress.json").display().to_string();
    settings.paths.output_dir = dir.display().to_string();
    settings
}

struct Harness {
    orchestrator: CrawlOrchestrator,
    dir: TempDir,
    collected_codes: Arc<Mutex<Vec<String>>>,
    checkpoint_log: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

fn build_harness(
    roster: Vec<StockInfo>,
    main_links: Vec<String>,
    stock_links: HashMap<String, Vec<String>>,
    seed: Option<ProgressSnapshot>,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let settings = test_settings(dir.path());

    let progress = ProgressStore::new(settings.paths.progress_file.clone());
    if let Some(snapshot) = seed {
        progress.save(&snapshot);
    }

    // Keep handles on the collection logs for assertions after the run
    let collected_codes = Arc::new(Mutex::new(Vec::new()));
    let checkpoint_log = Arc::new(Mutex::new(Vec::new()));
    let link_source: Arc<dyn LinkSource> = Arc::new(FixedLinkSource {
        main: main_links,
        stocks: stock_links,
        collected_codes: collected_codes.clone(),
        progress_file: Some(PathBuf::from(&settings.paths.progress_file)),
        checkpoint_log: checkpoint_log.clone(),
    });

    let fetcher: Arc<dyn DetailFetcher> = Arc::new(
        HttpFetchEngine::new("newsrs-test", Duration::from_secs(5)).unwrap(),
    );
    let classifier: Arc<dyn SentimentClassifier> = Arc::new(LexiconClassifier);
    let guard = ResourceGuard::new(settings.crawl.memory_high_water);
    let sinks: Vec<Arc<dyn NewsSink>> =
        vec![Arc::new(JsonFileSink::new(settings.paths.output_dir.clone()))];

    let orchestrator = CrawlOrchestrator::new(
        settings,
        link_source,
        fetcher,
        classifier,
        guard,
        progress,
        sinks,
        roster,
    )
    .unwrap();

    Harness {
        orchestrator,
        dir,
        collected_codes,
        checkpoint_log,
    }
}

fn export_records(dir: &Path) -> Vec<serde_json::Value> {
    let export = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().starts_with("unified_news_"))
        .expect("export file should exist");
    serde_json::from_str(&std::fs::read_to_string(export.path()).unwrap()).unwrap()
}

/// 断点续爬只补收未完成的实体
///
/// {A,B}已完成、主要新闻已完成时，重跑只应收集C
#[tokio::test]
async fn resumed_run_only_collects_pending_stocks() {
    let server = article_server().await;
    let link = |n: usize| format!("{}/article/{n}", server.uri());

    let seed = ProgressSnapshot {
        crawled_data: Vec::new(),
        completed_stocks: vec!["A".to_string(), "B".to_string()],
        main_news_completed: true,
    };
    let harness = build_harness(
        vec![stock("A", "에이"), stock("B", "비"), stock("C", "씨")],
        vec![link(100)],
        HashMap::from([
            ("A".to_string(), vec![link(1)]),
            ("B".to_string(), vec![link(2)]),
            ("C".to_string(), vec![link(3), link(4)]),
        ]),
        Some(seed),
    );

    let summary = harness.orchestrator.run().await.unwrap();

    assert_eq!(&*harness.collected_codes.lock(), &["C".to_string()]);
    assert_eq!(summary.articles, 2);

    // Snapshot is cleared after a fully successful run
    assert!(!harness.dir.path().join("progress.json").exists());
}

/// 完整运行：主要新闻加三只股票、批大小2
///
/// 两个批次都要跑完，导出为去重后的全量并集
#[tokio::test]
async fn full_run_exports_union_without_duplicate_urls() {
    let server = article_server().await;
    let link = |n: usize| format!("{}/article/{n}", server.uri());

    let harness = build_harness(
        vec![stock("A", "에이"), stock("B", "비"), stock("C", "씨")],
        vec![link(100), link(101)],
        HashMap::from([
            ("A".to_string(), vec![link(1), link(2)]),
            ("B".to_string(), vec![link(3), link(4)]),
            ("C".to_string(), vec![link(5), link(6)]),
        ]),
        None,
    );

    let summary = harness.orchestrator.run().await.unwrap();
    assert_eq!(summary.articles, 8);

    // Batch 1 covers the first two tickers, batch 2 the third. Order
    // inside a batch is unordered across concurrent collections.
    let codes = harness.collected_codes.lock().clone();
    assert_eq!(codes.len(), 3);
    let mut first_batch: Vec<&str> = codes[..2].iter().map(String::as_str).collect();
    first_batch.sort_unstable();
    assert_eq!(first_batch, ["A", "B"]);
    assert_eq!(codes[2], "C");

    // The checkpoint written after batch 1 is visible when batch 2 starts
    let checkpoints = harness.checkpoint_log.lock().clone();
    let (_, completed_at_c) = checkpoints
        .iter()
        .find(|(code, _)| code == "C")
        .expect("C should have been collected");
    let mut completed_at_c = completed_at_c.clone();
    completed_at_c.sort_unstable();
    assert_eq!(completed_at_c, ["A", "B"]);

    // No checkpoint lists any stock before the first batch finished
    for (code, completed) in &checkpoints {
        if code != "C" {
            assert!(completed.is_empty(), "premature checkpoint before batch 1");
        }
    }

    let records = export_records(harness.dir.path());
    assert_eq!(records.len(), 8);

    let mut urls: Vec<&str> = records.iter().map(|r| r["url"].as_str().unwrap()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 8, "export contains duplicate URLs");

    // Stock records carry sentiment, main records do not
    let main_count = records
        .iter()
        .filter(|r| r["news_type"] == "main")
        .count();
    assert_eq!(main_count, 2);
    for record in &records {
        if record["news_type"] == "stock" {
            assert!(record.get("sentiment").is_some());
        } else {
            assert!(record.get("sentiment").is_none());
        }
    }
}

/// 损坏的进度快照按全新运行处理
#[tokio::test]
async fn corrupt_snapshot_starts_a_fresh_run() {
    let server = article_server().await;
    let link = |n: usize| format!("{}/article/{n}", server.uri());

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("progress.json"), "{definitely not json").unwrap();

    let settings = {
        let mut s = test_settings(dir.path());
        s.paths.progress_file = dir.path().join("progress.json").display().to_string();
        s
    };
    let progress = ProgressStore::new(settings.paths.progress_file.clone());
    let link_source: Arc<dyn LinkSource> = Arc::new(FixedLinkSource {
        main: vec![link(1)],
        stocks: HashMap::new(),
        collected_codes: Arc::new(Mutex::new(Vec::new())),
        progress_file: None,
        checkpoint_log: Arc::new(Mutex::new(Vec::new())),
    });
    let fetcher: Arc<dyn DetailFetcher> = Arc::new(
        HttpFetchEngine::new("newsrs-test", Duration::from_secs(5)).unwrap(),
    );
    let sinks: Vec<Arc<dyn NewsSink>> =
        vec![Arc::new(JsonFileSink::new(settings.paths.output_dir.clone()))];
    let guard = ResourceGuard::new(1.0);

    let orchestrator = CrawlOrchestrator::new(
        settings,
        link_source,
        fetcher,
        Arc::new(LexiconClassifier),
        guard,
        progress,
        sinks,
        Vec::new(),
    )
    .unwrap();

    let summary = orchestrator.run().await.unwrap();
    assert_eq!(summary.articles, 1);

    let records = export_records(dir.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["news_type"], "main");
}
