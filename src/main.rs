// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use newsrs::application::CrawlOrchestrator;
use newsrs::collector::{LinkCollector, LinkSource};
use newsrs::config::settings::Settings;
use newsrs::domain::roster::read_stocks_from_csv;
use newsrs::engines::browser_engine::BrowserEngine;
use newsrs::engines::fetch_engine::HttpFetchEngine;
use newsrs::engines::traits::DetailFetcher;
use newsrs::extract::sentiment::{LexiconClassifier, SentimentClassifier};
use newsrs::infrastructure::{JsonFileSink, NewsSink, ProgressStore, ResourceGuard};
use newsrs::utils::telemetry;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并执行一次爬取运行
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting newsrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Load the stock roster
    let roster = read_stocks_from_csv(Path::new(&settings.paths.stocks_csv));
    info!(stocks = roster.len(), "Roster loaded");

    // 4. Launch the listing browser
    let browser = Arc::new(BrowserEngine::launch(&settings.source).await?);
    info!("Browser engine ready");

    // 5. Initialize components
    let link_source: Arc<dyn LinkSource> = Arc::new(LinkCollector::new(
        browser.clone(),
        &settings.source,
        &settings.crawl,
    )?);
    let fetcher: Arc<dyn DetailFetcher> = Arc::new(HttpFetchEngine::new(
        &settings.source.user_agent,
        settings.source.fetch_timeout(),
    )?);
    let classifier: Arc<dyn SentimentClassifier> = Arc::new(LexiconClassifier);
    let guard = ResourceGuard::new(settings.crawl.memory_high_water);
    let progress = ProgressStore::new(settings.paths.progress_file.clone());
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
    )?;

    // 6. Run the pipeline, then tear the browser down on both paths
    let outcome = orchestrator.run().await;
    browser.close().await;

    match outcome {
        Ok(summary) => {
            info!(
                articles = summary.articles,
                elapsed = ?summary.elapsed,
                "newsrs finished"
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
