// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 文章记录与新闻类型
pub mod article;

/// 爬取目标与抓取任务
pub mod target;

pub use article::{ArticleRecord, NewsType, Sentiment, StockInfo};
pub use target::{CrawlTarget, FetchJob, JobKind};
