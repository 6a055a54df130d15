// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::{NewsType, StockInfo};

/// 爬取目标
///
/// 由Orchestrator从静态实体清单创建，交给Link Collector消费。
/// 一个目标对应一个实体：主要新闻聚合页或单只股票。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTarget {
    /// 财经首页主要新闻
    MainNews,
    /// 单只股票的新闻列表
    StockNews {
        stock: StockInfo,
        max_pages: u32,
        max_links_per_page: usize,
    },
}

/// 任务类别
///
/// 标签化变体代替可选字段，两条新闻分支在编译期穷尽处理
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Main,
    Stock(StockInfo),
}

impl JobKind {
    pub fn news_type(&self) -> NewsType {
        match self {
            JobKind::Main => NewsType::Main,
            JobKind::Stock(_) => NewsType::Stock,
        }
    }

    pub fn stock_info(&self) -> Option<&StockInfo> {
        match self {
            JobKind::Main => None,
            JobKind::Stock(info) => Some(info),
        }
    }
}

/// 抓取任务
///
/// Link Collector产出、Work Queue传递、Detail Worker恰好消费一次。
/// 创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub url: String,
    pub kind: JobKind,
}

impl FetchJob {
    pub fn main(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: JobKind::Main,
        }
    }

    pub fn stock(url: impl Into<String>, stock: StockInfo) -> Self {
        Self {
            url: url.into(),
            kind: JobKind::Stock(stock),
        }
    }
}
