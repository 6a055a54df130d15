// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 新闻类型枚举
///
/// 区分综合主要新闻和个股新闻，决定记录是否携带情感标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsType {
    /// 主要新闻（财经首页聚合）
    Main,
    /// 个股新闻
    Stock,
}

impl fmt::Display for NewsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsType::Main => write!(f, "main"),
            NewsType::Stock => write!(f, "stock"),
        }
    }
}

/// 股票信息
///
/// 来自股票清单CSV的一行，标识单个爬取主体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// 股票代码，如 005930
    pub code: String,
    /// 股票名称，如 삼성전자
    pub name: String,
}

/// 情感标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// 文章记录
///
/// 爬取输出的最小单元。由Detail Worker在成功提取后创建，
/// 追加到共享结果集中，之后不再修改。`url`保存重定向解析后的
/// 最终地址，而不是最初入队的地址。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub news_type: NewsType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    /// 最终URL（重定向解析后）
    pub url: String,
    pub title: String,
    /// 正文块的序列化HTML，保留原始排版
    pub content: String,
    /// 媒体来源名（取自logo图片alt属性）
    pub source: String,
    /// 分类标签，未分类时为["미분류"]
    pub category: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// 发布时间，格式 %Y-%m-%d %H:%M:%S
    pub published_at: String,
    /// 爬取时间，格式 %Y-%m-%d %H:%M:%S
    pub crawled_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// 原始页面的日期时间格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 按原始平台的格式序列化时间戳
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}
