// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单一新闻模板的提取规则
//!
//! 所有文章都渲染在同一套新闻正文模板上，选择器因此固定：
//! 标题、正文块、媒体logo、分类标签、发布时间戳和og:image缩略图。

use crate::domain::models::article::DATETIME_FORMAT;
use crate::utils::errors::EngineError;
use chrono::NaiveDateTime;
use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#title_area span").expect("valid selector"));
static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#dic_area").expect("valid selector"));
static SOURCE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".media_end_head_top_logo img").expect("valid selector"));
static CATEGORY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("em.media_end_categorize_item").expect("valid selector"));
static DATESTAMP_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".media_end_head_info_datestamp_time").expect("valid selector"));
static THUMBNAIL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property=\"og:image\"]").expect("valid selector"));

/// 未分类文章的默认标签
pub const DEFAULT_CATEGORY: &str = "미분류";

/// 从详情页提取出的字段集合
///
/// `content_html`保留正文块的序列化标记；`content_text`是
/// 剥离展示性子元素后的纯文本，仅供情感分类使用
#[derive(Debug, Clone)]
pub struct ArticleExtract {
    pub title: String,
    pub content_html: String,
    pub content_text: String,
    pub source: String,
    pub category: Vec<String>,
    pub published_at: NaiveDateTime,
    pub thumbnail_url: Option<String>,
}

/// 对单个文档执行提取
///
/// 标题、正文块、来源、时间戳任一缺失都是本次尝试的硬失败，
/// 返回可重试的`MissingField`；分类和缩略图缺失有默认值。
///
/// # 参数
///
/// * `html` - 详情页原始HTML
///
/// # 返回值
///
/// * `Ok(ArticleExtract)` - 提取成功
/// * `Err(EngineError::MissingField)` - 必需字段缺失
pub fn extract_article(html: &str) -> Result<ArticleExtract, EngineError> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(EngineError::MissingField("title"))?;

    let content_element = document
        .select(&CONTENT_SELECTOR)
        .next()
        .ok_or(EngineError::MissingField("content"))?;
    let content_html = content_element.html();
    let content_text = flatten_content_text(content_element);

    let source = document
        .select(&SOURCE_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("alt"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(EngineError::MissingField("source"))?;

    let mut category: Vec<String> = document
        .select(&CATEGORY_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if category.is_empty() {
        category.push(DEFAULT_CATEGORY.to_string());
    }

    let published_at = document
        .select(&DATESTAMP_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("data-date-time"))
        .and_then(|s| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok())
        .ok_or(EngineError::MissingField("published_at"))?;

    let thumbnail_url = document
        .select(&THUMBNAIL_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.to_string());

    Ok(ArticleExtract {
        title,
        content_html,
        content_text,
        source,
        category,
        published_at,
        thumbnail_url,
    })
}

/// 剥离展示性子元素的标签名
const STRIP_TAGS: [&str; 5] = ["img", "script", "style", "a", "b"];

/// 将正文块拍平为分类器输入文本
///
/// 跳过图片、脚本、样式、链接和粗体强调子树，
/// 其余文本节点拼接后做空白归一化
pub fn flatten_content_text(content: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_visible_text(*content, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_visible_text(node: NodeRef<'_, scraper::Node>, out: &mut String) {
    if let Some(element) = node.value().as_element() {
        if STRIP_TAGS.contains(&element.name()) {
            return;
        }
    }
    if let Some(text) = node.value().as_text() {
        out.push_str(text);
        return;
    }
    for child in node.children() {
        collect_visible_text(child, out);
    }
}
