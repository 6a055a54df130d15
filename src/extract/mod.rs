// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 新闻模板提取规则
pub mod article;

/// 情感分类
pub mod sentiment;

pub use article::{extract_article, ArticleExtract};
pub use sentiment::{LexiconClassifier, SentimentClassifier};
