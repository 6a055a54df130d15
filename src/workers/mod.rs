// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 详情页消费者
pub mod detail_worker;

pub use detail_worker::{fetch_article_details, DetailWorker};
