// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 浏览器抓取引擎（列表页）
pub mod browser_engine;

/// HTTP抓取引擎（详情页）
pub mod fetch_engine;

/// 引擎特质与响应类型
pub mod traits;

pub use browser_engine::BrowserEngine;
pub use fetch_engine::HttpFetchEngine;
pub use traits::{DetailFetcher, FetchResponse};
