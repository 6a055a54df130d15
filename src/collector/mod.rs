// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 浏览器驱动的链接收集
pub mod link_collector;

pub use link_collector::{LinkCollector, LinkSource, PageOutcome};
