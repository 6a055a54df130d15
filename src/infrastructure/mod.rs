// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 断点续爬的进度快照
pub mod progress;

/// 批间资源门卫
pub mod resource_guard;

/// 结果导出Sink
pub mod sinks;

pub use progress::{ProgressSnapshot, ProgressStore};
pub use resource_guard::ResourceGuard;
pub use sinks::{JsonFileSink, NewsSink};
