// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 任务队列实现
pub mod work_queue;

pub use work_queue::{QueueItem, WorkQueue};
