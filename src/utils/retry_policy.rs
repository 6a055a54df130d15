// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 详情抓取使用线性退避：第N次失败后等待 (1 + N) 倍基准时间。
/// `max_attempts` 是总尝试次数，不是追加的重试次数。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 退避基准时间
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// 计算第attempt次（从0计）失败后的退避时间
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * (1 + attempt)
    }

    /// 失败的第attempt次尝试之后是否还应再试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}
