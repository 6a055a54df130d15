// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 错误类型定义
pub mod errors;

/// 重试策略
pub mod retry_policy;

/// 日志初始化
pub mod telemetry;

/// URL处理工具
pub mod url_utils;
