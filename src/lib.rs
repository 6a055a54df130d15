// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 爬取运行的编排逻辑
pub mod application;

/// 链接收集模块
///
/// 浏览器驱动的列表页链接发现
pub mod collector;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 核心业务实体：文章记录、爬取目标、股票清单
pub mod domain;

/// 引擎模块
///
/// 浏览器和HTTP两条取页路径
pub mod engines;

/// 提取模块
///
/// 新闻模板的字段提取和情感分类
pub mod extract;

/// 基础设施模块
///
/// 进度快照、资源门卫和导出Sink
pub mod infrastructure;

/// 队列模块
///
/// 生产者/消费者任务队列
pub mod queue;

/// 工具模块
///
/// 错误类型、重试策略和通用辅助功能
pub mod utils;

/// 工作器模块
///
/// 详情页消费者
pub mod workers;
