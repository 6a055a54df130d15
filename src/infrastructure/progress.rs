// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ArticleRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// 进度快照
///
/// 断点续爬的全部状态：已爬数据、已完成实体、主要新闻阶段标记。
/// 文件即真相，进程内不持有独立状态。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// 累计的文章记录
    #[serde(default)]
    pub crawled_data: Vec<ArticleRecord>,
    /// 已完成的股票代码
    #[serde(default)]
    pub completed_stocks: Vec<String>,
    /// 主要新闻阶段是否完成
    #[serde(default)]
    pub main_news_completed: bool,
}

/// 进度存储
///
/// 整体覆盖写的JSON快照。保存绝不向上抛错：快照失败最多损失
/// 一个检查点，不值得中断爬取。
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 保存快照（整体覆盖）
    pub fn save(&self, snapshot: &ProgressSnapshot) {
        let json = match serde_json::to_string_pretty(snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Progress snapshot serialization failed");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %e, "Progress snapshot write failed");
        } else {
            debug!(
                path = %self.path.display(),
                articles = snapshot.crawled_data.len(),
                completed = snapshot.completed_stocks.len(),
                "Progress saved"
            );
        }
    }

    /// 加载快照
    ///
    /// 文件缺失是全新运行；文件损坏按全新运行处理并告警，
    /// 宁可重爬也不中止
    pub fn load(&self) -> ProgressSnapshot {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => {
                info!(path = %self.path.display(), "No progress snapshot, starting fresh");
                return ProgressSnapshot::default();
            }
        };
        match serde_json::from_str::<ProgressSnapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    articles = snapshot.crawled_data.len(),
                    completed = snapshot.completed_stocks.len(),
                    main_done = snapshot.main_news_completed,
                    "Progress snapshot loaded"
                );
                snapshot
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt progress snapshot, starting fresh");
                ProgressSnapshot::default()
            }
        }
    }

    /// 运行完整成功后清除快照
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Progress snapshot removal failed");
            }
        }
    }
}
