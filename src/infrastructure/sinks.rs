// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ArticleRecord;
use crate::utils::errors::SinkError;
use async_trait::async_trait;
use chrono::Local;
use std::path::PathBuf;
use tracing::info;

/// 导出Sink特质
///
/// 终态结果集的出口。文档库后端通过同一接口接入，
/// 单个Sink失败由调用方记录，互不影响。
#[async_trait]
pub trait NewsSink: Send + Sync {
    /// Sink名称，用于日志
    fn name(&self) -> &str;

    /// 导出整个结果集
    async fn export(&self, records: &[ArticleRecord]) -> Result<(), SinkError>;
}

/// JSON文件Sink
///
/// 按运行时间戳命名，美化打印UTF-8输出
pub struct JsonFileSink {
    output_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn output_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.output_dir.join(format!("unified_news_{stamp}.json"))
    }
}

#[async_trait]
impl NewsSink for JsonFileSink {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn export(&self, records: &[ArticleRecord]) -> Result<(), SinkError> {
        let path = self.output_path();
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&path, json).await.map_err(SinkError::Io)?;
        info!(path = %path.display(), count = records.len(), "Export written");
        Ok(())
    }
}
