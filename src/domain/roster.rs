// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::StockInfo;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// CSV清单的一行
///
/// 列名沿用平台数据文件的驼峰式表头
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "stockCode")]
    stock_code: String,
    #[serde(rename = "stockName")]
    stock_name: String,
}

/// 从CSV文件读取股票清单
///
/// 文件缺失不是致命错误：记录警告并返回空清单，
/// 个股阶段随之被跳过。单行解析失败同样跳过该行。
///
/// # 参数
///
/// * `path` - stocks.csv 路径
///
/// # 返回值
///
/// 清单中的股票信息列表，可能为空
pub fn read_stocks_from_csv(path: &Path) -> Vec<StockInfo> {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Stock roster file unavailable, stocks phase will be skipped");
            return Vec::new();
        }
    };

    let mut stocks = Vec::new();
    for row in reader.deserialize::<RosterRow>() {
        match row {
            Ok(row) => stocks.push(StockInfo {
                // Excel exports prepend a BOM to the first header
                code: row.stock_code.trim_start_matches('\u{feff}').trim().to_string(),
                name: row.stock_name.trim().to_string(),
            }),
            Err(e) => {
                warn!(error = %e, "Skipping malformed roster row");
            }
        }
    }

    info!(path = %path.display(), count = stocks.len(), "Loaded stock roster");
    stocks
}
