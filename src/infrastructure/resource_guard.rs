// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tracing::{info, warn};

/// 资源门卫
///
/// 批间采样系统资源并决定是否施加背压。内存占用率是唯一
/// 否决信号；CPU只做信息性记录。采样失败视为通过，
/// 资源观测问题不能阻塞爬取本身。
pub struct ResourceGuard {
    system: Mutex<System>,
    memory_high_water: f64,
}

fn sampler() -> System {
    let mut sys = System::new_with_specifics(
        RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything()),
    );
    sys.refresh_all();
    sys
}

impl ResourceGuard {
    pub fn new(memory_high_water: f64) -> Self {
        Self {
            system: Mutex::new(sampler()),
            memory_high_water,
        }
    }

    /// 采样资源并判断是否可以继续下一批
    ///
    /// # 返回值
    ///
    /// * `true` - 资源充足或无法判断
    /// * `false` - 内存超过高水位，调用方应暂停
    pub fn check_resources(&self) -> bool {
        let mem_usage = {
            let mut sys = self.system.lock();
            sys.refresh_cpu_all();
            sys.refresh_memory();

            let cpu_usage = (sys.global_cpu_usage() / 100.0) as f64;

            let total_mem = sys.total_memory();
            if total_mem == 0 {
                // Sampling failed, let the batch proceed
                warn!("Memory sampling unavailable, skipping resource gate");
                return true;
            }
            let mem_usage = sys.used_memory() as f64 / total_mem as f64;

            info!(
                cpu = format!("{:.1}%", cpu_usage * 100.0),
                memory = format!("{:.1}%", mem_usage * 100.0),
                "Resource sample"
            );
            mem_usage
        };

        if mem_usage > self.memory_high_water {
            warn!(
                memory = format!("{:.1}%", mem_usage * 100.0),
                high_water = format!("{:.1}%", self.memory_high_water * 100.0),
                "Memory above high water, applying back-pressure"
            );
            self.reclaim();
            return false;
        }
        true
    }

    /// 尽力回收
    ///
    /// 丢弃并重建采样器，释放其内部缓存。检查点时调用。
    pub fn reclaim(&self) {
        *self.system.lock() = sampler();
    }
}
