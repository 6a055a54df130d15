// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::FetchJob;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// 队列元素
///
/// 真实任务或终止哨兵。哨兵只在生产侧全部入队完成后追加，
/// FIFO顺序保证消费者先排干所有真实任务再看到哨兵。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Job(FetchJob),
    PoisonPill,
}

/// 任务队列
///
/// 生产者/消费者共享的FIFO队列。入队顺序即服务顺序；
/// 完成顺序跨worker无序。`get`在队列为空时挂起等待。
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<QueueItem>>,
    notify: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入队任务
    pub fn put(&self, item: QueueItem) {
        self.items.lock().push_back(item);
        self.notify.notify_one();
    }

    /// 出队任务
    ///
    /// 队列为空时挂起当前任务，直到有新元素入队
    pub async fn get(&self) -> QueueItem {
        loop {
            // Register for wakeup before checking, so a concurrent put is not lost
            let notified = self.notify.notified();
            if let Some(item) = self.items.lock().pop_front() {
                return item;
            }
            notified.await;
        }
    }

    /// 当前队列长度（含哨兵）
    pub fn size(&self) -> usize {
        self.items.lock().len()
    }

    /// 关闭协议：为每个存活worker追加恰好一枚哨兵
    ///
    /// 只能在生产侧完成全部入队之后调用
    pub fn put_poison_pills(&self, workers: usize) {
        let mut items = self.items.lock();
        for _ in 0..workers {
            items.push_back(QueueItem::PoisonPill);
        }
        drop(items);
        // Wake every parked worker
        for _ in 0..workers {
            self.notify.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FetchJob;
    use std::sync::Arc;

    fn job(n: usize) -> QueueItem {
        QueueItem::Job(FetchJob::main(format!("https://example.com/{n}")))
    }

    #[tokio::test]
    async fn fifo_order_is_preserved() {
        let queue = WorkQueue::new();
        queue.put(job(1));
        queue.put(job(2));
        queue.put(job(3));

        assert_eq!(queue.get().await, job(1));
        assert_eq!(queue.get().await, job(2));
        assert_eq!(queue.get().await, job(3));
        assert_eq!(queue.size(), 0);
    }

    #[tokio::test]
    async fn get_suspends_until_put() {
        let queue = Arc::new(WorkQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.get().await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        queue.put(job(7));

        assert_eq!(waiter.await.unwrap(), job(7));
    }

    #[tokio::test]
    async fn all_jobs_drain_before_any_pill() {
        // N jobs then K pills: every consumer must see jobs first
        let queue = Arc::new(WorkQueue::new());
        for n in 0..10 {
            queue.put(job(n));
        }
        queue.put_poison_pills(3);

        let mut jobs_seen = 0;
        let mut pills_seen = 0;
        for _ in 0..13 {
            match queue.get().await {
                QueueItem::Job(_) => {
                    assert_eq!(pills_seen, 0, "job served after a pill");
                    jobs_seen += 1;
                }
                QueueItem::PoisonPill => pills_seen += 1,
            }
        }
        assert_eq!(jobs_seen, 10);
        assert_eq!(pills_seen, 3);
    }
}
