// ==========================================
// 生产订单组件导入 - 进度跟踪
// ==========================================
// 职责: 维护单个批次的内存进度，并按固定间隔落库
// 规则:
// - start: 写入 {0, total, is_processing = true}，返回 ProcessingGuard
// - advance: current 单调不减且不超过 total；每 N 行或最后一行落库
// - ProcessingGuard 析构时写入 is_processing = false（含 panic 展开路径）
// ==========================================

use crate::domain::import_batch::Progress;
use crate::repository::{ImportBatchRepository, RepositoryResult};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

pub struct ProgressTracker<'a> {
    repo: &'a dyn ImportBatchRepository,
    batch_id: String,
    progress: Progress,
    flush_every: u64,
}

impl<'a> ProgressTracker<'a> {
    /// 开始处理：写入初始进度并占用处理标记
    ///
    /// # 参数
    /// - total: 批次 row_count
    /// - flush_every: 落库间隔（0 按 1 处理）
    pub fn start(
        repo: &'a dyn ImportBatchRepository,
        batch_id: &str,
        total: u64,
        flush_every: u64,
    ) -> RepositoryResult<ProcessingGuard<'a>> {
        let tracker = Self {
            repo,
            batch_id: batch_id.to_string(),
            progress: Progress::started(total),
            flush_every: flush_every.max(1),
        };
        tracker.flush()?;
        Ok(ProcessingGuard { tracker })
    }

    /// 记录已处理行数
    ///
    /// # 参数
    /// - done: 已处理行数（含失败行）
    /// - is_last: 是否为文件最后一行
    pub fn advance(&mut self, done: u64, is_last: bool) -> RepositoryResult<()> {
        let capped = done.min(self.progress.total);
        if capped > self.progress.current {
            self.progress.current = capped;
        }

        if done % self.flush_every == 0 || is_last {
            self.flush()?;
        }
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    fn flush(&self) -> RepositoryResult<()> {
        debug!(
            batch_id = %self.batch_id,
            current = self.progress.current,
            total = self.progress.total,
            is_processing = self.progress.is_processing,
            "写入导入进度"
        );
        self.repo.write_progress(&self.batch_id, &self.progress)
    }
}

// ==========================================
// ProcessingGuard - 处理标记守卫
// ==========================================
pub struct ProcessingGuard<'a> {
    tracker: ProgressTracker<'a>,
}

impl<'a> Deref for ProcessingGuard<'a> {
    type Target = ProgressTracker<'a>;

    fn deref(&self) -> &Self::Target {
        &self.tracker
    }
}

impl<'a> DerefMut for ProcessingGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tracker
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.progress.is_processing = false;
        if let Err(e) = self.tracker.flush() {
            warn!(
                batch_id = %self.tracker.batch_id,
                error = %e,
                "释放处理标记失败"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import_batch::{ImportBatch, NewImportBatch, ProgressSnapshot};
    use crate::repository::{BatchUpdate, RepositoryError};
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Mutex;

    /// 仅记录进度写入的仓储
    #[derive(Default)]
    struct RecordingRepo {
        writes: Mutex<Vec<Progress>>,
    }

    impl RecordingRepo {
        fn writes(&self) -> Vec<Progress> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl ImportBatchRepository for RecordingRepo {
        fn insert_batch(&self, _batch: &NewImportBatch) -> RepositoryResult<String> {
            Err(RepositoryError::InternalError("unused".to_string()))
        }

        fn find_batch(&self, _batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
            Ok(None)
        }

        fn update_batch(&self, _batch_id: &str, _update: &BatchUpdate) -> RepositoryResult<()> {
            Ok(())
        }

        fn write_progress(&self, _batch_id: &str, progress: &Progress) -> RepositoryResult<()> {
            self.writes.lock().unwrap().push(*progress);
            Ok(())
        }

        fn read_progress(&self, _batch_id: &str) -> RepositoryResult<Option<ProgressSnapshot>> {
            Ok(None)
        }
    }

    #[test]
    fn test_flush_cadence_and_release() {
        let repo = RecordingRepo::default();
        {
            let mut guard = ProgressTracker::start(&repo, "b1", 25, 10).unwrap();
            for done in 1..=25 {
                guard.advance(done, done == 25).unwrap();
            }
            assert!(guard.progress().is_processing);
        }

        let writes = repo.writes();
        let currents: Vec<u64> = writes.iter().map(|p| p.current).collect();
        // start, 10, 20, 最后一行, 释放
        assert_eq!(currents, vec![0, 10, 20, 25, 25]);
        assert!(writes[..4].iter().all(|p| p.is_processing));
        assert!(!writes[4].is_processing);
        assert!(writes.iter().all(|p| p.total == 25));
    }

    #[test]
    fn test_current_is_monotonic_and_capped() {
        let repo = RecordingRepo::default();
        let mut guard = ProgressTracker::start(&repo, "b1", 3, 1).unwrap();
        guard.advance(2, false).unwrap();
        guard.advance(1, false).unwrap();
        assert_eq!(guard.progress().current, 2);
        guard.advance(9, true).unwrap();
        assert_eq!(guard.progress().current, 3);
    }

    #[test]
    fn test_flag_released_on_panic() {
        let repo = RecordingRepo::default();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut guard = ProgressTracker::start(&repo, "b1", 10, 10).unwrap();
            guard.advance(4, false).unwrap();
            panic!("row processing blew up");
        }));
        assert!(result.is_err());

        let last = *repo.writes().last().unwrap();
        assert!(!last.is_processing);
        assert_eq!(last.current, 4);
    }
}
