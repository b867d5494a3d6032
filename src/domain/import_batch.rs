// ==========================================
// 生产订单组件导入 - 导入批次模型
// ==========================================
// ImportBatch: 一次上传文件对应的会话状态
// Progress: 按批次 ID 独立寻址的进度值对象
// ==========================================

use crate::domain::types::{BatchState, ImportStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Progress - 进度值对象
// ==========================================
// percentage 不存储，每次读取时由 (current, total) 计算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u64, // 已处理行数（0 ≤ current ≤ total）
    pub total: u64,   // 开始时的 row_count
    pub is_processing: bool,
}

impl Progress {
    /// 导入开始时的进度
    pub fn started(total: u64) -> Self {
        Self {
            current: 0,
            total,
            is_processing: true,
        }
    }

    /// 百分比（total = 0 时为 0）
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64) * 100.0
        }
    }
}

// ==========================================
// ProgressSnapshot - 进度轮询返回值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
    pub percentage: f64,
    pub is_processing: bool,
    pub state: String,
}

impl ProgressSnapshot {
    pub fn new(progress: Progress, state: BatchState) -> Self {
        Self {
            current: progress.current,
            total: progress.total,
            percentage: progress.percentage(),
            is_processing: progress.is_processing,
            state: state.to_string(),
        }
    }
}

// ==========================================
// NewImportBatch - 创建批次请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImportBatch {
    #[serde(skip)]
    pub file: Vec<u8>,
    pub file_name: Option<String>,
    pub target_product_code: String, // 目标订单要生产的产品
    pub target_quantity: f64,        // 目标订单生产数量
    pub auto_confirm: bool,          // 行处理后自动确认订单
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String, // 批次 ID（UUID）
    #[serde(skip)]
    pub file: Vec<u8>, // 原始文件内容
    pub file_name: Option<String>,
    pub target_product_code: String,
    pub target_quantity: f64,
    pub auto_confirm: bool,
    pub log: Option<String>,                  // 导入日志（done 时必有内容）
    pub state: BatchState,                    // 生命周期状态
    pub row_count: u64,                       // 计数阶段写入
    pub progress: Progress,                   // 进度
    pub import_status: Option<ImportStatus>,  // 未设置 / success / error
    pub order_id: Option<i64>,                // 已创建的目标订单
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportBatch {
    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.progress, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_total() {
        let p = Progress {
            current: 0,
            total: 0,
            is_processing: true,
        };
        assert_eq!(p.percentage(), 0.0);
    }

    #[test]
    fn test_percentage_derived_from_counters() {
        let p = Progress {
            current: 5,
            total: 20,
            is_processing: true,
        };
        assert!((p.percentage() - 25.0).abs() < f64::EPSILON);

        let snapshot = ProgressSnapshot::new(p, BatchState::Confirmed);
        assert_eq!(snapshot.state, "confirmed");
        assert!((snapshot.percentage - 25.0).abs() < f64::EPSILON);
    }
}
