// ==========================================
// 生产订单组件导入 - 领域类型定义
// ==========================================
// 序列化格式: snake_case（与数据库一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 导入批次状态 (Batch State)
// ==========================================
// 单向流转: draft → confirmed → done（done 为终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Draft,     // 已上传，未确认行数
    Confirmed, // 已确认行数，可执行导入
    Done,      // 导入结束（成功或失败）
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Draft => "draft",
            BatchState::Confirmed => "confirmed",
            BatchState::Done => "done",
        }
    }

    /// 是否允许迁移到目标状态（只允许前进一步）
    pub fn can_transition_to(&self, next: BatchState) -> bool {
        matches!(
            (self, next),
            (BatchState::Draft, BatchState::Confirmed) | (BatchState::Confirmed, BatchState::Done)
        )
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(BatchState::Draft),
            "confirmed" => Ok(BatchState::Confirmed),
            "done" => Ok(BatchState::Done),
            other => Err(format!("未知的批次状态: {}", other)),
        }
    }
}

// ==========================================
// 导入结果状态 (Import Status)
// ==========================================
// 未设置时以 Option::None 表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Success, // 全部行成功
    Error,   // 预检中止 / 致命错误 / 存在失败行
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "success",
            ImportStatus::Error => "error",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "success" => Ok(ImportStatus::Success),
            "error" => Ok(ImportStatus::Error),
            other => Err(format!("未知的导入状态: {}", other)),
        }
    }
}

// ==========================================
// 生产订单状态 (Order State)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,     // 新建
    Confirmed, // 已确认（auto_confirm）
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Draft => "draft",
            OrderState::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(OrderState::Draft),
            "confirmed" => Ok(OrderState::Confirmed),
            other => Err(format!("未知的订单状态: {}", other)),
        }
    }
}
