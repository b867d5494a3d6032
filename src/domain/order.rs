// ==========================================
// 生产订单组件导入 - 订单领域模型
// ==========================================
// 主数据（产品/单位/公司/库位/用户/仓库路线）由外部系统维护，本模块只读
// 生产订单与组件行（TargetLine）由导入引擎创建
// ==========================================

use crate::domain::types::OrderState;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 主数据（只读）
// ==========================================

/// 产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub default_code: Option<String>, // 外部编码（导入文件中的 Product 列）
    pub uom_id: i64,                  // 默认计量单位
    pub active: bool,
}

/// 计量单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uom {
    pub uom_id: i64,
    pub name: String,
    pub active: bool,
}

/// 公司
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub company_id: i64,
    pub name: String,
}

/// 库位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: i64,
    pub name: String,
}

/// 用户（Responsible 列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
}

/// 仓库生产路线：组件领料的默认源/目的库位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseRouting {
    pub warehouse_id: i64,
    pub company_id: i64,
    pub location_src_id: i64,
    pub location_dest_id: i64,
}

// ==========================================
// ProductionOrder - 生产订单（批次唯一目标订单）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductionOrder {
    pub product_id: i64,
    pub product_qty: f64,
    pub uom_id: i64,
    pub company_id: i64,
    pub warehouse_id: i64,
    pub location_src_id: i64,
    pub location_dest_id: i64,
    pub origin: Option<String>, // 来源（导入文件名）
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub order_id: i64,
    pub product_id: i64,
    pub product_qty: f64,
    pub uom_id: i64,
    pub company_id: i64,
    pub warehouse_id: i64,
    pub location_src_id: i64,
    pub location_dest_id: i64,
    pub state: OrderState,
    pub component_count: i64, // 已落库组件行数（按行 savepoint 维护）
    pub origin: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// TargetLine - 组件消耗行
// ==========================================
// 每个有效数据行落一条；创建后本引擎不再修改或删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTargetLine {
    pub order_id: i64,
    pub name: String, // 产品名称
    pub product_id: i64,
    pub quantity: f64, // > 0
    pub uom_id: i64,
    pub location_src_id: i64,
    pub location_dest_id: i64,
    pub company_id: i64,
    pub warehouse_id: i64,
    pub origin: Option<String>,                // Reference 列
    pub date_planned: Option<NaiveDateTime>,   // Planned Start 列
    pub responsible_id: Option<i64>,           // Responsible 列
    pub priority: Option<i64>,                 // Priority 列
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLine {
    pub move_id: i64,
    #[serde(flatten)]
    pub line: NewTargetLine,
    pub created_at: DateTime<Utc>,
}
