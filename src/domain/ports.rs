use crate::domain::model::{PortfolioRecord, TemplateDocument};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 外部紀錄儲存：以公開代稱查詢作品集
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 找不到時回傳 `Ok(None)`，只有上游故障才回傳錯誤
    async fn fetch(&self, handle: &str) -> Result<Option<PortfolioRecord>>;
}

/// 模板來源：依模板 ID 取得原始標記與插入點清單
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn load(&self, template_id: &str) -> Result<TemplateDocument>;
}
