//! 服务器状态 - 持有所有服务的共享引用
//!
//! ServerState 使用 Arc/Clone 语义在处理器之间浅拷贝，所有服务共享
//! 同一个 redb 数据库句柄，因此跨服务的写事务天然串行。

use std::sync::Arc;

use crate::audit::AuditTrail;
use crate::core::Config;
use crate::directory::Directory;
use crate::orders::{ConfiguredDotGainPolicy, OrderService};
use crate::stock::StockService;
use crate::store::Store;

/// 服务器状态
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项（不可变） |
/// | store | redb 存储层 |
/// | orders | 订单状态机 |
/// | stock | 库存台账服务 |
/// | directory | 客户/版材档案 |
/// | audit | 事件日志查询 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub store: Store,
    pub orders: OrderService,
    pub stock: StockService,
    pub directory: Directory,
    pub audit: AuditTrail,
}

impl ServerState {
    /// 初始化所有服务
    ///
    /// 打开（或创建）工作目录下的数据库并建表。
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;
        let store = Store::open(config.database_path())?;
        Ok(Self::with_store(config.clone(), store))
    }

    /// 基于已打开的存储组装服务（测试用内存后端走这里）
    pub fn with_store(config: Config, store: Store) -> Self {
        let audit = AuditTrail::new(store.clone());
        let policy = Arc::new(ConfiguredDotGainPolicy::new(
            config.dot_gain_client_ids.clone(),
        ));

        Self {
            orders: OrderService::new(store.clone(), audit.clone(), policy),
            stock: StockService::new(store.clone(), audit.clone()),
            directory: Directory::new(store.clone(), audit.clone()),
            audit,
            store,
            config: Arc::new(config),
        }
    }
}
