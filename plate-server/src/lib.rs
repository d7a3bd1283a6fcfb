//! Plate Server - CTP 制版生产订单与版材库存服务
//!
//! # 架构概述
//!
//! 核心是订单生命周期状态机 + 追加式版材库存台账：
//!
//! - **订单状态机** (`orders`): NEW → PROCESS → DONE 单向推进，创建时冻结
//!   工艺快照
//! - **库存台账** (`stock`): 带符号数量的追加式动向日志，库存永远是派生和
//! - **事件日志** (`audit`): 每个领域操作的写前审计记录
//! - **目录** (`directory`): 客户与版材型号档案（薄 CRUD 层）
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! plate-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── store/         # redb 存储层
//! ├── audit/         # 事件日志
//! ├── orders/        # 订单状态机 + 快照构建
//! ├── stock/         # 动向台账 + 缺货评估
//! ├── directory/     # 客户/版材型号档案
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod audit;
pub mod core;
pub mod directory;
pub mod orders;
pub mod stock;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, CoreError, Server, ServerState};
pub use orders::OrderService;
pub use stock::StockService;
pub use store::Store;
pub use utils::logger::init_logger_with_file;

/// 设置运行环境：dotenv、工作目录、日志
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    // .env 缺失不是错误（生产环境直接用环境变量）
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(Some(&config.log_level), log_dir.to_str());

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  __      __
   / __ \/ /___ _/ /____
  / /_/ / / __ `/ __/ _ \
 / ____/ / /_/ / /_/  __/
/_/   /_/\__,_/\__/\___/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
