// ==========================================
// 班产损失追踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::EntryApi;
use crate::config::config_manager::ConfigManager;
use crate::config::EngineConfig;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{EntryStore, HttpEntryStore, SqliteEntryStore};

/// 应用状态
///
/// 包含API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 已解析的引擎配置
    pub engine_config: EngineConfig,

    /// 生产记录存储 (本地或远程)
    pub entry_store: Arc<dyn EntryStore>,

    /// 生产记录API
    pub entry_api: Arc<EntryApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 配置了 store_base_url 时使用远程存储, 否则使用本地 SQLite
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::build(db_path, None)
    }

    /// 创建使用远程存储的AppState (覆盖配置中的地址)
    pub fn with_remote(db_path: String, base_url: &str) -> Result<Self, String> {
        Self::build(db_path, Some(base_url.to_string()))
    }

    fn build(db_path: String, remote_override: Option<String>) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // 配置
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let engine_config = config_manager
            .load_engine_config()
            .map_err(|e| format!("加载引擎配置失败: {}", e))?;

        let remote_url = match remote_override {
            Some(url) => Some(url),
            None => config_manager
                .get_store_base_url()
                .map_err(|e| format!("读取远程存储地址失败: {}", e))?,
        };

        // 存储
        let entry_store: Arc<dyn EntryStore> = match remote_url {
            Some(url) => {
                tracing::info!(base_url = %url, "使用远程存储");
                Arc::new(
                    HttpEntryStore::new(&url)
                        .map_err(|e| format!("无法创建HttpEntryStore: {}", e))?,
                )
            }
            None => Arc::new(SqliteEntryStore::new(conn, engine_config.clone())),
        };

        let entry_api = Arc::new(EntryApi::new(entry_store.clone(), &engine_config));

        tracing::info!(
            production_lines = ?engine_config.production_lines,
            "AppState初始化完成"
        );

        Ok(Self {
            db_path,
            config_manager,
            engine_config,
            entry_store,
            entry_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SHIFT_LOSS_TRACKER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("SHIFT_LOSS_TRACKER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shift_loss_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("shift-loss-tracker-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("shift-loss-tracker");

        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shift_loss_tracker.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_new_uses_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert_eq!(state.engine_config, EngineConfig::default());

        let summary = state.entry_api.daily_summary().await.unwrap();
        assert_eq!(summary.lines.len(), 2);
        assert!(summary.lines.iter().all(|l| l.is_empty()));
    }
}
