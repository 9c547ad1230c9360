// ==========================================
// 班产损失追踪系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 默认产线
pub const DEFAULT_PRODUCTION_LINES: [u32; 2] = [1, 2];

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    /// 产线列表 (JSON 数组, 如 "[1,2]")
    pub const PRODUCTION_LINES: &str = "production_lines";
    /// 远程存储地址 (HttpEntryStore)
    pub const STORE_BASE_URL: &str = "store_base_url";
}

// ==========================================
// EngineConfig - 引擎配置 (解析后的值)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 有效产线 (同时决定汇总输出顺序)
    pub production_lines: Vec<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            production_lines: DEFAULT_PRODUCTION_LINES.to_vec(),
        }
    }
}

impl EngineConfig {
    pub fn is_known_line(&self, line_number: u32) -> bool {
        self.production_lines.contains(&line_number)
    }
}

/// 解析产线列表配置
///
/// 格式错误、为空时返回 None; 重复项保留首次出现
pub fn parse_production_lines(raw: &str) -> Option<Vec<u32>> {
    let parsed: Vec<u32> = serde_json::from_str(raw).ok()?;
    let mut lines = Vec::with_capacity(parsed.len());
    for line in parsed {
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 获取产线列表
    ///
    /// # 说明
    /// 配置不存在时使用默认产线 [1, 2]；
    /// 格式错误或为空时记录告警并回退到默认值
    pub fn get_production_lines(&self) -> Result<Vec<u32>, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::PRODUCTION_LINES)? {
            Some(v) => v,
            None => return Ok(DEFAULT_PRODUCTION_LINES.to_vec()),
        };

        Ok(parse_production_lines(&raw).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::PRODUCTION_LINES,
                raw_value = %raw,
                "产线配置格式错误，使用默认产线"
            );
            DEFAULT_PRODUCTION_LINES.to_vec()
        }))
    }

    /// 写入产线列表
    pub fn set_production_lines(&self, lines: &[u32]) -> Result<(), Box<dyn Error>> {
        let raw = serde_json::to_string(lines)?;
        self.set_config_value(config_keys::PRODUCTION_LINES, &raw)
    }

    /// 获取远程存储地址（可选）
    pub fn get_store_base_url(&self) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::STORE_BASE_URL)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// 加载引擎配置
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        Ok(EngineConfig {
            production_lines: self.get_production_lines()?,
        })
    }
}
