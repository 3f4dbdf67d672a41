//! 报告存储
//!
//! 每次生成写两份：带时间戳的单独记录，以及追加进唯一的主索引文件。
//! 主索引的读-改-写由存储自身的互斥锁串行化，避免并发写者丢失更新。

use chrono::Local;
use cxr_core::{CxrError, Report, Result};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// 主索引文件名
const MASTER_INDEX: &str = "reports.json";

/// 报告存储管理器
pub struct ReportStore {
    base_dir: PathBuf,
    index_lock: Mutex<()>,
}

impl ReportStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            index_lock: Mutex::new(()),
        }
    }

    /// 主索引文件路径
    pub fn master_index_path(&self) -> PathBuf {
        self.base_dir.join(MASTER_INDEX)
    }

    /// 保存一份报告
    ///
    /// 返回（单独记录路径，主索引路径）。主索引内容损坏时按空列表
    /// 重建，保证后续写入可用，不为无法读取的历史中止。
    pub async fn save(&self, data_name: &str, report_content: &str) -> Result<(PathBuf, PathBuf)> {
        tokio::fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            CxrError::Persistence(format!(
                "无法创建报告目录 {}: {}",
                self.base_dir.display(),
                e
            ))
        })?;

        let now = Local::now();
        let report = Report {
            data_name: data_name.to_string(),
            report_content: report_content.to_string(),
            created_at: now.timestamp(),
            created_at_str: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let individual_path = self
            .base_dir
            .join(format!("report_{}.json", now.format("%Y%m%d%H%M%S")));
        let payload = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(&individual_path, payload)
            .await
            .map_err(|e| {
                CxrError::Persistence(format!("报告写入失败 {}: {}", individual_path.display(), e))
            })?;

        let master_path = self.master_index_path();
        {
            let _guard = self.index_lock.lock().await;
            let mut reports = self.read_index(&master_path).await;
            reports.push(report);
            let payload = serde_json::to_string_pretty(&reports)?;
            tokio::fs::write(&master_path, payload).await.map_err(|e| {
                CxrError::Persistence(format!("主索引写入失败 {}: {}", master_path.display(), e))
            })?;
        }

        info!(
            "Report saved to {} and {}",
            individual_path.display(),
            master_path.display()
        );
        Ok((individual_path, master_path))
    }

    /// 读取主索引，缺失或损坏时返回空列表
    async fn read_index(&self, path: &Path) -> Vec<Report> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => match serde_json::from_str::<Vec<Report>>(&text) {
                Ok(reports) => reports,
                Err(e) => {
                    warn!(
                        "Master index {} unreadable ({}), starting a fresh list",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    /// 按创建时间倒序返回最多limit条报告
    ///
    /// 相同时间戳的条目按原插入顺序稳定排列；索引不存在时返回空序列。
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<Report>> {
        let master_path = self.master_index_path();
        let mut reports = self.read_index(&master_path).await;
        reports.sort_by_key(|report| std::cmp::Reverse(report.created_at));
        reports.truncate(limit);
        Ok(reports)
    }

    /// 按路径加载单独报告记录
    pub async fn load(&self, path: &Path) -> Result<Report> {
        if !path.exists() {
            return Err(CxrError::NotFound(format!(
                "报告文件不存在: {}",
                path.display()
            )));
        }
        let text = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, ReportStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        (dir, store)
    }

    async fn write_index(store: &ReportStore, reports: &[Report]) {
        tokio::fs::create_dir_all(store.master_index_path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(
            store.master_index_path(),
            serde_json::to_string_pretty(reports).unwrap(),
        )
        .await
        .unwrap();
    }

    fn report(name: &str, created_at: i64) -> Report {
        Report {
            data_name: name.to_string(),
            report_content: format!("content of {}", name),
            created_at,
            created_at_str: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let (_dir, store) = store();

        let (individual, master) = store.save("x.jpg", "hello").await.unwrap();
        assert!(individual.exists());
        assert!(master.exists());

        let recent = store.get_recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].data_name, "x.jpg");
        assert_eq!(recent[0].report_content, "hello");

        // 可读时间串与epoch秒表示同一时刻
        let naive = chrono::NaiveDateTime::parse_from_str(
            &recent[0].created_at_str,
            "%Y-%m-%d %H:%M:%S",
        )
        .unwrap();
        let parsed = Local.from_local_datetime(&naive).single().unwrap();
        assert_eq!(parsed.timestamp(), recent[0].created_at);
    }

    #[tokio::test]
    async fn test_recent_ordering_newest_first() {
        let (_dir, store) = store();
        write_index(
            &store,
            &[report("a", 100), report("b", 300), report("c", 200)],
        )
        .await;

        let recent = store.get_recent(2).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|r| r.data_name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let (_dir, store) = store();
        write_index(&store, &[report("first", 100), report("second", 100)]).await;

        let recent = store.get_recent(10).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|r| r.data_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_get_recent_without_index() {
        let (_dir, store) = store();
        assert!(store.get_recent(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_index_starts_fresh() {
        let (_dir, store) = store();
        tokio::fs::create_dir_all(store.master_index_path().parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(store.master_index_path(), "{ not a list")
            .await
            .unwrap();

        store.save("x.jpg", "hello").await.unwrap();
        let recent = store.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].data_name, "x.jpg");
    }

    #[tokio::test]
    async fn test_load_missing_report() {
        let (dir, store) = store();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            store.load(&missing).await,
            Err(CxrError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_individual_report() {
        let (_dir, store) = store();
        let (individual, _) = store.save("y.jpg", "draft").await.unwrap();

        let loaded = store.load(&individual).await.unwrap();
        assert_eq!(loaded.data_name, "y.jpg");
        assert_eq!(loaded.report_content, "draft");
    }
}
