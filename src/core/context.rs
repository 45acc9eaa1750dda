//! SharedContext：单次运行内只追加的阶段产物存储
//!
//! 底层为 DashMap（分片锁），并行阶段各写各的键，无需全局锁；
//! 顺序编排下同一时刻只有一个写者。克隆只复制 Arc，所有克隆指向同一存储。

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::artifact::{Artifact, ArtifactFamily, StageId};
use crate::core::error::ContextError;
use crate::core::request::Request;

#[derive(Debug, Clone)]
pub struct SharedContext {
    run_id: Arc<str>,
    request: Arc<Request>,
    artifacts: Arc<DashMap<StageId, Arc<Artifact>>>,
}

impl SharedContext {
    pub fn new(request: Arc<Request>) -> Self {
        Self {
            run_id: Arc::from(format!("run_{}", uuid::Uuid::new_v4())),
            request,
            artifacts: Arc::new(DashMap::new()),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// 追加一个阶段产物；同一阶段已存在时拒绝，原有条目保持不变
    pub fn record(&self, artifact: Artifact) -> Result<(), ContextError> {
        match self.artifacts.entry(artifact.stage.clone()) {
            Entry::Occupied(_) => Err(ContextError::AlreadyRecorded(artifact.stage.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(artifact));
                Ok(())
            }
        }
    }

    pub fn get(&self, stage: &str) -> Option<Arc<Artifact>> {
        self.artifacts.get(stage).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.artifacts.contains_key(stage)
    }

    pub fn find_family(&self, family: ArtifactFamily) -> Option<Arc<Artifact>> {
        self.artifacts
            .iter()
            .find(|entry| entry.value().family == family)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// 按阶段标识排序的全部产物
    pub fn artifacts(&self) -> Vec<Arc<Artifact>> {
        let mut all: Vec<_> = self
            .artifacts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        all.sort_by(|a, b| a.stage.cmp(&b.stage));
        all
    }

    /// 有序快照，用于比较两次运行的合并结果
    pub fn snapshot(&self) -> BTreeMap<StageId, Artifact> {
        self.artifacts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().as_ref().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::{ArtifactPayload, CreativeSuggestion, Idea, StageInfo};
    use crate::core::error::FailureKind;

    fn suggestion(title: &str) -> ArtifactPayload {
        ArtifactPayload::CreativeSuggestion(CreativeSuggestion {
            ideas: vec![Idea {
                title: title.to_string(),
                details: vec![],
            }],
        })
    }

    #[test]
    fn test_record_and_get() {
        let ctx = SharedContext::new(Arc::new(Request::new("party")));
        let info = StageInfo::new("theme_designer", ArtifactFamily::Theme);
        ctx.record(info.completed(suggestion("Marigold Mela"))).unwrap();

        assert_eq!(ctx.len(), 1);
        assert!(ctx.contains("theme_designer"));
        let artifact = ctx.get("theme_designer").unwrap();
        assert_eq!(artifact.creative().unwrap().ideas[0].title, "Marigold Mela");
        assert!(ctx.find_family(ArtifactFamily::Theme).is_some());
        assert!(ctx.find_family(ArtifactFamily::Menu).is_none());
    }

    #[test]
    fn test_append_only() {
        let ctx = SharedContext::new(Arc::new(Request::default()));
        let info = StageInfo::new("menu_mixologist", ArtifactFamily::Menu);
        ctx.record(info.completed(suggestion("Chaat Counter"))).unwrap();

        let err = ctx
            .record(info.failed(FailureKind::Timeout, "late"))
            .unwrap_err();
        assert_eq!(err, ContextError::AlreadyRecorded("menu_mixologist".into()));

        // 原条目未被覆盖
        assert!(!ctx.get("menu_mixologist").unwrap().is_failed());
    }

    #[test]
    fn test_clones_share_store() {
        let ctx = SharedContext::new(Arc::new(Request::default()));
        let clone = ctx.clone();
        clone
            .record(StageInfo::new("a", ArtifactFamily::Theme).completed(suggestion("x")))
            .unwrap();
        assert!(ctx.contains("a"));
        assert_eq!(ctx.run_id(), clone.run_id());
    }

    #[tokio::test]
    async fn test_concurrent_distinct_writes() {
        let ctx = SharedContext::new(Arc::new(Request::default()));
        let mut handles = Vec::new();
        for i in 0..16 {
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                let info = StageInfo::new(format!("stage_{i:02}"), ArtifactFamily::Activity);
                ctx.record(info.completed(suggestion("idea"))).unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(ctx.len(), 16);
        let ids: Vec<_> = ctx.artifacts().iter().map(|a| a.stage.to_string()).collect();
        assert_eq!(ids.first().map(String::as_str), Some("stage_00"));
        assert_eq!(ids.last().map(String::as_str), Some("stage_15"));
    }
}
