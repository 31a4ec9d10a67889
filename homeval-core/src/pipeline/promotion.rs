//! Promotion stage: upload the accepted bundle to the serving location.

use crate::error::PipelineError;
use crate::pipeline::artifact::{EvaluationArtifact, PromotionArtifact};
use crate::storage::ObjectStore;
use std::sync::Arc;

pub struct ModelPusher {
    object_store: Arc<dyn ObjectStore>,
}

impl ModelPusher {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        Self { object_store }
    }

    /// Overwrite the champion key with the accepted model. The caller must
    /// only invoke this after a positive evaluation decision.
    pub async fn run(
        &self,
        evaluation: &EvaluationArtifact,
    ) -> Result<PromotionArtifact, PipelineError> {
        self.object_store
            .upload(&evaluation.trained_model_path, &evaluation.champion_key)
            .await
            .map_err(|e| PipelineError::Promotion(e.to_string()))?;
        tracing::info!(
            key = %evaluation.champion_key,
            changed_accuracy = evaluation.changed_accuracy,
            "promoted new champion model"
        );
        Ok(PromotionArtifact {
            champion_key: evaluation.champion_key.clone(),
            model_path: evaluation.trained_model_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalObjectStore;

    #[tokio::test]
    async fn test_promotion_overwrites_champion_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalObjectStore::new(dir.path().join("store")));

        let model_path = dir.path().join("model.json");
        std::fs::write(&model_path, b"{\"generation\":2}").unwrap();
        let evaluation = EvaluationArtifact {
            accepted: true,
            changed_accuracy: 0.05,
            challenger_r2: 0.7,
            champion_r2: Some(0.65),
            champion_key: "models/champion.json".into(),
            trained_model_path: model_path,
        };

        let pusher = ModelPusher::new(store.clone());
        let artifact = pusher.run(&evaluation).await.unwrap();
        assert_eq!(artifact.champion_key, "models/champion.json");
        assert!(store.exists("models/champion.json").await.unwrap());
    }
}
