//! Phase 2: CORPUS_MODELS
//!
//! Normalize then estimate, independently per corpus. Each task writes only
//! files keyed by its own corpus index.

use super::{join_error, CorpusOutput, PipelineOrchestrator};
use crate::error::PipelineResult;
use crate::models::{ArtifactLayout, Corpus, CorpusStage, PipelineRun, PipelineState, WeightedModel};
use crate::services::{ModelBuilder, TextNormalizer};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

impl PipelineOrchestrator {
    /// Phase 2: CORPUS_MODELS - per-corpus normalization and estimation
    ///
    /// Returns outputs sorted by corpus index. The first failing corpus ends
    /// the phase; tasks already running are not interrupted and finish in
    /// the background, but their results are discarded.
    pub(super) async fn phase_corpus_models(
        &self,
        run: &mut PipelineRun,
        layout: &ArtifactLayout,
        corpora: &[Corpus],
    ) -> PipelineResult<Vec<CorpusOutput>> {
        self.transition(run, PipelineState::CorpusModels);

        let run_id = run.run_id;
        let jobs = self.inputs.jobs.max(1);

        tracing::info!(
            run_id = %run_id,
            corpora = corpora.len(),
            jobs,
            "Phase 2: CORPUS_MODELS"
        );

        let mut tasks = stream::iter(corpora.iter().cloned())
            .map(|corpus| {
                let normalizer = self.normalizer;
                let builder = self.model_builder.clone();
                let layout = layout.clone();
                async move { process_corpus(run_id, normalizer, builder, layout, corpus).await }
            })
            .buffer_unordered(jobs);

        let mut outputs = Vec::with_capacity(corpora.len());
        while let Some(result) = tasks.next().await {
            let output = result?;
            tracing::info!(
                run_id = %run_id,
                progress = format!("{}/{}", outputs.len() + 1, corpora.len()),
                corpus = output.corpus.index,
                "Corpus model ready"
            );
            outputs.push(output);
        }

        // Completion order is arbitrary; declared order is what weights follow
        outputs.sort_by_key(|o| o.corpus.index);
        Ok(outputs)
    }
}

/// NORMALIZING → BUILDING_MODEL → DONE for one corpus
async fn process_corpus(
    run_id: Uuid,
    normalizer: TextNormalizer,
    builder: ModelBuilder,
    layout: ArtifactLayout,
    corpus: Corpus,
) -> PipelineResult<CorpusOutput> {
    tracing::info!(
        run_id = %run_id,
        corpus = corpus.index,
        stage = %CorpusStage::Normalizing,
        source = %corpus.source_path.display(),
        "Corpus stage"
    );

    let normalized = {
        let corpus = corpus.clone();
        let output = layout.normalized_text(corpus.index);
        tokio::task::spawn_blocking(move || normalizer.normalize(&corpus, &output))
            .await
            .map_err(join_error)??
    };

    tracing::info!(
        run_id = %run_id,
        corpus = corpus.index,
        stage = %CorpusStage::BuildingModel,
        lines = normalized.line_count,
        normalized = %normalized.path.display(),
        "Corpus stage"
    );

    let model = {
        let normalized = normalized.clone();
        let layout = layout.clone();
        tokio::task::spawn_blocking(move || builder.build(&normalized, &layout))
            .await
            .map_err(join_error)??
    };

    tracing::info!(
        run_id = %run_id,
        corpus = corpus.index,
        stage = %CorpusStage::Done,
        intermediate = %model.intermediate_path.display(),
        "Corpus stage"
    );

    let weight = corpus.weight;
    Ok(CorpusOutput {
        corpus,
        normalized,
        model: WeightedModel { model, weight },
    })
}
