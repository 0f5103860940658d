use crate::llm::{ChatMessage, ModelClient, ProviderError};
use crate::normalize::{self, InvalidModelOutput};
use crate::prompt::{self, PromptError};
use common::models::{
    BatchAnalysis, EvaluationResult, Feedback, PartFeedback, SemanticAnalysisResult,
};
use futures::{StreamExt, TryStreamExt, stream};
use log::{debug, error};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("model call failed: {0}")]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    InvalidModelOutput(#[from] InvalidModelOutput),
    #[error("model returned grade `{0}`, expected N/5")]
    UnexpectedGrade(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

#[derive(Debug, Clone)]
pub struct EssayAnalysis {
    pub evaluation: EvaluationResult,
    pub semantic_analysis: SemanticAnalysisResult,
}

#[derive(Deserialize)]
struct ChunkReply {
    feedback: Feedback,
}

#[derive(Deserialize)]
struct SummaryReply {
    overall_analysis: String,
    improve_analysis: String,
}

/// Runs the prompt chains against a model.
pub struct Analyzer {
    client: Arc<dyn ModelClient>,
    chunk_concurrency: usize,
}

impl Analyzer {
    pub fn new(client: Arc<dyn ModelClient>, chunk_concurrency: usize) -> Self {
        Analyzer {
            client,
            chunk_concurrency: chunk_concurrency.max(1),
        }
    }

    /// Grammar evaluation followed by a semantic analysis grounded on it.
    pub async fn analyze_essay(&self, text: &str) -> Result<EssayAnalysis, AnalysisError> {
        let evaluation = self.evaluate(text).await?;
        debug!(
            "Evaluation graded {} with {} mistake(s)",
            evaluation.grade,
            evaluation.mistakes.len()
        );
        let semantic_analysis = self.analyze_semantics(text, &evaluation).await?;
        Ok(EssayAnalysis {
            evaluation,
            semantic_analysis,
        })
    }

    pub async fn evaluate(&self, text: &str) -> Result<EvaluationResult, AnalysisError> {
        let evaluation: EvaluationResult =
            self.ask("evaluation", prompt::evaluation(text)?).await?;
        if !is_valid_grade(&evaluation.grade) {
            return Err(AnalysisError::UnexpectedGrade(evaluation.grade));
        }
        Ok(evaluation)
    }

    pub async fn analyze_semantics(
        &self,
        text: &str,
        evaluation: &EvaluationResult,
    ) -> Result<SemanticAnalysisResult, AnalysisError> {
        self.ask("semantic", prompt::semantic(text, evaluation)?).await
    }

    /// Analyzes every chunk, then summarizes all of them. `data` follows the order of `texts`.
    pub async fn analyze_batch(&self, texts: &[String]) -> Result<BatchAnalysis, AnalysisError> {
        let data = stream::iter(texts.iter().cloned())
            .map(|text| self.analyze_chunk(text))
            .buffered(self.chunk_concurrency)
            .try_collect::<Vec<_>>()
            .await?;
        debug!("Analyzed {} chunk(s), requesting summary", data.len());

        let summary: SummaryReply = self.ask("summary", prompt::summary(texts)?).await?;
        Ok(BatchAnalysis {
            data,
            overall_analysis: summary.overall_analysis,
            improve_analysis: summary.improve_analysis,
        })
    }

    async fn analyze_chunk(&self, text: String) -> Result<PartFeedback, AnalysisError> {
        let reply: ChunkReply = self.ask("chunk", prompt::chunk(&text)?).await?;
        Ok(PartFeedback {
            part: text,
            feedback: reply.feedback,
        })
    }

    async fn ask<T: DeserializeOwned>(
        &self,
        stage: &str,
        prompt: String,
    ) -> Result<T, AnalysisError> {
        let raw = self.client.complete(&[ChatMessage::user(prompt)]).await?;
        normalize::parse(&raw).map_err(|err| {
            error!("Unparseable {stage} reply ({err}): {}", err.raw);
            AnalysisError::from(err)
        })
    }
}

fn is_valid_grade(grade: &str) -> bool {
    match grade.split_once('/') {
        Some((score, scale)) => {
            scale.trim() == "5"
                && score
                    .trim()
                    .parse::<f32>()
                    .is_ok_and(|score| (0.0..=5.0).contains(&score))
        }
        None => false,
    }
}
