use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Mistake {
    pub mistake: String,
    /// The full sentence the mistake occurs in.
    pub location: String,
    pub correction: String,
    pub explanation: String,
    pub error_type: String,
    pub rule: String,
}

/// Outcome of the grammar and orthography stage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Grade in the form `N/5`.
    pub grade: String,
    pub mistakes: Vec<Mistake>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Feedback {
    pub positive: String,
    pub improvement_suggestions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PartFeedback {
    pub part: String,
    pub feedback: Feedback,
}

/// Outcome of the semantic structure stage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SemanticAnalysisResult {
    pub data: Vec<PartFeedback>,
    pub overall_analysis: String,
    pub improved_text: String,
}

/// Stored result of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EssayRecord {
    pub evaluation: EvaluationResult,
    #[serde(rename = "semanticAnalysis")]
    pub semantic_analysis: SemanticAnalysisResult,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BatchAnalysis {
    /// One entry per submitted chunk, in submission order.
    pub data: Vec<PartFeedback>,
    pub overall_analysis: String,
    pub improve_analysis: String,
}

/// Stored result of `POST /ai_analyze`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BatchRecord {
    pub ai_analysis: BatchAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRecord {
    Essay(EssayRecord),
    Batch(BatchRecord),
}
