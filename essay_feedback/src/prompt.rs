//! Prompt texts sent to the model.
//!
//! The JSON shapes in the templates sit inside `{% raw %}` blocks, so neither
//! they nor interpolated essay text and evaluation JSON are ever treated as
//! template syntax.

use askama::Template;
use common::models::EvaluationResult;

#[derive(Template)]
#[template(path = "evaluation.txt")]
struct EvaluationPrompt<'a> {
    text: &'a str,
}

#[derive(Template)]
#[template(path = "semantic.txt")]
struct SemanticPrompt<'a> {
    text: &'a str,
    evaluation: &'a str,
}

#[derive(Template)]
#[template(path = "chunk.txt")]
struct ChunkPrompt<'a> {
    text: &'a str,
}

#[derive(Template)]
#[template(path = "summary.txt")]
struct SummaryPrompt<'a> {
    text: &'a str,
}

#[derive(thiserror::Error, Debug)]
pub enum PromptError {
    #[error("failed to serialize evaluation: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to render prompt: {0}")]
    Render(#[from] askama::Error),
}

pub fn evaluation(text: &str) -> Result<String, PromptError> {
    Ok(EvaluationPrompt { text }.render()?)
}

pub fn semantic(text: &str, evaluation: &EvaluationResult) -> Result<String, PromptError> {
    let evaluation = serialize_evaluation(evaluation)?;
    Ok(SemanticPrompt {
        text,
        evaluation: &evaluation,
    }
    .render()?)
}

pub fn chunk(text: &str) -> Result<String, PromptError> {
    Ok(ChunkPrompt { text }.render()?)
}

/// `chunks` are joined with single spaces.
pub fn summary(chunks: &[String]) -> Result<String, PromptError> {
    Ok(SummaryPrompt {
        text: &chunks.join(" "),
    }
    .render()?)
}

pub fn serialize_evaluation(evaluation: &EvaluationResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::Mistake;

    fn sample_evaluation() -> EvaluationResult {
        EvaluationResult {
            grade: "3/5".to_string(),
            mistakes: vec![Mistake {
                mistake: "He go".to_string(),
                location: "He go to school.".to_string(),
                correction: "He goes".to_string(),
                explanation: "Third person singular takes -s.".to_string(),
                error_type: "Subject-Verb Agreement".to_string(),
                rule: "Present simple agreement".to_string(),
            }],
        }
    }

    #[test]
    fn evaluation_prompt_has_single_brace_shape_once() {
        let prompt = evaluation("My essay.").unwrap();

        assert!(prompt.starts_with("Evaluate the following essay My essay., providing"));
        assert!(prompt.contains("Essay:\nMy essay.\n"));
        assert_eq!(prompt.matches("My essay.").count(), 2);
        assert!(prompt.contains("Strictly return valid JSON."));
        assert_eq!(prompt.matches("\"grade\": \"\"").count(), 1);
        assert_eq!(prompt.matches("\"error_type\": \"\"").count(), 1);
        assert!(!prompt.contains("{{"));
        assert!(!prompt.contains("}}"));
        assert!(!prompt.contains("{%"));
    }

    #[test]
    fn essay_braces_are_kept_verbatim() {
        let text = "Use {name} and {{ twice }} and {% raw %} here.";
        let prompt = evaluation(text).unwrap();
        assert!(prompt.contains(text));
    }

    #[test]
    fn semantic_prompt_embeds_evaluation() {
        let evaluation = sample_evaluation();
        let prompt = semantic("My essay.", &evaluation).unwrap();

        assert!(
            prompt.starts_with("Perform an in-depth analysis of the following essay My essay.:")
        );
        assert!(prompt.contains("Essay:\nMy essay.\n"));
        assert!(prompt.contains(&serialize_evaluation(&evaluation).unwrap()));
        assert!(prompt.contains("\"improved_text\": \"\""));
        assert!(prompt.contains("4-8 distinct semantic parts"));
        assert_eq!(prompt.matches("\"overall_analysis\": \"\"").count(), 1);
    }

    #[test]
    fn summary_prompt_joins_chunks_with_spaces() {
        let chunks = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let prompt = summary(&chunks).unwrap();
        assert!(prompt.contains("Text:\nA B C\n"));
        assert!(prompt.contains("\"improve_analysis\": \"\""));
    }

    #[test]
    fn chunk_prompt_contains_chunk() {
        let prompt = chunk("The second paragraph.").unwrap();
        assert!(prompt.contains("Part:\nThe second paragraph.\n"));
        assert!(prompt.contains("\"improvement_suggestions\": \"\""));
    }
}
