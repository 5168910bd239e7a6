//! Prompt building and response parsing for chat-completion categorizers

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{CategorizationError, Result};
use crate::service::{CategorizationRequest, Suggestion};

pub const SYSTEM_PROMPT: &str = "You are a financial categorization assistant. \
You MUST return responses in valid JSON format only. \
Return one categorization per transaction, in the same order, like this: \
{\"categorizations\": [{\"category\": \"Food\", \"subcategory\": \"Groceries\"}, \
{\"category\": \"Transport\", \"subcategory\": \"Public Transport\"}]}";

#[derive(Serialize)]
struct PromptTransaction<'a> {
    concept: &'a str,
    amount: String,
}

/// User message: a JSON document with context, optional vocabulary
/// constraints and the transactions to categorize.
pub fn build_user_prompt(request: &CategorizationRequest<'_>) -> Result<String> {
    let mut context = json!({
        "role": "You are a financial categorization assistant.",
        "task": "Categorize financial transactions into appropriate categories and subcategories.",
    });
    if request.restrict_to_vocabulary {
        context["constraints"] = json!({
            "categories": request.vocabulary.keys().collect::<Vec<_>>(),
            "category_subcategories": request.vocabulary,
            "important": "You must ONLY use categories and subcategories from the provided lists. Don't create new ones.",
        });
    }

    let transactions: Vec<PromptTransaction> = request
        .items
        .iter()
        .map(|item| PromptTransaction {
            concept: &item.concept,
            amount: format!("{:.2}€", item.amount),
        })
        .collect();

    let prompt = json!({
        "context": context,
        "transactions": transactions,
    });
    serde_json::to_string_pretty(&prompt).map_err(|e| CategorizationError::Malformed(e.to_string()))
}

#[derive(Deserialize)]
struct CategorizationResponse {
    categorizations: Vec<Suggestion>,
}

/// Parse `{"categorizations": [...]}` out of the model's reply. Markdown code
/// fences around the JSON are tolerated. The number of suggestions must match
/// `expected`.
pub fn parse_suggestions(content: &str, expected: usize) -> Result<Vec<Suggestion>> {
    let content = strip_code_fence(content)?;
    if content.is_empty() {
        return Err(CategorizationError::EmptyResponse);
    }

    let parsed: CategorizationResponse = serde_json::from_str(&content).map_err(|e| {
        let truncated: String = content.chars().take(200).collect();
        CategorizationError::Malformed(format!("{e} | raw: {truncated}"))
    })?;

    let got = parsed.categorizations.len();
    if got != expected {
        return Err(CategorizationError::CountMismatch { expected, got });
    }
    Ok(parsed.categorizations)
}

fn strip_code_fence(content: &str) -> Result<String> {
    let fence = Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$")
        .map_err(|e| CategorizationError::Malformed(e.to_string()))?;
    let trimmed = content.trim();
    Ok(match fence.captures(trimmed) {
        Some(caps) => caps[1].trim().to_string(),
        None => trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::CategorizationItem;
    use finanzas_core::Vocabulary;
    use std::collections::BTreeSet;

    fn request(vocab: &Vocabulary, restrict: bool) -> CategorizationRequest<'_> {
        CategorizationRequest {
            items: vec![
                CategorizationItem {
                    concept: "MERCADONA".into(),
                    amount: -45.5,
                },
                CategorizationItem {
                    concept: "NOMINA".into(),
                    amount: 2100.0,
                },
            ],
            vocabulary: vocab,
            restrict_to_vocabulary: restrict,
        }
    }

    #[test]
    fn test_prompt_formats_amounts_and_constraints() {
        let mut vocab = Vocabulary::new();
        vocab.insert("Food".into(), BTreeSet::from(["Supermarket".to_string()]));

        let prompt = build_user_prompt(&request(&vocab, true)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(v["transactions"][0]["amount"], "-45.50€");
        assert_eq!(v["transactions"][1]["concept"], "NOMINA");
        assert_eq!(v["context"]["constraints"]["categories"][0], "Food");
        assert_eq!(v["context"]["constraints"]["category_subcategories"]["Food"][0], "Supermarket");

        let prompt = build_user_prompt(&request(&vocab, false)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&prompt).unwrap();
        assert!(v["context"].get("constraints").is_none());
    }

    #[test]
    fn test_parse_suggestions() {
        let raw = r#"{"categorizations": [{"category": "Food", "subcategory": "Supermarket"}, {"category": "Income", "subcategory": "Salary"}]}"#;
        let out = parse_suggestions(raw, 2).unwrap();
        assert_eq!(out[1], Suggestion::new("Income", "Salary"));
    }

    #[test]
    fn test_parse_fenced_response() {
        let raw = "```json\n{\"categorizations\": [{\"category\": \"Food\", \"subcategory\": \"Bars\"}]}\n```";
        let out = parse_suggestions(raw, 1).unwrap();
        assert_eq!(out[0].subcategory, "Bars");
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(parse_suggestions("  ", 1), Err(CategorizationError::EmptyResponse)));
        assert!(matches!(parse_suggestions("not json", 1), Err(CategorizationError::Malformed(_))));
        assert!(matches!(
            parse_suggestions(r#"{"items": []}"#, 1),
            Err(CategorizationError::Malformed(_))
        ));
        assert!(matches!(
            parse_suggestions(r#"{"categorizations": []}"#, 2),
            Err(CategorizationError::CountMismatch { expected: 2, got: 0 })
        ));
    }
}
