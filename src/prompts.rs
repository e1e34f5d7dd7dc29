//! Prompts sent to the model.
//!
//! Every prompt lives here so wording changes never touch retry or parsing
//! logic, and so tests can inspect the exact text. A custom system prompt can
//! be set through [`crate::config::AnalyserConfig::system_prompt`].

/// Default system prompt for answering questions about a document.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a careful analyst answering questions about a single document.

Rules:
- Answer only from the document text supplied by the user.
- Quote figures, dates and names exactly as they appear.
- If the document does not contain the answer, say so plainly instead of guessing.
- Keep answers concise; use Markdown for lists and emphasis."#;

/// Appended to the system prompt when table output is enabled.
///
/// [`crate::pipeline::postprocess::split_answer`] looks for exactly these
/// fences.
pub const TABLE_HINT: &str = r#"

When the answer is naturally tabular (line items, schedules, comparisons),
put the table in a fenced code block tagged csv, with a header row:

```csv
column one,column two
value,value
```

Quote any field that contains a comma. Do not use Markdown pipe tables."#;

/// System prompt for the vision OCR engine.
pub const OCR_PROMPT: &str = r#"Transcribe all text on this scanned page exactly as printed.

- Preserve reading order and line breaks.
- Do not summarise, translate or correct the text.
- Output only the transcribed text with no commentary or code fences.
- If the page has no legible text, output nothing."#;

/// Full system prompt for a question, honouring an optional override.
pub fn system_prompt(custom: Option<&str>, table_hint: bool) -> String {
    let mut prompt = custom.unwrap_or(DEFAULT_SYSTEM_PROMPT).to_string();
    if table_hint {
        prompt.push_str(TABLE_HINT);
    }
    prompt
}

/// User message combining the document text and the question.
pub fn build_question_prompt(text: &str, question: &str) -> String {
    format!(
        "Here is the text extracted from a document:\n\n\
         {text}\n\n\
         Based on the above content, please answer the following question:\n\
         {question}\n\n\
         If the information to answer the question is not present in the text, \
         please state that clearly."
    )
}

/// Earlier exchanges on the same document, oldest first.
pub fn history_context(turns: &[(&str, &str)]) -> String {
    let mut out = String::from("Earlier questions and answers about this document:\n");
    for (question, answer) in turns {
        out.push_str(&format!("\nQ: {}\nA: {}\n", question.trim(), answer.trim()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_contains_text_then_question() {
        let p = build_question_prompt("DOC BODY", "What is the deadline?");
        let doc_at = p.find("DOC BODY").unwrap();
        let q_at = p.find("What is the deadline?").unwrap();
        assert!(doc_at < q_at);
        assert!(p.contains("state that clearly"));
    }

    #[test]
    fn table_hint_is_optional() {
        assert!(system_prompt(None, true).contains("```csv"));
        assert!(!system_prompt(None, false).contains("```csv"));
    }

    #[test]
    fn history_context_lists_turns_in_order() {
        let ctx = history_context(&[("first?", "one"), ("second?", "two")]);
        assert!(ctx.find("Q: first?").unwrap() < ctx.find("Q: second?").unwrap());
        assert!(ctx.contains("A: two"));
    }

    #[test]
    fn custom_prompt_replaces_default() {
        let p = system_prompt(Some("Be brief."), false);
        assert_eq!(p, "Be brief.");
    }
}
