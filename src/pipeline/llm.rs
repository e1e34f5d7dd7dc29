//! Question answering: build the prompt and call the provider.
//!
//! Prompt wording lives in [`crate::prompts`]; this module owns message
//! layout, retry and timeout handling.
//!
//! ## Retry Strategy
//!
//! Rate-limit and overload errors are transient. Each attempt is bounded by
//! `api_timeout_secs`; failed attempts back off exponentially
//! (`retry_backoff_ms * 2^(attempt-1)`), so with 500 ms base and 2 retries
//! the waits are 500 ms then 1 s.

use crate::config::AnalyserConfig;
use crate::error::DocQaError;
use crate::output::Answer;
use crate::pipeline::postprocess::split_answer;
use crate::prompts::{build_question_prompt, history_context, system_prompt};
use crate::session::ChatEntry;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Ask `question` about `text` and return the parsed answer.
///
/// Message layout:
/// 1. system prompt (default or override, plus the csv table hint)
/// 2. earlier exchanges, when `history_turns > 0` and there are any
/// 3. user message with the document text and the question
pub async fn ask(
    provider: &Arc<dyn LLMProvider>,
    text: &str,
    question: &str,
    history: &[ChatEntry],
    config: &AnalyserConfig,
) -> Result<Answer, DocQaError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(DocQaError::EmptyQuestion);
    }

    let start = Instant::now();
    let messages = build_messages(text, question, history, config);
    let options = build_options(config);
    let call_timeout = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<DocQaError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Question: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                debug!(
                    "Answer: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens, response.completion_tokens, duration
                );
                let segments = split_answer(&response.content);
                return Ok(Answer {
                    question: question.to_string(),
                    raw: response.content,
                    segments,
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt,
                });
            }
            Ok(Err(e)) => {
                warn!("Question: attempt {} failed — {}", attempt + 1, e);
                last_err = Some(DocQaError::LlmApiError {
                    message: e.to_string(),
                    retries: attempt,
                });
            }
            Err(_) => {
                warn!(
                    "Question: attempt {} timed out after {}s",
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(DocQaError::ApiTimeout {
                    secs: config.api_timeout_secs,
                });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| DocQaError::LlmApiError {
        message: "Unknown error".to_string(),
        retries: config.max_retries,
    }))
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`, saturating.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    2u64.checked_pow(attempt.saturating_sub(1))
        .map_or(u64::MAX, |factor| base.saturating_mul(factor))
}

fn build_messages(
    text: &str,
    question: &str,
    history: &[ChatEntry],
    config: &AnalyserConfig,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt(
        config.system_prompt.as_deref(),
        config.table_hint,
    ))];

    let turns = recent_turns(history, config.history_turns);
    if !turns.is_empty() {
        messages.push(ChatMessage::system(history_context(&turns)));
    }

    messages.push(ChatMessage::user(build_question_prompt(text, question)));
    messages
}

/// The last `limit` exchanges as `(question, answer)` pairs, oldest first.
fn recent_turns(history: &[ChatEntry], limit: usize) -> Vec<(&str, &str)> {
    let skip = history.len().saturating_sub(limit);
    history[skip..]
        .iter()
        .map(|e| (e.question(), e.answer_text()))
        .collect()
}

fn build_options(config: &AnalyserConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
