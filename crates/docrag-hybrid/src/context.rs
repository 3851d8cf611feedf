//! Turns ranked chunks into input for the answer generator.

use docrag_core::types::QueryResult;
use docrag_embed::ChatMessage;

const SYSTEM_PROMPT: &str = "You answer questions using only the provided context. \
If the context does not contain the answer, say so plainly.";

/// `From <title>: <content>` blocks separated by blank lines.
pub fn format_context(results: &[QueryResult]) -> String {
    results
        .iter()
        .map(|r| format!("From {}: {}", r.title, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System and user messages for a completion request.
pub fn answer_messages(question: &str, results: &[QueryResult]) -> Vec<ChatMessage> {
    let user = if results.is_empty() {
        format!("No context is available.\n\nQuestion: {question}")
    } else {
        format!("Context:\n{}\n\nQuestion: {question}", format_context(results))
    };
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}
