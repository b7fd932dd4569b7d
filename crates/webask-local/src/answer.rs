use webask_core::CompletionBackend;

/// Fixed reply when no web context could be assembled. The completion
/// backend is not called in that case.
pub const NO_CONTEXT_ADVISORY: &str = "No context was found from web searches. The model will provide a general response without current information.";

/// Turns an assembled context document plus the user's question into the
/// final answer string.
pub struct AnswerGenerator {
    backend: Box<dyn CompletionBackend>,
}

impl AnswerGenerator {
    pub fn new(backend: Box<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Produce the user-facing answer. Backend failures come back as
    /// formatted strings rather than errors: a degraded answer is still an
    /// answer, and this is the only failure class the end user ever sees.
    pub async fn answer(&self, query: &str, context: &str) -> String {
        if context.trim().is_empty() {
            return NO_CONTEXT_ADVISORY.to_string();
        }
        let prompt = build_prompt(query, context);
        match self.backend.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => format!("Error querying {} backend: {e}", self.backend.name()),
        }
    }
}

fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Context from web searches:\n\n{context}\n\n\
         Question: {query}\n\n\
         Please provide a comprehensive answer based on the context above. \
         Please ensure the answer is detailed with points wherever necessary. \
         Please ensure that the answer is properly formatted for reading. \
         If the context doesn't contain relevant information, please state that clearly."
    )
}
