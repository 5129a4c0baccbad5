//! Question-answering prompt shared by the query engine and providers

/// Marks the start and end of the retrieved context block
pub const CONTEXT_DELIMITER: &str = "---------------------";

/// Prefix of the line carrying the user query
pub const QUERY_PREFIX: &str = "Query: ";

/// A retrieval-augmented question
#[derive(Debug, Clone)]
pub struct QaPrompt {
    pub context: Vec<String>,
    pub query: String,
}

impl QaPrompt {
    pub fn new(context: Vec<String>, query: impl Into<String>) -> Self {
        Self {
            context,
            query: query.into(),
        }
    }

    /// Render the prompt sent to the LLM
    pub fn render(&self) -> String {
        let context = self
            .context
            .iter()
            .map(|c| c.trim())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Context information is below.\n\
             {delim}\n\
             {context}\n\
             {delim}\n\
             Given the context information and not prior knowledge, answer the query.\n\
             {prefix}{query}\n\
             Answer: ",
            delim = CONTEXT_DELIMITER,
            prefix = QUERY_PREFIX,
            context = context,
            query = self.query.trim(),
        )
    }

    /// Recover the context and query from a rendered prompt
    pub fn parse(prompt: &str) -> Option<Self> {
        let mut sections = prompt.splitn(3, CONTEXT_DELIMITER);
        sections.next()?;
        let context = sections.next()?;
        let rest = sections.next()?;

        let query = rest
            .lines()
            .find_map(|line| line.strip_prefix(QUERY_PREFIX))?
            .trim()
            .to_string();

        let context = context
            .split("\n\n")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self { context, query })
    }
}
