use async_trait::async_trait;

const PLACEHOLDER: &str = "{prompt}";

/// Backend behind `/llm`.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Deterministic canned answer with the prompt substituted in.
#[derive(Debug, Clone)]
pub struct TemplateInference {
    template: String,
}

impl TemplateInference {
    /// A template without a `{prompt}` slot gets one appended, so the answer
    /// always quotes the prompt.
    pub fn new(template: impl Into<String>) -> Self {
        let mut template = template.into();
        if !template.contains(PLACEHOLDER) {
            if !template.is_empty() {
                template.push(' ');
            }
            template.push_str(PLACEHOLDER);
        }
        Self { template }
    }
}

#[async_trait]
impl InferenceService for TemplateInference {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(self.template.replace(PLACEHOLDER, prompt))
    }
}
