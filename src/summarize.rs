use crate::ollama::{Backend, BackendError};
use crate::prompt::PromptTemplate;

/// Summarizes one chunk (or a combined summary) with the summary template.
pub async fn summarize<B>(backend: &B, chunk: &str, template: &PromptTemplate) -> Result<String, BackendError>
where
  B: Backend + ?Sized
{
  backend.generate(&template.render(chunk)).await
}

/// Produces the commit message from the (possibly reduced) diff text.
pub async fn generate<B>(backend: &B, diff: &str, template: &PromptTemplate) -> Result<String, BackendError>
where
  B: Backend + ?Sized
{
  backend.generate(&template.render(diff)).await
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use async_trait::async_trait;

  use super::*;

  #[derive(Default)]
  struct Recorder {
    prompts: Mutex<Vec<String>>
  }

  #[async_trait]
  impl Backend for Recorder {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
      self.prompts.lock().unwrap().push(prompt.to_string());
      Ok("ok".to_string())
    }
  }

  #[tokio::test]
  async fn test_summarize_renders_template_once() {
    let backend = Recorder::default();
    let template = PromptTemplate::new("Summary of:\n%s").unwrap();

    let summary = summarize(&backend, "+added line\n", &template).await.unwrap();

    assert_eq!(summary, "ok");
    assert_eq!(*backend.prompts.lock().unwrap(), vec!["Summary of:\n+added line\n".to_string()]);
  }

  #[tokio::test]
  async fn test_generate_uses_given_template() {
    let backend = Recorder::default();
    let template = PromptTemplate::new("###CONTEXT###\n%s\n###END###").unwrap();

    generate(&backend, "reduced", &template).await.unwrap();

    assert_eq!(backend.prompts.lock().unwrap()[0], "###CONTEXT###\nreduced\n###END###");
  }
}
