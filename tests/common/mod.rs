#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use commitsum::{Backend, BackendError};

/// Backend double that records prompts and answers from a closure.
pub struct MockBackend<F> {
  respond: F,
  prompts: Mutex<Vec<String>>
}

impl<F> MockBackend<F>
where
  F: Fn(usize, &str) -> Result<String, BackendError> + Send + Sync
{
  pub fn new(respond: F) -> Self {
    Self { respond, prompts: Mutex::new(Vec::new()) }
  }

  pub fn prompts(&self) -> Vec<String> {
    self.prompts.lock().unwrap().clone()
  }

  pub fn calls(&self) -> usize {
    self.prompts.lock().unwrap().len()
  }
}

#[async_trait]
impl<F> Backend for MockBackend<F>
where
  F: Fn(usize, &str) -> Result<String, BackendError> + Send + Sync
{
  async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
    let call = {
      let mut prompts = self.prompts.lock().unwrap();
      prompts.push(prompt.to_string());
      prompts.len()
    };
    (self.respond)(call, prompt)
  }
}

/// `count` lines of exactly `width` bytes each, newline included.
pub fn fixed_lines(count: usize, width: usize) -> String {
  (0..count)
    .map(|i| format!("{:0>pad$}\n", i, pad = width - 1))
    .collect()
}

pub fn file_section(name: &str, lines: usize) -> String {
  let mut section = format!("diff --git a/{name} b/{name}\nindex 1234567..89abcde 100644\n--- a/{name}\n+++ b/{name}\n");
  for i in 0..lines {
    section.push_str(&format!("+    let value_{i} = compute_{i}(input);\n"));
  }
  section
}
