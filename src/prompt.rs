use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder that receives the payload text.
pub const SLOT: &str = "%s";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
  #[error("prompt template has no %s slot for the payload")]
  MissingSlot
}

/// A prompt with a single payload slot.
///
/// Rendering replaces the first `%s` only; any further occurrences are kept
/// verbatim so a template mentioning `%s` in its prose stays intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptTemplate {
  template: String
}

impl PromptTemplate {
  pub fn new(template: impl Into<String>) -> Result<Self, TemplateError> {
    let template = template.into();
    match template.matches(SLOT).count() {
      0 => Err(TemplateError::MissingSlot),
      1 => Ok(Self { template }),
      n => {
        log::warn!("Prompt template has {n} %s slots, only the first one is filled");
        Ok(Self { template })
      }
    }
  }

  pub fn render(&self, payload: &str) -> String {
    self.template.replacen(SLOT, payload, 1)
  }

  pub fn as_str(&self) -> &str {
    &self.template
  }
}

impl FromStr for PromptTemplate {
  type Err = TemplateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

impl TryFrom<String> for PromptTemplate {
  type Error = TemplateError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<PromptTemplate> for String {
  fn from(template: PromptTemplate) -> Self {
    template.template
  }
}

impl Display for PromptTemplate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.template)
  }
}
