//! Recursive reduction of oversized diffs.
//!
//! A diff larger than the summarize threshold is chunked, each chunk is
//! summarized in order, and the joined summaries replace the input. Rounds
//! repeat until the text fits the context budget. Every round must shrink the
//! text, so a backend that never produces shorter output ends in an error
//! instead of a loop.

use thiserror::Error;

use crate::chunker::Chunker;
use crate::config::Settings;
use crate::ollama::{Backend, BackendError};
use crate::prompt::PromptTemplate;
use crate::summarize::summarize;
use crate::profile;

/// Inputs at or below this many bytes go to the generator untouched.
pub const SUMMARIZE_THRESHOLD: usize = 2000;

/// Lines shared between neighbouring chunks.
pub const CHUNK_OVERLAP: usize = 5;

#[derive(Error, Debug)]
pub enum ReduceError {
  #[error("Failed to summarize chunk {index} of {total}: {source}")]
  Summarize {
    index:  usize,
    total:  usize,
    #[source]
    source: BackendError
  },

  #[error("Reduction did not converge: round {round} produced {output} bytes from {input} bytes")]
  NotConverging { round: usize, input: usize, output: usize }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reducer {
  threshold:      usize,
  context_length: usize,
  overlap:        usize
}

impl Reducer {
  pub fn new(context_length: usize) -> Self {
    Self {
      threshold: SUMMARIZE_THRESHOLD,
      context_length,
      overlap: CHUNK_OVERLAP
    }
  }

  pub fn from_settings(settings: &Settings) -> Self {
    Self::new(settings.context_length)
  }

  pub fn with_threshold(mut self, threshold: usize) -> Self {
    self.threshold = threshold;
    self
  }

  pub fn with_overlap(mut self, overlap: usize) -> Self {
    self.overlap = overlap;
    self
  }

  pub fn needs_reduction(&self, text: &str) -> bool {
    text.len() > self.threshold
  }

  /// Reduces `text` until it fits the context budget.
  ///
  /// Text at or below the threshold is returned unchanged. Otherwise at least
  /// one round runs, and further rounds run while the joined summaries exceed
  /// the context length. Each round must return less text than it was
  /// given, which bounds the number of rounds by the input length.
  pub async fn reduce<B>(&self, text: &str, backend: &B, template: &PromptTemplate) -> Result<String, ReduceError>
  where
    B: Backend + ?Sized
  {
    if !self.needs_reduction(text) {
      log::debug!("Diff is {} bytes, below threshold {}; no summarization", text.len(), self.threshold);
      return Ok(text.to_string());
    }

    let mut current = text.to_string();
    let mut round = 0;

    loop {
      round += 1;

      let combined = self.round(&current, round, backend, template).await?;
      log::info!("Reduction round {round}: {} -> {} bytes", current.len(), combined.len());

      if combined.len() <= self.context_length {
        return Ok(combined);
      }

      if combined.len() >= current.len() {
        return Err(ReduceError::NotConverging { round, input: current.len(), output: combined.len() });
      }

      current = combined;
    }
  }

  async fn round<B>(&self, text: &str, round: usize, backend: &B, template: &PromptTemplate) -> Result<String, ReduceError>
  where
    B: Backend + ?Sized
  {
    profile!(format!("Reduction round {round}"));

    let chunks = Chunker::new(self.context_length, self.overlap).split(text);
    let total = chunks.len();
    let mut summaries = Vec::with_capacity(total);

    for (i, chunk) in chunks.iter().enumerate() {
      log::debug!("Summarizing chunk {}/{} ({} bytes)", i + 1, total, chunk.size());
      let summary = summarize(backend, &chunk.text(), template)
        .await
        .map_err(|source| ReduceError::Summarize { index: i + 1, total, source })?;
      summaries.push(summary);
    }

    Ok(summaries.join("\n"))
  }
}
