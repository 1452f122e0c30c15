use anyhow::{Context, Result};

use crate::config::Settings;
use crate::ollama::Backend;
use crate::reduce::Reducer;
use crate::summarize;
use crate::profile;

/// Turns a diff into a raw commit message: reduce when oversized, then one
/// generation call with the commit-message template.
pub async fn commit_message<B>(diff: &str, settings: &Settings, backend: &B) -> Result<String>
where
  B: Backend + ?Sized
{
  commit_message_with(diff, settings, &Reducer::from_settings(settings), backend).await
}

pub async fn commit_message_with<B>(diff: &str, settings: &Settings, reducer: &Reducer, backend: &B) -> Result<String>
where
  B: Backend + ?Sized
{
  profile!("Generate commit message");

  let reduced = reducer
    .reduce(diff, backend, &settings.summary_prompt)
    .await
    .context("Error summarizing diff")?;

  log::info!("Generating commit message from {} bytes", reduced.len());

  summarize::generate(backend, &reduced, &settings.commit_prompt)
    .await
    .context("Error generating commit message")
}
