//! Prompt assembly and entry-point source generation

use std::path::Path;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error, info, warn};

use crate::config::GeneratorConfig;
use crate::error::Error;
use crate::providers::CompletionService;
use crate::request::{ChatMessage, CompletionRequest, Role};

const FENCE: &str = "```";

/// Instructional preamble sent ahead of every plugin request
pub const PLUGIN_INDEX_PROMPT_MESSAGES: &[(Role, &str)] = &[
  ( Role::System
  , "You are an expert TypeScript developer who writes plugins for Aeos, \
     a command-line assistant. A plugin is an npm package whose entry point \
     is src/index.ts. It is compiled with tsc and loaded by the Aeos host \
     at runtime."
  )
, ( Role::System
  , "Plugins import what they need from the '@bhodgk/aeos' package, \
     register their commands through the plugin object they export as the \
     module default, and report results by returning a CommandResult."
  )
, ( Role::System
  , "Reply with source code only. Everything you write is saved verbatim \
     as a TypeScript file and compiled, so any explanation must be a code \
     comment. Never use markdown or code fences."
  )
];

/// Handling of completions that arrive wrapped in markdown fences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FencePolicy
{   /// Write the completion exactly as returned
    #[default]
    Keep
  , /// Unwrap a completion that is one fenced block
    Strip
  , /// Fail when any line opens a fence
    Reject
}

impl FencePolicy
{   pub fn apply(&self, output: String) -> Result<String, Error>
    {   match self
        {   FencePolicy::Keep => Ok(output)
          , FencePolicy::Strip => Ok(
              strip_wrapping_fence(&output).unwrap_or(output)
            )
          , FencePolicy::Reject => {
              if has_fence(&output)
              {   return Err(Error::ModelNonCompliance(
                    "completion contains a markdown code fence".to_string()
                  ));
              }
              Ok(output)
            }
        }
    }
}

/// Whether any line of `text` starts a markdown fence
pub fn has_fence(text: &str) -> bool
{   text.lines().any(|line| line.trim_start().starts_with(FENCE))
}

/// Inner text of a completion that is exactly one fenced block,
/// `None` when it is anything else
fn strip_wrapping_fence(text: &str) -> Option<String>
{   let trimmed = text.trim();
    let rest = trimmed.strip_prefix(FENCE)?;
    // Opening line may carry a language tag
    let (_, body) = rest.split_once('\n')?;
    let body = body.trim_end().strip_suffix(FENCE)?;
    if has_fence(body)
    {   return None;
    }
    let mut inner = body.trim_end_matches([' ', '\t']).to_string();
    if !inner.ends_with('\n')
    {   inner.push('\n');
    }
    Some(inner)
}

/// Preamble plus one user message describing the plugin to write
pub fn build_messages(name: &str, prompt: &str) -> Vec<ChatMessage>
{   let mut messages: Vec<ChatMessage> = PLUGIN_INDEX_PROMPT_MESSAGES
      .iter()
      .map(|(role, content)| ChatMessage::new(*role, *content))
      .collect();
    messages.push(ChatMessage::user(format!(
      "Please generate a valid index.ts file for a plugin called {name} \
       using the following prompt: {prompt}. Your response will be written \
       directly 'as is' to the index.ts file. Any comments you have should \
       be as comments in the code, not as plain text. Do not wrap your code \
       in ''' as your reply will be run directly."
    )));
    messages
}

/// Ask the completion service for the plugin source and write it to the
/// configured entry point under `project_dir`.
///
/// Returns the text that was written.
pub async fn generate_source<C>(
  completion: &C
, config: &GeneratorConfig
, project_dir: &Path
, name: &str
, prompt: &str
) -> Result<String, Error>
where
  C: CompletionService
{   let request = CompletionRequest
    {   messages: build_messages(name, prompt)
      , max_tokens: config.completion.max_tokens
      , temperature: config.completion.temperature
    };
    debug!(
      "Requesting source for {} ({} messages)",
      name, request.messages.len()
    );

    let output = completion.complete(&request).await?;
    trace!("Completion output: {:?}", output);
    if has_fence(&output)
    {   warn!(
          "Completion for {} contains a code fence (policy {:?})",
          name, config.fence_policy
        );
    }
    let source = config.fence_policy.apply(output)?;

    let path = project_dir.join(&config.entry_point);
    if let Some(parent) = path.parent()
    {   tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, source.as_bytes()).await.map_err(|e| {
      error!("Cannot write {}: {}", path.display(), e);
      Error::Io(format!("{}: {}", path.display(), e))
    })?;

    info!("Wrote {} bytes to {}", source.len(), path.display());
    Ok(source)
}
