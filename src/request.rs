//! Request types flowing through the generation pipeline

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One plugin to scaffold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// Directory and package name of the new plugin
    pub target_name: String
  , /// Free-form task description
    pub prompt_text: String
}

impl GenerationRequest
{   pub fn new(
      target_name: impl Into<String>
    , prompt_text: impl Into<String>
    ) -> Self
    {   GenerationRequest
        {   target_name: target_name.into()
          , prompt_text: prompt_text.into()
        }
    }

    /// Reject names that would escape or alias the working root
    pub fn validate(&self) -> Result<(), Error>
    {   validate_target_name(&self.target_name)
    }
}

pub fn validate_target_name(name: &str) -> Result<(), Error>
{   let bad = name.is_empty()
      || name == "."
      || name == ".."
      || name.contains(['/', '\\', '\0']);
    if bad
    {   return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Chat roles understood by the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

impl ChatMessage
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   ChatMessage
        {   role
          , content: content.into()
        }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage::new(Role::Assistant, content)
    }
}

/// Provider-neutral completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   /// Ordered conversation
    pub messages: Vec<ChatMessage>
  , /// Max tokens to generate
    pub max_tokens: usize
  , /// Temperature for sampling
    pub temperature: f32
}
