//! Configuration for the template source, completion service and pipeline

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use log::{debug, error};

use crate::codegen::FencePolicy;
use crate::error::Error;

pub const DEFAULT_TEMPLATE_BASE_URL: &str = "https://github.com";
pub const DEFAULT_TEMPLATE_OWNER: &str = "Captain-Bacon";
pub const DEFAULT_TEMPLATE_REPO: &str = "aeos-plugin-template";
pub const DEFAULT_TEMPLATE_BRANCH: &str = "main";

pub const DEFAULT_COMPLETION_API_BASE: &str
  = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: usize = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_ENTRY_POINT: &str = "src/index.ts";

/// Remote repository whose branch archive seeds every new plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSource
{   /// Scheme and host serving `<owner>/<repo>/archive/...`
    pub base_url: String
  , /// Repository owner
    pub owner: String
  , /// Repository name
    pub repo: String
  , /// Branch to snapshot
    pub branch: String
}

impl TemplateSource
{   /// Template on the default branch
    pub fn new(
      owner: impl Into<String>
    , repo: impl Into<String>
    ) -> Self
    {   TemplateSource
        {   owner: owner.into()
          , repo: repo.into()
          , ..TemplateSource::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self
    {   self.branch = branch.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self
    {   self.base_url = base_url.into();
        self
    }

    /// Download URL of the branch archive
    pub fn archive_url(&self) -> String
    {   format!(
          "{}/{}/{}/archive/refs/heads/{}.zip",
          self.base_url.trim_end_matches('/'),
          self.owner,
          self.repo,
          self.branch
        )
    }

    /// Local file the archive is downloaded to
    pub fn archive_file_name(&self) -> String
    {   format!("{}.zip", self.repo)
    }

    /// Top-level folder inside the archive
    pub fn extracted_dir_name(&self) -> String
    {   format!("{}-{}", self.repo, self.branch)
    }
}

impl Default for TemplateSource
{   fn default() -> Self
    {   TemplateSource
        {   base_url: DEFAULT_TEMPLATE_BASE_URL.to_string()
          , owner: DEFAULT_TEMPLATE_OWNER.to_string()
          , repo: DEFAULT_TEMPLATE_REPO.to_string()
          , branch: DEFAULT_TEMPLATE_BRANCH.to_string()
        }
    }
}

/// Completion service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig
{   /// API base URL of an OpenAI-compatible service
    pub api_base: String
  , /// Model name
    pub model: String
  , /// Max tokens to generate
    pub max_tokens: usize
  , /// Temperature for sampling
    pub temperature: f32
  , /// Request timeout in seconds, transport default when unset
    pub timeout_secs: Option<u64>
}

impl Default for CompletionConfig
{   fn default() -> Self
    {   CompletionConfig
        {   api_base: DEFAULT_COMPLETION_API_BASE.to_string()
          , model: DEFAULT_COMPLETION_MODEL.to_string()
          , max_tokens: DEFAULT_MAX_TOKENS
          , temperature: DEFAULT_TEMPERATURE
          , timeout_secs: None
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig
{   /// Template repository coordinates
    pub template: TemplateSource
  , /// Completion service settings
    pub completion: CompletionConfig
  , /// Generated source path, relative to the plugin directory
    pub entry_point: PathBuf
  , /// What to do with fenced model output
    pub fence_policy: FencePolicy
  , /// Remove partially created paths when a stage fails
    pub cleanup_on_failure: bool
}

impl Default for GeneratorConfig
{   fn default() -> Self
    {   GeneratorConfig
        {   template: TemplateSource::default()
          , completion: CompletionConfig::default()
          , entry_point: PathBuf::from(DEFAULT_ENTRY_POINT)
          , fence_policy: FencePolicy::default()
          , cleanup_on_failure: true
        }
    }
}

impl GeneratorConfig
{   /// Load a JSON configuration file; missing keys take defaults
    pub fn from_file(path: &Path) -> Result<Self, Error>
    {   debug!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
          error!("Cannot read config {}: {}", path.display(), e);
          Error::Io(format!("{}: {}", path.display(), e))
        })?;
        let config: GeneratorConfig = serde_json::from_str(&raw)
          .map_err(|e| {
            error!("Cannot parse config {}: {}", path.display(), e);
            Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error>
    {   let template = &self.template;
        for (field, value) in [
            ("template.base_url", &template.base_url)
          , ("template.owner", &template.owner)
          , ("template.repo", &template.repo)
          , ("template.branch", &template.branch)
          , ("completion.model", &self.completion.model)
          ]
        {   if value.trim().is_empty()
            {   return Err(Error::InvalidConfiguration(
                  format!("{} must not be empty", field)
                ));
            }
        }

        let temperature = self.completion.temperature;
        if !(0.0..=2.0).contains(&temperature)
        {   return Err(Error::InvalidConfiguration(
              format!(
                "completion.temperature {} outside 0.0..=2.0",
                temperature
              )
            ));
        }

        if self.completion.max_tokens == 0
        {   return Err(Error::InvalidConfiguration(
              "completion.max_tokens must be positive".to_string()
            ));
        }

        if self.entry_point.as_os_str().is_empty()
          || self.entry_point.is_absolute()
        {   return Err(Error::InvalidConfiguration(
              format!(
                "entry_point {} must be a relative file path",
                self.entry_point.display()
              )
            ));
        }

        Ok(())
    }
}
