use std::fmt;
use std::path::{Path, PathBuf};
use log::{debug, error, info, warn};

use crate::codegen;
use crate::config::GeneratorConfig;
use crate::error::Error;
use crate::manifest::{self, ManifestPatch};
use crate::providers::CompletionService;
use crate::request::GenerationRequest;
use crate::template::{self, ArchiveFetcher};

/// Pipeline position, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage
{   Start
  , CheckTarget
  , FetchInstall
  , UpdateManifest
  , GenerateCode
  , Done
  , Aborted
}

impl fmt::Display for Stage
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let name = match self
        {   Stage::Start => "start"
          , Stage::CheckTarget => "check-target"
          , Stage::FetchInstall => "fetch-install"
          , Stage::UpdateManifest => "update-manifest"
          , Stage::GenerateCode => "generate-code"
          , Stage::Done => "done"
          , Stage::Aborted => "aborted"
        };
        f.write_str(name)
    }
}

/// Removes paths the pipeline created unless disarmed
struct CleanupGuard
{   paths: Vec<PathBuf>
  , armed: bool
}

impl CleanupGuard
{   /// Track only paths that do not exist yet
    fn new(candidates: Vec<PathBuf>, armed: bool) -> Self
    {   let paths = candidates
          .into_iter()
          .filter(|p| !p.exists())
          .collect();
        CleanupGuard
        {   paths
          , armed
        }
    }

    fn disarm(&mut self)
    {   self.armed = false;
    }

    /// Stop tracking a path someone else now owns
    fn forget(&mut self, path: &Path)
    {   self.paths.retain(|p| p != path);
    }
}

impl Drop for CleanupGuard
{   fn drop(&mut self)
    {   if !self.armed
        {   return;
        }
        for path in &self.paths
        {   let removed = if path.is_dir()
            {   std::fs::remove_dir_all(path)
            } else if path.exists()
            {   std::fs::remove_file(path)
            } else
            {   continue;
            };
            match removed
            {   Ok(()) => debug!("Cleaned up {}", path.display())
              , Err(e) => warn!(
                  "Cannot clean up {}: {}",
                  path.display(), e
                )
            }
        }
    }
}

/// Scaffolds plugins: template archive, manifest patch, generated source
pub struct PluginGenerator<F, C>
{   fetcher: F
  , completion: C
  , config: GeneratorConfig
  , root: PathBuf
}

impl<F, C> PluginGenerator<F, C>
where
  F: ArchiveFetcher
, C: CompletionService
{   /// Create a generator that writes below `root`
    pub fn new(
      fetcher: F
    , completion: C
    , config: GeneratorConfig
    , root: impl Into<PathBuf>
    ) -> Self
    {   let root = root.into();
        debug!("Creating PluginGenerator rooted at {}", root.display());
        PluginGenerator
        {   fetcher
          , completion
          , config
          , root
        }
    }

    pub fn config(&self) -> &GeneratorConfig
    {   &self.config
    }

    pub fn root(&self) -> &Path
    {   &self.root
    }

    pub fn target_dir(&self, name: &str) -> PathBuf
    {   self.root.join(name)
    }

    /// Scaffold plugin `name` from `prompt`.
    ///
    /// `Ok(false)` means the target already existed and nothing was touched.
    pub async fn generate(
      &self
    , name: &str
    , prompt: &str
    ) -> Result<bool, Error>
    {   self.generate_request(
          &GenerationRequest::new(name, prompt)
        ).await
    }

    pub async fn generate_request(
      &self
    , request: &GenerationRequest
    ) -> Result<bool, Error>
    {   let mut stage = Stage::Start;
        debug!("[{}] {}", stage, request.target_name);
        request.validate()?;
        let name = request.target_name.as_str();
        let prompt = request.prompt_text.as_str();

        stage = Stage::CheckTarget;
        let target = self.target_dir(name);
        debug!("[{}] {}", stage, target.display());
        if tokio::fs::try_exists(&target).await?
        {   info!("Directory {} already exists", target.display());
            debug!("[{}] {}", Stage::Aborted, name);
            return Ok(false);
        }

        let source = &self.config.template;
        let extracted = self.root.join(source.extracted_dir_name());
        if tokio::fs::try_exists(&extracted).await?
        {   // Extraction would merge into it and the rename would carry it off
            error!(
              "Extraction folder {} already exists",
              extracted.display()
            );
            debug!("[{}] {}", Stage::Aborted, name);
            return Err(Error::TargetExists(extracted.display().to_string()));
        }

        let archive = self.root.join(source.archive_file_name());
        let mut guard = CleanupGuard::new(
          vec![
            archive.clone()
          , extracted
          , target.clone()
          ],
          self.config.cleanup_on_failure
        );

        let result = self.run_stages(
          &mut stage, &archive, name, prompt
        ).await;

        match result
        {   Ok(()) => {
              guard.disarm();
              stage = Stage::Done;
              info!("[{}] plugin {} generated", stage, target.display());
              Ok(true)
            }
          , Err(e) => {
              error!("Plugin generation failed at {}: {}", stage, e);
              if let Error::TargetExists(_) = e
              {   // Lost the race for the name; not ours to remove
                  guard.forget(&target);
              }
              Err(e)
            }
        }
    }

    async fn run_stages(
      &self
    , stage: &mut Stage
    , archive: &Path
    , name: &str
    , prompt: &str
    ) -> Result<(), Error>
    {   let source = &self.config.template;

        *stage = Stage::FetchInstall;
        debug!("[{}] {}", stage, source.archive_url());
        self.fetcher.fetch(source, archive).await?;
        let project_dir = template::install_archive(
          archive,
          &self.root,
          &source.extracted_dir_name(),
          name
        ).await?;

        *stage = Stage::UpdateManifest;
        debug!("[{}] {}", stage, project_dir.display());
        manifest::update_manifest(
          &project_dir,
          &ManifestPatch::new(name, prompt)
        ).await?;

        *stage = Stage::GenerateCode;
        debug!("[{}] {}", stage, self.config.entry_point.display());
        codegen::generate_source(
          &self.completion,
          &self.config,
          &project_dir,
          name,
          prompt
        ).await?;

        Ok(())
    }
}
