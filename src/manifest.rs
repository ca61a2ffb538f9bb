//! `package.json` rewriting

use std::path::{Path, PathBuf};
use serde_json::{Map, Value};
use log::{debug, error};

use crate::error::Error;

pub const MANIFEST_FILE: &str = "package.json";
pub const GENERATED_VERSION: &str = "0.0.1";
pub const GENERATED_AUTHOR: &str = "Aeos Plugin Generator";

/// Fields stamped onto every generated manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPatch
{   pub name: String
  , pub description: String
  , pub version: String
  , pub author: String
}

impl ManifestPatch
{   /// Patch for a new plugin; the prompt becomes the description verbatim
    pub fn new(
      name: impl Into<String>
    , description: impl Into<String>
    ) -> Self
    {   ManifestPatch
        {   name: name.into()
          , description: description.into()
          , version: GENERATED_VERSION.to_string()
          , author: GENERATED_AUTHOR.to_string()
        }
    }

    /// Overwrite the four fixed fields, leaving the rest in place.
    /// Existing keys keep their position; new ones are appended.
    pub fn apply(&self, manifest: &mut Map<String, Value>)
    {   for (key, value) in [
            ("name", &self.name)
          , ("description", &self.description)
          , ("version", &self.version)
          , ("author", &self.author)
          ]
        {   manifest.insert(key.to_string(), Value::String(value.clone()));
        }
    }
}

pub fn manifest_path(project_dir: &Path) -> PathBuf
{   project_dir.join(MANIFEST_FILE)
}

/// Parse manifest text; the document root must be an object
pub fn parse_manifest(raw: &str) -> Result<Map<String, Value>, Error>
{   match serde_json::from_str::<Value>(raw)
    {   Ok(Value::Object(map)) => Ok(map)
      , Ok(other) => Err(Error::Manifest(format!(
          "expected an object at the top level, found {}",
          json_kind(&other)
        )))
      , Err(e) => Err(Error::Manifest(e.to_string()))
    }
}

/// Pretty-print with 2-space indentation and no trailing newline.
/// Strings, integers and nesting come out as `JSON.stringify(manifest, null, 2)`
/// writes them; floats use serde_json's notation (`1.0`, not `1`).
pub fn render_manifest(manifest: &Map<String, Value>) -> Result<String, Error>
{   serde_json::to_string_pretty(manifest)
      .map_err(|e| Error::Manifest(e.to_string()))
}

/// Load `<project_dir>/package.json`, apply `patch`, write it back.
///
/// Returns the patched document.
pub async fn update_manifest(
  project_dir: &Path
, patch: &ManifestPatch
) -> Result<Map<String, Value>, Error>
{   let path = manifest_path(project_dir);
    debug!("Updating manifest {}", path.display());

    let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
      error!("Cannot read manifest {}: {}", path.display(), e);
      Error::Io(format!("{}: {}", path.display(), e))
    })?;

    let mut manifest = parse_manifest(&raw).map_err(|e| {
      error!("Malformed manifest {}: {}", path.display(), e);
      e
    })?;
    patch.apply(&mut manifest);

    let rendered = render_manifest(&manifest)?;
    tokio::fs::write(&path, rendered).await.map_err(|e| {
      error!("Cannot write manifest {}: {}", path.display(), e);
      Error::Io(format!("{}: {}", path.display(), e))
    })?;

    Ok(manifest)
}

fn json_kind(value: &Value) -> &'static str
{   match value
    {   Value::Null => "null"
      , Value::Bool(_) => "a boolean"
      , Value::Number(_) => "a number"
      , Value::String(_) => "a string"
      , Value::Array(_) => "an array"
      , Value::Object(_) => "an object"
    }
}
