use std::fmt;

/// Custom error type for plugin generation
/// Implements Clone so fakes can hand out canned failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Target name is not a usable directory name
    InvalidName(String)
  , /// Destination directory already exists
    TargetExists(String)
  , /// HTTP transport error
    HttpError(String)
  , /// Completion API returned an error response
    ApiError(String)
  , /// Failed to parse a completion response
    ParseError(String)
  , /// No choices in completion response
    NoChoicesInResponse
  , /// API key is missing for the completion service
    MissingApiKey(String)
  , /// Filesystem error
    Io(String)
  , /// Archive could not be read or extracted
    Archive(String)
  , /// Package manifest missing fields or malformed
    Manifest(String)
  , /// Model output ignored the formatting instructions
    ModelNonCompliance(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidName(name) => {
              write!(f, "Invalid plugin name: {:?}", name)
            }
          , Error::TargetExists(path) => {
              write!(f, "Directory {} already exists", path)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::MissingApiKey(service) => {
              write!(f, "Missing API key for: {}", service)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Archive(msg) => {
              write!(f, "Archive error: {}", msg)
            }
          , Error::Manifest(msg) => {
              write!(f, "Manifest error: {}", msg)
            }
          , Error::ModelNonCompliance(msg) => {
              write!(f,
                "Model output rejected: {}",
                msg
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
