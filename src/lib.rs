pub mod error;
pub mod config;
pub mod request;
pub mod providers;
pub mod template;
pub mod manifest;
pub mod codegen;
pub mod generator;

/*

aeosgen scaffolds a new Aeos plugin in three steps: pull the plugin
template repository as a branch archive, stamp the new name and
description into its package.json, then ask an LLM to write
src/index.ts from a free-form prompt.

aeosgen/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and crate overview
│   ├── main.rs         # CLI wrapper
│   ├── error.rs        # Error type shared by every stage
│   ├── config.rs       # Template, completion and pipeline settings
│   ├── request.rs      # Generation and completion request types
│   ├── providers/      # Completion service seam
│   │   ├── mod.rs      # CompletionService trait
│   │   └── openai.rs   # OpenAI-compatible chat completions client
│   ├── template/       # Archive download and install
│   │   ├── mod.rs
│   │   ├── fetch.rs    # ArchiveFetcher trait, streaming HTTP fetcher
│   │   └── install.rs  # Zip extraction and rename
│   ├── manifest.rs     # package.json patching
│   ├── codegen.rs      # Prompt assembly and source generation
│   └── generator.rs    # PluginGenerator pipeline
└── tests/              # Integration tests

*/

pub use config::{CompletionConfig, GeneratorConfig, TemplateSource};
pub use codegen::FencePolicy;
pub use error::Error;
pub use generator::{PluginGenerator, Stage};
pub use manifest::ManifestPatch;
pub use providers::{CompletionService, OpenAiClient};
pub use request::{ChatMessage, CompletionRequest, GenerationRequest, Role};
pub use template::{ArchiveFetcher, HttpArchiveFetcher};
