use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use log::{debug, error};

use aeosgen::{GeneratorConfig, HttpArchiveFetcher, OpenAiClient, PluginGenerator};

/// Scaffold an Aeos plugin from the template repository and a prompt
#[derive(Debug, Parser)]
#[command(name = "aeosgen", version)]
struct Args
{   /// Plugin name; also the directory created under --root
    name: String
  , /// What the plugin should do
    prompt: String
  , /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>
  , /// Directory the plugin is created in
    #[arg(long, default_value = ".")]
    root: PathBuf
  , /// Completion service API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let args = Args::parse();
    debug!("Parsed arguments for plugin {}", args.name);

    match run(args).await
    {   Ok(true) => ExitCode::SUCCESS
      , Ok(false) => {
          eprintln!("Target directory already exists");
          ExitCode::FAILURE
        }
      , Err(e) => {
          error!("{}", e);
          eprintln!("{}", e);
          ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool, aeosgen::Error>
{   let config = match &args.config
    {   Some(path) => GeneratorConfig::from_file(path)?
      , None => GeneratorConfig::default()
    };

    let completion = OpenAiClient::new(&config.completion, args.api_key)?;
    let generator = PluginGenerator::new(
      HttpArchiveFetcher::new(),
      completion,
      config,
      args.root
    );

    let created = generator.generate(&args.name, &args.prompt).await?;
    if created
    {   println!(
          "Created plugin {}",
          generator.target_dir(&args.name).display()
        );
    }
    Ok(created)
}
