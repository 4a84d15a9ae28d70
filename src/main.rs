use anyhow::{bail, Context, Result};
use briefing_prompt_generator::ai::{OpenAiChatClient, OpenAiImageClient};
use briefing_prompt_generator::config::Config;
use briefing_prompt_generator::models::Mode;
use briefing_prompt_generator::orchestrator::{Orchestrator, OrchestratorServices, Snapshot};
use briefing_prompt_generator::store::FileCredentialStore;
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "briefing-prompt-generator")]
#[command(about = "Turn an advertising brief into an image-generation prompt")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show whether an API key is configured.
    Status,
    /// Save an API key (read from stdin when omitted).
    Login {
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Forget the stored API key.
    Reset,
    /// Generate a prompt from a brief, and optionally an image.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Brief text.
    #[arg(
        value_name = "BRIEF",
        required_unless_present = "brief_file",
        conflicts_with = "brief_file"
    )]
    brief: Option<String>,

    /// Read the brief from a file instead.
    #[arg(long, value_name = "FILE")]
    brief_file: Option<PathBuf>,

    /// Use the offline template instead of the API.
    #[arg(long)]
    simulate: bool,

    /// Also generate an image for the prompt.
    #[arg(long)]
    image: bool,

    /// Write the generated prompt to this file.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briefing_prompt_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;

    // One connection pool for both endpoints.
    let http_client = reqwest::Client::new();
    let orchestrator = Orchestrator::new(
        OrchestratorServices {
            store: Box::new(FileCredentialStore::new(&config.credential_path)),
            chat: Box::new(
                OpenAiChatClient::new_with_client(http_client.clone())
                    .with_base_url(config.base_url.clone()),
            ),
            image_gen: Box::new(
                OpenAiImageClient::new_with_client(http_client)
                    .with_base_url(config.base_url.clone()),
            ),
        },
        config.simulation_delay,
    )
    .await?;

    if let Err(e) = run(&orchestrator, args.command).await {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(orchestrator: &Orchestrator, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            println!("{}", render_status(orchestrator.mode().await));
        }
        Command::Login { key } => {
            let key = match key {
                Some(key) => key,
                None => read_key_from_stdin()?,
            };
            orchestrator.submit_credential(&key).await?;
            info!("API key saved");
        }
        Command::Reset => {
            orchestrator.reset().await?;
            info!("API key removed");
        }
        Command::Generate(args) => generate(orchestrator, args).await?,
    }
    Ok(())
}

async fn generate(orchestrator: &Orchestrator, args: GenerateArgs) -> Result<()> {
    let brief = match (args.brief, &args.brief_file) {
        (Some(brief), _) => brief,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read brief from {}", path.display()))?,
        (None, None) => bail!("Provide a brief or --brief-file"),
    };

    if args.simulate {
        match orchestrator.mode().await {
            Mode::Unconfigured => orchestrator.choose_simulation().await?,
            Mode::Simulated => {}
            Mode::Live => bail!("--simulate needs an unconfigured session; run `reset` first"),
        }
    }

    orchestrator.generate_prompt(&brief).await?;

    // The prompt is kept even when the image step is refused or fails.
    let image_outcome = if args.image {
        orchestrator.generate_image().await.map(|_| ())
    } else {
        Ok(())
    };
    if let Err(e) = &image_outcome {
        warn!("Image not generated: {}", e);
    }

    let snapshot = orchestrator.snapshot().await;
    {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", render_snapshot(&snapshot, args.image))?;
    }

    if let (Some(path), Some(prompt)) = (&args.output, &snapshot.generated_prompt) {
        std::fs::write(path, prompt)
            .with_context(|| format!("Failed to write prompt to {}", path.display()))?;
        info!("Prompt copied to {}", path.display());
    }

    image_outcome.context("Prompt generated, but the image could not be produced")
}

fn read_key_from_stdin() -> Result<String> {
    eprint!("API key: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read API key from stdin")?;
    Ok(line)
}

fn render_status(mode: Mode) -> String {
    match mode {
        Mode::Unconfigured => {
            "No API key configured. Run `login` or generate with --simulate.".to_string()
        }
        Mode::Simulated => "Simulation mode: prompts come from the offline template.".to_string(),
        Mode::Live => "API key configured. Prompts and images use the provider.".to_string(),
    }
}

fn render_snapshot(snapshot: &Snapshot, image_requested: bool) -> String {
    let mut out = String::new();
    if let Some(prompt) = &snapshot.generated_prompt {
        out.push_str("Generated prompt:\n\n");
        out.push_str(prompt);
    }
    if image_requested {
        out.push_str("\n\n");
        match snapshot.displayable_image() {
            Some(url) => {
                out.push_str("Image: ");
                out.push_str(url);
            }
            None => out.push_str("No image available."),
        }
    }
    out
}
