//! Video Publisher CLI
//!
//! Uploads a video through browser automation, then restores its metadata
//! and thumbnail through the YouTube Data API

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use video_publisher::{
    AccessToken, CONFIG_FILENAME, Category, ConfigLoadOptions, ConfigLoader, PipelineRun,
    PublishRequest, TracingLogger, VideoMetadata, VideoPublisherFactory, init_tracing,
};

/// Video publishing pipeline
#[derive(Parser)]
#[command(name = "video-publisher")]
#[command(version)]
#[command(about = "Upload a video through browser automation and restore its metadata", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a video
    Publish {
        /// Video title (restored after upload)
        #[arg(long)]
        title: String,

        /// Video description (restored after upload)
        #[arg(long, default_value = "")]
        description: String,

        /// Category name or numeric id
        #[arg(long, default_value = "people-and-blogs")]
        category: Category,

        /// Tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Declare the video as made for kids
        #[arg(long)]
        made_for_kids: bool,

        /// Video file
        #[arg(value_name = "VIDEO")]
        video: PathBuf,

        /// Thumbnail image
        #[arg(long)]
        thumbnail: Option<PathBuf>,

        /// Use this access token instead of exchanging client credentials
        /// (falls back to VIDEO_PUBLISHER_GOOGLE_ACCESS_TOKEN / google.accessToken)
        #[arg(long)]
        access_token: Option<String>,

        /// Configuration file (defaults to ./.video-publisher.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate the configuration
    Check {
        /// Configuration file (defaults to ./.video-publisher.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List supported categories
    Categories,

    /// Write a template configuration file
    Init {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

const CONFIG_TEMPLATE: &str = r#"version: "1.0"

automation:
  runtime: node
  script: ./automation/post.js
  timeoutSecs: 900

account:
  login: ${VIDEO_PUBLISHER_LOGIN}
  password: ${VIDEO_PUBLISHER_PASSWORD}
  channelId: ${VIDEO_PUBLISHER_CHANNEL_ID}

google:
  clientId: ${GOOGLE_CLIENT_ID}
  clientSecret: ${GOOGLE_CLIENT_SECRET}
  refreshToken: ${GOOGLE_REFRESH_TOKEN}
"#;

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Publish {
            title,
            description,
            category,
            tags,
            made_for_kids,
            video,
            thumbnail,
            access_token,
            config,
        } => {
            let mut request = PublishRequest::new(VideoMetadata::new(title, description, category), video)
                .with_tags(tags)
                .with_made_for_kids(made_for_kids);
            if let Some(thumbnail) = thumbnail {
                request = request.with_thumbnail(thumbnail);
            }

            publish_command(request, access_token, config, cli.verbose).await
        }
        Commands::Check { config } => check_command(config).await,
        Commands::Categories => categories_command(),
        Commands::Init { project_path, force } => {
            init_command(project_path.unwrap_or_else(|| PathBuf::from(".")), force).await
        }
    }
}

async fn load_factory(config_path: Option<PathBuf>) -> Result<VideoPublisherFactory> {
    let project_path = std::env::current_dir().context("failed to resolve current directory")?;

    let config = ConfigLoader::load(ConfigLoadOptions {
        project_path: project_path.clone(),
        config_path,
        env: std::env::vars().collect(),
    })
    .await?;

    Ok(VideoPublisherFactory::new(config, project_path))
}

async fn publish_command(
    request: PublishRequest,
    access_token: Option<String>,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<i32> {
    println!("\n🎬 Publishing {}\n", request.video_file_path.display());

    let factory = load_factory(config_path).await?;
    let publisher = factory.make(Arc::new(TracingLogger::new()))?;
    let credentials = factory.upload_credentials()?;

    let token = match access_token.filter(|t| !t.is_empty()) {
        Some(token) => Some(AccessToken::new(token)),
        None => factory.access_token()?,
    };

    let run = match token {
        Some(token) => publisher.run_via_token(&credentials, &request, &token).await,
        None => {
            let client = factory.client_credentials()?.ok_or_else(|| {
                anyhow!("no access token and no google client credentials configured")
            })?;
            publisher
                .run_via_credential_exchange(&credentials, &request, &client)
                .await
        }
    };

    print_summary(&run, verbose);

    Ok(if run.outcome().is_some() { 0 } else { 1 })
}

fn print_summary(run: &PipelineRun, verbose: bool) {
    match run.outcome() {
        Some(video_id) => println!("✅ Video id: {}", video_id),
        None => println!("❌ Video was not published"),
    }

    println!("   Run: {}", run.run_id);
    println!("   Final state: {}", run.state());
    println!("   Duration: {}ms", run.elapsed_millis());

    if !run.failures().is_empty() {
        println!("\n⚠️  Stage failures:");
        for failure in run.failures() {
            println!(
                "  - [{}] {} ({}): {}",
                failure.stage.as_str(),
                failure.code,
                failure.level,
                failure.message
            );
        }
    }

    if verbose {
        println!("\n📜 Transitions:\n{}", run.history());
    }
}

async fn check_command(config_path: Option<PathBuf>) -> Result<i32> {
    println!("\n🔍 Configuration Check\n");

    let factory = load_factory(config_path).await?;
    let result = ConfigLoader::validate(factory.config());

    println!("{}", ConfigLoader::format_validation_result(&result));

    Ok(if result.valid { 0 } else { 1 })
}

fn categories_command() -> Result<i32> {
    for category in Category::ALL {
        println!("{:>3}  {}", category.id(), category);
    }
    Ok(0)
}

async fn init_command(project_path: PathBuf, force: bool) -> Result<i32> {
    println!("\n🎯 Initialize video-publisher\n");

    let target = project_path.join(CONFIG_FILENAME);
    if target.exists() && !force {
        eprintln!("⚠️  {} already exists (use --force to overwrite)", target.display());
        return Ok(1);
    }

    write_template(&target).await?;
    println!("✅ Wrote {}", target.display());
    Ok(0)
}

async fn write_template(target: &Path) -> Result<()> {
    tokio::fs::write(target, CONFIG_TEMPLATE)
        .await
        .with_context(|| format!("failed to write {}", target.display()))
}
