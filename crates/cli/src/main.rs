//! `vidgen` -- command-line front end for the video-generation backend.
//!
//! Signs in, submits text/image-to-video jobs and waits for the result.
//! Session tokens are kept under `VIDGEN_SESSION_DIR` between runs.
//!
//! # Environment variables
//!
//! | Variable                      | Default                        | Description                     |
//! |-------------------------------|--------------------------------|---------------------------------|
//! | `VIDGEN_API_BASE_URL`         | `http://localhost:8000/api/v1` | Backend API root                |
//! | `VIDGEN_POLL_INTERVAL_SECS`   | `10`                           | Seconds between status checks   |
//! | `VIDGEN_POLL_MAX_ATTEMPTS`    | `60`                           | Status checks before timing out |
//! | `VIDGEN_REQUEST_TIMEOUT_SECS` | `30`                           | Per-request HTTP timeout        |
//! | `VIDGEN_SESSION_DIR`          | `<data dir>/vidgen`            | Persisted session directory     |
//! | `RUST_LOG`                    | `vidgen=info,vidgen_client=info` | Log filter                    |

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidgen_core::models::DEFAULT_MODEL;

#[derive(Parser)]
#[command(name = "vidgen", version, about = "Generate videos from text or images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Prompted for (twice) when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user's profile
    Whoami,

    /// List previously generated videos
    Videos,

    /// Submit a generation job and wait for the video
    Generate {
        /// Text prompt (optional when an image is given)
        #[arg(short, long, default_value = "")]
        prompt: String,

        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Clip length in seconds; capped per provider
        #[arg(short, long, default_value_t = 5)]
        duration: u32,

        /// 720p or 1080p
        #[arg(short, long, default_value = "720p")]
        resolution: String,

        /// 16:9 or 9:16
        #[arg(short, long, default_value = "16:9")]
        aspect: String,

        #[arg(long, default_value_t = vidgen_core::models::DEFAULT_FPS)]
        fps: u32,

        /// Source image for image-to-video
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidgen=info,vidgen_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app = commands::App::from_env().await?;

    match cli.command {
        Command::Login { email, password } => app.login(&email, password).await,
        Command::Register {
            email,
            first_name,
            last_name,
            password,
        } => app.register(email, first_name, last_name, password).await,
        Command::Logout => {
            app.logout().await;
            Ok(())
        }
        Command::Whoami => app.whoami().await,
        Command::Videos => app.videos().await,
        Command::Generate {
            prompt,
            model,
            duration,
            resolution,
            aspect,
            fps,
            image,
        } => {
            let args = commands::GenerateArgs {
                prompt,
                model,
                duration,
                resolution,
                aspect,
                fps,
                image,
            };
            app.generate(args).await
        }
    }
}
