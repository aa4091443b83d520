//! Command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use vidgen_client::api::VideoApi;
use vidgen_client::clock::TokioClock;
use vidgen_client::config::ClientConfig;
use vidgen_client::error::ClientError;
use vidgen_client::session::SessionHolder;
use vidgen_client::store::FileSessionStore;
use vidgen_client::workflow::{AwaitOptions, GenerationController, JobProgress};
use vidgen_core::auth::Registration;
use vidgen_core::generation::{GenerationRequest, SourceImage};
use vidgen_core::models::reselect_model;
use vidgen_core::resolution::{dimensions_for, AspectRatio, ResolutionTier};
use vidgen_core::status_messages::{next_message_index, LOADING_MESSAGES, ROTATION_INTERVAL};

/// Raw `generate` arguments as parsed from the command line.
pub struct GenerateArgs {
    pub prompt: String,
    pub model: String,
    pub duration: u32,
    pub resolution: String,
    pub aspect: String,
    pub fps: u32,
    pub image: Option<PathBuf>,
}

/// Shared state for one CLI invocation.
pub struct App {
    config: ClientConfig,
    api: VideoApi,
    session: SessionHolder,
}

impl App {
    /// Load configuration and restore any stored session.
    pub async fn from_env() -> anyhow::Result<Self> {
        let config = ClientConfig::from_env()?;
        let api = VideoApi::with_client(config.http_client()?, config.api_base_url.clone());
        let store = Arc::new(FileSessionStore::new(config.session_dir.clone()));
        let session = SessionHolder::restore(Arc::new(api.clone()), store).await;

        tracing::debug!(
            api_base_url = %config.api_base_url,
            session_dir = %config.session_dir.display(),
            "Configuration loaded",
        );

        Ok(Self {
            config,
            api,
            session,
        })
    }

    pub async fn login(&self, email: &str, password: Option<String>) -> anyhow::Result<()> {
        let password = match password {
            Some(p) => p,
            None => rpassword::prompt_password("Password: ")?,
        };
        let session = self.session.login(email, &password).await?;
        println!("Signed in as {}", session.user.email);
        Ok(())
    }

    pub async fn register(
        &self,
        email: String,
        first_name: String,
        last_name: String,
        password: Option<String>,
    ) -> anyhow::Result<()> {
        let (password, confirm_password) = match password {
            Some(p) => (p.clone(), p),
            None => (
                rpassword::prompt_password("Password: ")?,
                rpassword::prompt_password("Confirm password: ")?,
            ),
        };
        let form = Registration {
            email,
            password,
            confirm_password,
            first_name,
            last_name,
        };
        let session = self.session.register(&form).await?;
        println!("Account created. Signed in as {}", session.user.email);
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        println!("Signed out");
    }

    pub async fn whoami(&self) -> anyhow::Result<()> {
        let token = self.token().await?;
        let profile = self.api.profile(&token).await?;
        println!("{} {} <{}>", profile.first_name, profile.last_name, profile.email);
        println!("  id:       {}", profile.id);
        println!("  plan:     {}", profile.subscription_tier);
        println!("  credits:  {:.2}", profile.credits_balance);
        println!("  verified: {}", profile.is_verified);
        Ok(())
    }

    pub async fn videos(&self) -> anyhow::Result<()> {
        let token = self.token().await?;
        let videos = self.api.list_videos(&token).await?;
        if videos.is_empty() {
            println!("No videos yet");
            return Ok(());
        }
        for video in videos {
            println!(
                "{:<12} {:<10} {}",
                video.id,
                video.status.as_deref().unwrap_or("-"),
                video
                    .video_url
                    .as_deref()
                    .or(video.prompt.as_deref())
                    .unwrap_or(""),
            );
        }
        Ok(())
    }

    pub async fn generate(&self, args: GenerateArgs) -> anyhow::Result<()> {
        let token = self.token().await?;

        let duration = reselect_model(args.duration, &args.model)?;
        if duration != args.duration {
            println!(
                "Duration reduced to {duration}s, the maximum for {}",
                args.model
            );
        }

        let tier: ResolutionTier = args.resolution.parse()?;
        let aspect: AspectRatio = args.aspect.parse()?;
        let image = match &args.image {
            Some(path) => Some(read_image(path).await?),
            None => None,
        };

        let request = GenerationRequest {
            prompt: args.prompt,
            image,
            model: args.model,
            duration_secs: duration,
            dimensions: dimensions_for(tier, aspect),
            fps: args.fps,
        };

        let controller = GenerationController::new(
            Arc::new(self.api.clone()),
            Arc::new(TokioClock),
            self.config.poll,
        );
        let handle = controller.submit(&request, &token).await?;
        println!("Job {} submitted", handle.job_id);

        let cancel = CancellationToken::new();
        let on_ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_ctrl_c.cancel();
            }
        });

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let done = CancellationToken::new();
        let reporter = tokio::spawn(report_progress(progress_rx, done.clone()));

        let options = AwaitOptions {
            cancel,
            progress: Some(progress_tx),
        };
        let outcome = controller.await_completion(&handle, &token, &options).await;
        done.cancel();
        let _ = reporter.await;

        match outcome {
            Ok(result) => {
                println!("Video ready: {}", result.video_url);
                Ok(())
            }
            Err(ClientError::Cancelled) => {
                println!("Stopped waiting. Job {} keeps running on the server", handle.job_id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn token(&self) -> anyhow::Result<String> {
        self.session
            .current_token()
            .await
            .context("Not signed in. Run `vidgen login` first")
    }
}

/// Print a rotating status line and any progress updates until `done`.
async fn report_progress(mut progress: mpsc::UnboundedReceiver<JobProgress>, done: CancellationToken) {
    let mut ticker = tokio::time::interval(ROTATION_INTERVAL);
    let mut index = 0;

    loop {
        tokio::select! {
            biased;
            _ = done.cancelled() => break,
            Some(update) = progress.recv() => {
                eprintln!("  {}% ({:?})", update.percent, update.state);
            }
            _ = ticker.tick() => {
                eprintln!("{}", LOADING_MESSAGES[index]);
                index = next_message_index(index);
            }
        }
    }
}

async fn read_image(path: &Path) -> anyhow::Result<SourceImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(SourceImage {
        bytes,
        mime_type,
        file_name,
    })
}
