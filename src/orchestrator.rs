//! Generation orchestration: credential lifecycle plus the prompt and image
//! requests.
//!
//! All methods take `&self` so intents such as reset can be issued while a
//! provider call is still outstanding. Every transition that clears session
//! data bumps an epoch; a response is applied only if the epoch (and, for
//! images, the prompt revision) captured at dispatch is still current.

use crate::ai::{ChatService, ImageGenerationService};
use crate::models::{Brief, Credential, Mode, Operation, Transition};
use crate::store::CredentialStore;
use crate::{prompts, Error, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Injectable collaborators used to construct an [`Orchestrator`].
pub struct OrchestratorServices {
    pub store: Box<dyn CredentialStore>,
    pub chat: Box<dyn ChatService>,
    pub image_gen: Box<dyn ImageGenerationService>,
}

/// Mode together with the data it owns, so a credential can only exist in
/// live mode.
enum Access {
    Unconfigured,
    Simulated,
    Live(Credential),
}

impl Access {
    fn mode(&self) -> Mode {
        match self {
            Access::Unconfigured => Mode::Unconfigured,
            Access::Simulated => Mode::Simulated,
            Access::Live(_) => Mode::Live,
        }
    }
}

#[derive(Default)]
struct OperationSlot {
    in_flight: bool,
    error: Option<String>,
}

impl OperationSlot {
    fn status(&self) -> OperationStatus {
        OperationStatus {
            in_flight: self.in_flight,
            error: self.error.clone(),
        }
    }
}

struct SessionState {
    access: Access,
    epoch: u64,
    prompt_revision: u64,
    prompt: Option<String>,
    image_url: Option<String>,
    prompt_op: OperationSlot,
    image_op: OperationSlot,
}

impl SessionState {
    fn new(access: Access) -> Self {
        Self {
            access,
            epoch: 0,
            prompt_revision: 0,
            prompt: None,
            image_url: None,
            prompt_op: OperationSlot::default(),
            image_op: OperationSlot::default(),
        }
    }

    fn check(&self, transition: Transition) -> Result<Mode> {
        let from = self.access.mode();
        from.apply(transition)
            .ok_or(Error::InvalidTransition { from, transition })
    }

    /// Enter `access` with no results, no pending flags and a fresh epoch.
    fn restart(&mut self, access: Access) {
        let epoch = self.epoch + 1;
        *self = Self::new(access);
        self.epoch = epoch;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatus {
    pub in_flight: bool,
    pub error: Option<String>,
}

/// Everything the presentation layer needs to render the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub mode: Mode,
    pub generated_prompt: Option<String>,
    pub image_url: Option<String>,
    pub prompt_status: OperationStatus,
    pub image_status: OperationStatus,
}

impl Snapshot {
    /// The image URL, unless the provider answered without one.
    pub fn displayable_image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

pub struct Orchestrator {
    store: Box<dyn CredentialStore>,
    chat: Box<dyn ChatService>,
    image_gen: Box<dyn ImageGenerationService>,
    simulation_delay: Duration,
    state: Mutex<SessionState>,
}

impl Orchestrator {
    /// Build the orchestrator, entering live mode when the store already
    /// holds a credential.
    pub async fn new(services: OrchestratorServices, simulation_delay: Duration) -> Result<Self> {
        let access = match services.store.load().await? {
            Some(credential) => {
                info!("Loaded stored credential, starting in live mode");
                Access::Live(credential)
            }
            None => Access::Unconfigured,
        };

        Ok(Self {
            store: services.store,
            chat: services.chat,
            image_gen: services.image_gen,
            simulation_delay,
            state: Mutex::new(SessionState::new(access)),
        })
    }

    pub async fn mode(&self) -> Mode {
        self.state.lock().await.access.mode()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot {
            mode: state.access.mode(),
            generated_prompt: state.prompt.clone(),
            image_url: state.image_url.clone(),
            prompt_status: state.prompt_op.status(),
            image_status: state.image_op.status(),
        }
    }

    pub async fn submit_credential(&self, raw: &str) -> Result<()> {
        let credential = Credential::new(raw)?;

        let mut state = self.state.lock().await;
        state.check(Transition::SubmitCredential)?;
        self.store.save(&credential).await?;
        state.restart(Access::Live(credential));

        info!("Credential saved, entering live mode");
        Ok(())
    }

    pub async fn choose_simulation(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(Transition::ChooseSimulation)?;
        state.restart(Access::Simulated);

        info!("Entering simulation mode");
        Ok(())
    }

    /// Forget the credential everywhere and drop all results.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check(Transition::Reset)?;
        self.store.clear().await?;
        state.restart(Access::Unconfigured);

        info!("Session reset");
        Ok(())
    }

    /// Leave the current mode: live goes straight to simulation, simulation
    /// goes back to the credential prompt. Returns the new mode.
    pub async fn switch_mode(&self) -> Result<Mode> {
        let mut state = self.state.lock().await;
        let next = state.check(Transition::SwitchMode)?;
        self.store.clear().await?;
        state.restart(match next {
            Mode::Simulated => Access::Simulated,
            _ => Access::Unconfigured,
        });

        info!("Switched to {} mode", next);
        Ok(next)
    }

    /// Turn a brief into an image prompt, either through the provider or,
    /// in simulation mode, from the canned template after a fixed delay.
    pub async fn generate_prompt(&self, brief: &str) -> Result<String> {
        let brief = Brief::parse(brief)?;

        let (epoch, credential) = {
            let mut state = self.state.lock().await;
            let credential = match &state.access {
                Access::Unconfigured => return Err(Error::MissingCredential),
                Access::Simulated => None,
                Access::Live(credential) => Some(credential.clone()),
            };
            if state.prompt_op.in_flight {
                return Err(Error::Busy(Operation::Prompt));
            }
            state.prompt_op.in_flight = true;
            state.prompt_op.error = None;
            (state.epoch, credential)
        };

        let outcome = match &credential {
            None => {
                tokio::time::sleep(self.simulation_delay).await;
                Ok(prompts::simulated_prompt(brief.as_str()))
            }
            Some(credential) => {
                self.chat
                    .generate_text_completion(
                        Some(credential),
                        prompts::CHAT_SYSTEM,
                        brief.as_str(),
                    )
                    .await
            }
        };

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            warn!("Discarding prompt response from a previous session");
            return Err(Error::Discarded(Operation::Prompt));
        }
        state.prompt_op.in_flight = false;

        match outcome {
            Ok(prompt) => {
                state.prompt = Some(prompt.clone());
                state.prompt_revision += 1;
                state.image_url = None;
                state.image_op.error = None;
                info!("Prompt generated ({} chars)", prompt.chars().count());
                Ok(prompt)
            }
            Err(e) => {
                error!("Prompt generation failed: {}", e);
                state.prompt_op.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Request an image for the most recently generated prompt. Only
    /// available in live mode.
    pub async fn generate_image(&self) -> Result<String> {
        let (epoch, revision, credential, prompt) = {
            let mut state = self.state.lock().await;
            let prompt = state.prompt.clone().ok_or_else(|| {
                Error::Validation("Generate a prompt before requesting an image.".to_string())
            })?;
            let credential = match &state.access {
                Access::Live(credential) => credential.clone(),
                Access::Simulated => {
                    return Err(Error::Validation(
                        "Image generation is not available in simulation mode. Provide an API key to generate images."
                            .to_string(),
                    ))
                }
                Access::Unconfigured => return Err(Error::MissingCredential),
            };
            if state.image_op.in_flight {
                return Err(Error::Busy(Operation::Image));
            }
            state.image_op.in_flight = true;
            state.image_op.error = None;
            (state.epoch, state.prompt_revision, credential, prompt)
        };

        let outcome = self
            .image_gen
            .generate_image(Some(&credential), &prompt)
            .await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            warn!("Discarding image response from a previous session");
            return Err(Error::Discarded(Operation::Image));
        }
        state.image_op.in_flight = false;
        if state.prompt_revision != revision {
            warn!("Discarding image response for a superseded prompt");
            return Err(Error::Discarded(Operation::Image));
        }

        match outcome {
            Ok(url) => {
                if url.is_empty() {
                    warn!("Provider returned no image for the prompt");
                }
                state.image_url = Some(url.clone());
                Ok(url)
            }
            Err(e) => {
                error!("Image generation failed: {}", e);
                state.image_op.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
