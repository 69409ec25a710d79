//! Design flow orchestrator
//!
//! Sequences preference selection → description → 3-D model → email/view.
//! Each step is user-initiated and awaited. The orchestrator owns the stage,
//! the notices, and the pending email authorization; front ends only render
//! what it exposes.

use crate::guard::StepGuards;
use crate::notices::{Notice, NoticeBoard, NoticeLevel};
use crate::session::{SessionState, SessionStore};
use crate::stage::FlowStage;
use limbform_clients::{
    DescriptionService, EmailOutcome, EmailRequest, GenerationResult, ModelProbe, ModelResult,
    ModelService, NotificationService, ViewerOutcome, resolve_viewable_url,
};
use limbform_prompt::{PreferenceField, PreferenceSelection, shorten_for_model_prompt};
use limbform_utils::error::{FlowError, UserFriendlyError};
use limbform_utils::types::FlowStep;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// An email delivery waiting on an out-of-band authorization step.
///
/// Holds everything needed to re-issue the identical call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAuthorization {
    pub auth_url: String,
    pub model_url: String,
    pub description: Option<String>,
}

/// Point-in-time view of the flow for rendering
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub stage: FlowStage,
    pub progress_index: u8,
    pub selection: PreferenceSelection,
    pub description: Option<String>,
    pub model_prompt: Option<String>,
    pub model_url: Option<String>,
    pub viewer: Option<ViewerOutcome>,
    pub pending_authorization: Option<PendingAuthorization>,
    pub running: Vec<FlowStep>,
    pub notices: Vec<Notice>,
}

#[derive(Debug)]
struct FlowState {
    stage: FlowStage,
    selection: PreferenceSelection,
    generation: Option<GenerationResult>,
    model_prompt: Option<String>,
    model_url: Option<String>,
    viewer: Option<ViewerOutcome>,
    pending_authorization: Option<PendingAuthorization>,
    notices: NoticeBoard,
}

impl FlowState {
    fn new() -> Self {
        Self {
            stage: FlowStage::Selecting,
            selection: PreferenceSelection::new(),
            generation: None,
            model_prompt: None,
            model_url: None,
            viewer: None,
            pending_authorization: None,
            notices: NoticeBoard::default(),
        }
    }

    fn advance_to(&mut self, target: FlowStage) {
        self.stage = self.stage.max(target);
    }

    fn description(&self) -> Option<&str> {
        self.generation.as_ref().map(|g| g.description.as_str())
    }
}

/// The flow controller.
///
/// All methods take `&self`; a step may run while a different step is in
/// flight, but the same step is rejected with [`FlowError::Busy`].
pub struct DesignFlow {
    description_service: Option<Arc<dyn DescriptionService>>,
    model_service: Option<Arc<dyn ModelService>>,
    notification_service: Option<Arc<dyn NotificationService>>,
    probe: Option<Arc<dyn ModelProbe>>,
    session: Option<SessionStore>,
    fallback_model_url: String,
    guards: StepGuards,
    state: Mutex<FlowState>,
}

impl DesignFlow {
    /// Create a flow with no services attached.
    ///
    /// `fallback_model_url` is shown when a generated model cannot be loaded.
    #[must_use]
    pub fn new(fallback_model_url: impl Into<String>) -> Self {
        Self {
            description_service: None,
            model_service: None,
            notification_service: None,
            probe: None,
            session: None,
            fallback_model_url: fallback_model_url.into(),
            guards: StepGuards::default(),
            state: Mutex::new(FlowState::new()),
        }
    }

    #[must_use]
    pub fn with_description_service(mut self, service: Arc<dyn DescriptionService>) -> Self {
        self.description_service = Some(service);
        self
    }

    #[must_use]
    pub fn with_model_service(mut self, service: Arc<dyn ModelService>) -> Self {
        self.model_service = Some(service);
        self
    }

    #[must_use]
    pub fn with_notification_service(mut self, service: Arc<dyn NotificationService>) -> Self {
        self.notification_service = Some(service);
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ModelProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Persist results to `store` after each successful generation
    #[must_use]
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.session = Some(store);
        self
    }

    fn state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn not_ready(step: FlowStep, reason: &str) -> FlowError {
        FlowError::NotReady {
            step,
            reason: reason.to_string(),
        }
    }

    /// Restore description and model URL from the session store.
    ///
    /// Returns the loaded session. Without a store this is a no-op.
    pub fn resume_from_session(&self) -> Result<SessionState, FlowError> {
        let Some(store) = &self.session else {
            return Ok(SessionState::default());
        };
        let saved = store.load()?;

        let mut state = self.state();
        if let Some(description) = &saved.prosthetic_model_description {
            state.generation = Some(GenerationResult {
                prompt: String::new(),
                description: description.clone(),
            });
            state.advance_to(FlowStage::Describing);
        }
        if let Some(url) = &saved.prosthetic_model_url {
            state.model_url = Some(url.clone());
            state.model_prompt = saved.prosthetic_model_prompt.clone();
            state.advance_to(FlowStage::ModelGenerating);
        }
        Ok(saved)
    }

    fn persist(&self, change: impl FnOnce(&mut SessionState)) {
        let Some(store) = &self.session else {
            return;
        };
        if let Err(e) = store.update(change) {
            warn!(error = %e, "Failed to save session");
            self.state().notices.push(
                NoticeLevel::Warning,
                None,
                format!("Result not saved for later commands: {e}"),
            );
        }
    }

    pub fn set_preference(&self, field: PreferenceField, value: Option<String>) {
        self.state().selection.set(field, value);
    }

    pub fn set_selection(&self, selection: PreferenceSelection) {
        self.state().selection = selection;
    }

    #[must_use]
    pub fn selection(&self) -> PreferenceSelection {
        self.state().selection.clone()
    }

    /// Use an existing description instead of generating one
    pub fn adopt_description(&self, description: impl Into<String>) {
        let mut state = self.state();
        state.generation = Some(GenerationResult {
            prompt: String::new(),
            description: description.into(),
        });
        state.advance_to(FlowStage::Describing);
    }

    /// Use an existing model URL instead of generating one
    pub fn adopt_model_url(&self, model_url: impl Into<String>) {
        let mut state = self.state();
        state.model_url = Some(model_url.into());
        state.advance_to(FlowStage::ModelGenerating);
    }

    /// Generate a description from the current selection.
    ///
    /// # Errors
    ///
    /// - `FlowError::EmptySelection` before any network call
    /// - `FlowError::Busy` if a description is already being generated
    /// - `FlowError::Description` when the service fails or returns an
    ///   `"Error..."` description
    pub async fn describe(&self) -> Result<GenerationResult, FlowError> {
        let step = FlowStep::Describe;
        let _guard = self.guards.acquire(step)?;
        let service = self
            .description_service
            .clone()
            .ok_or_else(|| Self::not_ready(step, "no description service configured"))?;

        let selection = self.state().selection.clone();
        if selection.is_empty() {
            let err = FlowError::EmptySelection;
            self.state()
                .notices
                .push(NoticeLevel::Error, Some(step), err.to_string());
            return Err(err);
        }

        let result = match service.generate_description(&selection).await {
            Ok(result) if result.is_legacy_error() => Err(result.description),
            Ok(result) => Ok(result),
            Err(e) => Err(e.user_message()),
        };

        let generation = match result {
            Ok(generation) => generation,
            Err(message) => return Err(self.fail(step, FlowError::Description(message))),
        };

        {
            let mut state = self.state();
            state.generation = Some(generation.clone());
            state.advance_to(FlowStage::Describing);
            state
                .notices
                .push(NoticeLevel::Success, Some(step), "Description generated");
        }
        info!(step = %step, "Description generated");

        let description = generation.description.clone();
        // A saved model belongs to the description it was built from
        self.persist(|s| {
            s.prosthetic_model_description = Some(description);
            s.prosthetic_model_prompt = None;
            s.prosthetic_model_url = None;
        });
        Ok(generation)
    }

    /// Generate a 3-D model from the current description.
    ///
    /// May be repeated after a description exists; a failure keeps the
    /// previous description and stage.
    pub async fn generate_model(&self) -> Result<ModelResult, FlowError> {
        let step = FlowStep::Model;
        let _guard = self.guards.acquire(step)?;
        let service = self
            .model_service
            .clone()
            .ok_or_else(|| Self::not_ready(step, "no model service configured"))?;

        let description = self
            .state()
            .description()
            .map(str::to_string)
            .ok_or_else(|| Self::not_ready(step, "no description has been generated"))?;
        let prompt = shorten_for_model_prompt(&description);

        let result = service.generate_model(&prompt).await;
        if !result.success {
            return Err(self.fail(step, FlowError::Model(result.message)));
        }

        {
            let mut state = self.state();
            state.model_prompt = Some(prompt.clone());
            state.model_url = Some(result.model_url.clone());
            state.viewer = None;
            state.pending_authorization = None;
            state.advance_to(FlowStage::ModelGenerating);
            state
                .notices
                .push(NoticeLevel::Success, Some(step), "3D model generated");
        }
        info!(step = %step, "Model generated");

        let url = result.model_url.clone();
        self.persist(|s| {
            s.prosthetic_model_prompt = Some(prompt);
            s.prosthetic_model_url = Some(url);
        });
        Ok(result)
    }

    /// Email the current model link to the manufacturer.
    ///
    /// `AuthorizationRequired` is returned as `Ok` and recorded as pending;
    /// the stage never changes.
    pub async fn send_email(&self) -> Result<EmailOutcome, FlowError> {
        let step = FlowStep::Email;
        let _guard = self.guards.acquire(step)?;

        let request = {
            let state = self.state();
            let model_url = state
                .model_url
                .clone()
                .ok_or_else(|| Self::not_ready(step, "no model has been generated"))?;
            EmailRequest {
                model_url,
                description: state.description().map(str::to_string),
            }
        };

        self.deliver(request).await
    }

    /// Re-issue the email call that asked for authorization, unchanged
    pub async fn retry_email(&self) -> Result<EmailOutcome, FlowError> {
        let step = FlowStep::Email;
        let _guard = self.guards.acquire(step)?;

        let pending = self
            .state()
            .pending_authorization
            .clone()
            .ok_or_else(|| Self::not_ready(step, "no email is waiting for authorization"))?;

        self.deliver(EmailRequest {
            model_url: pending.model_url,
            description: pending.description,
        })
        .await
    }

    async fn deliver(&self, request: EmailRequest) -> Result<EmailOutcome, FlowError> {
        let step = FlowStep::Email;
        let service = self
            .notification_service
            .clone()
            .ok_or_else(|| Self::not_ready(step, "no email service configured"))?;

        let outcome = service.send_model_link(&request).await;
        let mut state = self.state();
        match &outcome {
            EmailOutcome::Sent { .. } => {
                state.pending_authorization = None;
                state.notices.push(
                    NoticeLevel::Success,
                    Some(step),
                    "Model link emailed to the manufacturer",
                );
            }
            EmailOutcome::AuthorizationRequired { auth_url, .. } => {
                state.pending_authorization = Some(PendingAuthorization {
                    auth_url: auth_url.clone(),
                    model_url: request.model_url,
                    description: request.description,
                });
                state.notices.push(
                    NoticeLevel::Warning,
                    Some(step),
                    format!("Authorize email sending at {auth_url}, then retry"),
                );
            }
            EmailOutcome::Failed { message } => {
                let err = FlowError::Notification(message.clone());
                state
                    .notices
                    .push(NoticeLevel::Error, Some(step), err.to_string());
                warn!(step = %step, error = %err, "Step failed");
                return Err(err);
            }
        }
        Ok(outcome)
    }

    /// Resolve the URL to show for the current model
    pub async fn view(&self) -> Result<ViewerOutcome, FlowError> {
        let step = FlowStep::View;
        let _guard = self.guards.acquire(step)?;
        let probe = self
            .probe
            .clone()
            .ok_or_else(|| Self::not_ready(step, "no model probe configured"))?;

        let model_url = self
            .state()
            .model_url
            .clone()
            .ok_or_else(|| Self::not_ready(step, "no model has been generated"))?;

        let outcome =
            match resolve_viewable_url(probe.as_ref(), &model_url, &self.fallback_model_url).await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    return Err(self.fail(
                        step,
                        FlowError::Viewer(format!(
                            "neither the model nor the fallback could be loaded: {}",
                            e.user_message()
                        )),
                    ));
                }
            };

        let mut state = self.state();
        state.viewer = Some(outcome.clone());
        state.advance_to(FlowStage::Viewing);
        if outcome.used_fallback {
            state.notices.push(
                NoticeLevel::Warning,
                Some(step),
                "The generated model could not be loaded; showing the sample model",
            );
        }
        Ok(outcome)
    }

    fn fail(&self, step: FlowStep, err: FlowError) -> FlowError {
        warn!(step = %step, error = %err, "Step failed");
        self.state()
            .notices
            .push(NoticeLevel::Error, Some(step), err.to_string());
        err
    }

    #[must_use]
    pub fn stage(&self) -> FlowStage {
        self.state().stage
    }

    #[must_use]
    pub fn progress_index(&self) -> u8 {
        self.stage().progress_index()
    }

    #[must_use]
    pub fn is_running(&self, step: FlowStep) -> bool {
        self.guards.is_running(step)
    }

    #[must_use]
    pub fn pending_authorization(&self) -> Option<PendingAuthorization> {
        self.state().pending_authorization.clone()
    }

    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.state().description().map(str::to_string)
    }

    #[must_use]
    pub fn model_url(&self) -> Option<String> {
        self.state().model_url.clone()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.state().notices.active()
    }

    /// Dismiss one notice; false if it was already gone
    pub fn dismiss(&self, id: u64) -> bool {
        self.state().notices.dismiss(id)
    }

    /// Remove and return all notices
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.state().notices.take_all()
    }

    #[must_use]
    pub fn snapshot(&self) -> FlowSnapshot {
        let running = [
            FlowStep::Describe,
            FlowStep::Model,
            FlowStep::Email,
            FlowStep::View,
        ]
        .into_iter()
        .filter(|step| self.guards.is_running(*step))
        .collect();

        let state = self.state();
        FlowSnapshot {
            stage: state.stage,
            progress_index: state.stage.progress_index(),
            selection: state.selection.clone(),
            description: state.description().map(str::to_string),
            model_prompt: state.model_prompt.clone(),
            model_url: state.model_url.clone(),
            viewer: state.viewer.clone(),
            pending_authorization: state.pending_authorization.clone(),
            running,
            notices: state.notices.active(),
        }
    }
}
