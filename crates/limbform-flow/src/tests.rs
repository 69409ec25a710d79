use crate::{DesignFlow, FlowStage, NoticeLevel, SessionStore};
use async_trait::async_trait;
use limbform_clients::{
    DescriptionService, EmailOutcome, EmailRequest, GenerationResult, ModelProbe, ModelResult,
    ModelService, NotificationService,
};
use limbform_prompt::{PreferenceField, PreferenceSelection, build_description_prompt};
use limbform_utils::error::{ClientError, FlowError};
use limbform_utils::types::FlowStep;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const FALLBACK: &str = "https://cdn.example.com/fallback.glb";

struct FakeDescriber {
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    delay: Duration,
}

impl FakeDescriber {
    fn replying(replies: Vec<Result<String, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            delay: Duration::ZERO,
        })
    }

    fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(vec![Ok(reply.to_string())].into()),
            delay,
        })
    }
}

#[async_trait]
impl DescriptionService for FakeDescriber {
    async fn generate_description(
        &self,
        selection: &PreferenceSelection,
    ) -> Result<GenerationResult, ClientError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let prompt = build_description_prompt(selection).unwrap_or_default();
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no scripted reply".to_string())));
        reply.map(|description| GenerationResult {
            prompt,
            description,
        })
    }
}

#[derive(Default)]
struct FakeModeler {
    replies: Mutex<VecDeque<ModelResult>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModeler {
    fn replying(replies: Vec<ModelResult>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::default(),
        })
    }
}

#[async_trait]
impl ModelService for FakeModeler {
    async fn generate_model(&self, prompt: &str) -> ModelResult {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ModelResult::failed("no scripted reply"))
    }
}

struct FakeMailer {
    replies: Mutex<VecDeque<EmailOutcome>>,
    requests: Mutex<Vec<EmailRequest>>,
    delay: Duration,
}

impl FakeMailer {
    fn replying(replies: Vec<EmailOutcome>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
            delay: Duration::ZERO,
        })
    }

    fn requests(&self) -> Vec<EmailRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationService for FakeMailer {
    async fn send_model_link(&self, request: &EmailRequest) -> EmailOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| EmailOutcome::Failed {
                message: "no scripted reply".to_string(),
            })
    }
}

struct FakeProbe {
    reachable: Vec<String>,
}

#[async_trait]
impl ModelProbe for FakeProbe {
    async fn probe(&self, url: &str) -> Result<(), ClientError> {
        if self.reachable.iter().any(|u| u == url) {
            Ok(())
        } else {
            Err(ClientError::Transport(format!("{url} unreachable")))
        }
    }
}

fn red_minimalist() -> PreferenceSelection {
    PreferenceSelection::new()
        .with(PreferenceField::PrimaryColor, "red")
        .with(PreferenceField::DesignStyle, "minimalist")
}

fn auth_required(url: &str) -> EmailOutcome {
    EmailOutcome::AuthorizationRequired {
        auth_url: url.to_string(),
        message: format!("Please authorize at {url}"),
    }
}

#[tokio::test]
async fn test_empty_selection_never_calls_service() {
    let describer = FakeDescriber::replying(vec![Ok("unused".to_string())]);
    let flow = DesignFlow::new(FALLBACK).with_description_service(describer.clone());

    let err = flow.describe().await.unwrap_err();

    assert!(matches!(err, FlowError::EmptySelection));
    assert_eq!(describer.replies.lock().unwrap().len(), 1);
    assert_eq!(flow.stage(), FlowStage::Selecting);
    assert_eq!(flow.notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_end_to_end_with_authorization_retry() {
    let model_url = "https://cdn.example.com/models/x.glb";
    let auth_url = "https://accounts.google.com/o/oauth2/auth?foo=bar";
    let describer = FakeDescriber::replying(vec![Ok("A matte red minimalist cover.".to_string())]);
    let modeler = FakeModeler::replying(vec![ModelResult::succeeded(model_url, "ok")]);
    let mailer = FakeMailer::replying(vec![
        auth_required(auth_url),
        EmailOutcome::Sent {
            message: "Email sent".to_string(),
        },
    ]);
    let flow = DesignFlow::new(FALLBACK)
        .with_description_service(describer)
        .with_model_service(modeler.clone())
        .with_notification_service(mailer.clone());
    flow.set_selection(red_minimalist());

    let generation = flow.describe().await.unwrap();
    assert!(generation.prompt.contains("Primary Color: red"));
    assert!(generation.prompt.contains("Design Style: minimalist"));
    assert_eq!(flow.stage(), FlowStage::Describing);
    assert_eq!(flow.progress_index(), 1);

    let model = flow.generate_model().await.unwrap();
    assert_eq!(model.model_url, model_url);
    assert_eq!(flow.stage(), FlowStage::ModelGenerating);
    assert_eq!(flow.progress_index(), 2);
    let sent_prompt = modeler.prompts.lock().unwrap()[0].clone();
    assert!(sent_prompt.starts_with("A matte red minimalist cover."));
    assert!(sent_prompt.contains("prosthetic leg"));

    let first = flow.send_email().await.unwrap();
    assert!(matches!(first, EmailOutcome::AuthorizationRequired { .. }));
    let pending = flow.pending_authorization().unwrap();
    assert_eq!(pending.auth_url, auth_url);
    assert_eq!(pending.model_url, model_url);
    assert_eq!(flow.stage(), FlowStage::ModelGenerating);

    let second = flow.retry_email().await.unwrap();
    assert!(matches!(second, EmailOutcome::Sent { .. }));
    assert!(flow.pending_authorization().is_none());

    let requests = mailer.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(requests[0].model_url, model_url);
    assert_eq!(
        requests[0].description.as_deref(),
        Some("A matte red minimalist cover.")
    );
}

#[tokio::test]
async fn test_failure_does_not_advance_or_roll_back() {
    let describer = FakeDescriber::replying(vec![Ok("A red cover.".to_string())]);
    let modeler = FakeModeler::replying(vec![
        ModelResult::failed("Model service rejected the request: bad prompt"),
        ModelResult::succeeded("https://cdn.example.com/a.glb", "ok"),
    ]);
    let flow = DesignFlow::new(FALLBACK)
        .with_description_service(describer)
        .with_model_service(modeler);
    flow.set_selection(red_minimalist());
    flow.describe().await.unwrap();

    let err = flow.generate_model().await.unwrap_err();
    assert!(matches!(err, FlowError::Model(ref m) if m.contains("bad prompt")));
    assert_eq!(flow.stage(), FlowStage::Describing);
    assert_eq!(flow.description().as_deref(), Some("A red cover."));

    // User retries the same step
    flow.generate_model().await.unwrap();
    assert_eq!(flow.stage(), FlowStage::ModelGenerating);
}

#[tokio::test]
async fn test_describing_again_keeps_later_stage() {
    let describer = FakeDescriber::replying(vec![
        Ok("First.".to_string()),
        Ok("Second.".to_string()),
    ]);
    let modeler = FakeModeler::replying(vec![ModelResult::succeeded("https://cdn.example.com/a.glb", "ok")]);
    let flow = DesignFlow::new(FALLBACK)
        .with_description_service(describer)
        .with_model_service(modeler);
    flow.set_selection(red_minimalist());

    flow.describe().await.unwrap();
    flow.generate_model().await.unwrap();
    flow.describe().await.unwrap();

    assert_eq!(flow.stage(), FlowStage::ModelGenerating);
    assert_eq!(flow.description().as_deref(), Some("Second."));
}

#[tokio::test]
async fn test_legacy_error_description_is_failure() {
    let describer = FakeDescriber::replying(vec![Ok(
        "Error generating description: upstream quota".to_string()
    )]);
    let flow = DesignFlow::new(FALLBACK).with_description_service(describer);
    flow.set_selection(red_minimalist());

    let err = flow.describe().await.unwrap_err();

    assert!(matches!(err, FlowError::Description(ref m) if m.starts_with("Error")));
    assert_eq!(flow.stage(), FlowStage::Selecting);
    assert!(flow.description().is_none());
}

#[tokio::test]
async fn test_client_error_becomes_description_failure() {
    let describer = FakeDescriber::replying(vec![Err(ClientError::ProviderQuota(
        "description rate limit exceeded: 429".to_string(),
    ))]);
    let flow = DesignFlow::new(FALLBACK).with_description_service(describer);
    flow.set_selection(red_minimalist());

    let err = flow.describe().await.unwrap_err();
    assert!(matches!(err, FlowError::Description(ref m) if m.contains("rate limit")));
}

#[tokio::test]
async fn test_steps_out_of_order_are_not_ready() {
    let flow = DesignFlow::new(FALLBACK)
        .with_model_service(FakeModeler::replying(vec![]))
        .with_notification_service(FakeMailer::replying(vec![]))
        .with_probe(Arc::new(FakeProbe { reachable: vec![] }));

    assert!(matches!(
        flow.generate_model().await,
        Err(FlowError::NotReady { step: FlowStep::Model, .. })
    ));
    assert!(matches!(
        flow.send_email().await,
        Err(FlowError::NotReady { step: FlowStep::Email, .. })
    ));
    assert!(matches!(
        flow.retry_email().await,
        Err(FlowError::NotReady { step: FlowStep::Email, .. })
    ));
    assert!(matches!(
        flow.view().await,
        Err(FlowError::NotReady { step: FlowStep::View, .. })
    ));
}

#[tokio::test]
async fn test_same_step_is_busy_while_running() {
    let flow = DesignFlow::new(FALLBACK)
        .with_description_service(FakeDescriber::slow("Slow.", Duration::from_millis(50)));
    flow.set_selection(red_minimalist());

    let (first, second) = tokio::join!(flow.describe(), flow.describe());

    assert!(first.is_ok());
    assert!(matches!(second, Err(FlowError::Busy(FlowStep::Describe))));
    assert!(!flow.is_running(FlowStep::Describe));
}

#[tokio::test]
async fn test_different_steps_may_overlap() {
    let mailer = Arc::new(FakeMailer {
        replies: Mutex::new(
            vec![EmailOutcome::Sent {
                message: "Email sent".to_string(),
            }]
            .into(),
        ),
        requests: Mutex::default(),
        delay: Duration::from_millis(50),
    });
    let modeler = FakeModeler::replying(vec![ModelResult::succeeded("https://cdn.example.com/b.glb", "ok")]);
    let flow = DesignFlow::new(FALLBACK)
        .with_model_service(modeler)
        .with_notification_service(mailer.clone());
    flow.adopt_description("A red cover.");
    flow.adopt_model_url("https://cdn.example.com/a.glb");

    let (email, model) = tokio::join!(flow.send_email(), flow.generate_model());

    assert!(matches!(email, Ok(EmailOutcome::Sent { .. })));
    assert!(model.is_ok());
    assert_eq!(mailer.requests()[0].model_url, "https://cdn.example.com/a.glb");
    assert_eq!(flow.model_url().as_deref(), Some("https://cdn.example.com/b.glb"));
}

#[tokio::test]
async fn test_failed_email_is_error_notice() {
    let flow = DesignFlow::new(FALLBACK).with_notification_service(FakeMailer::replying(vec![
        EmailOutcome::Failed {
            message: "The email service reply did not confirm delivery".to_string(),
        },
    ]));
    flow.adopt_model_url("https://cdn.example.com/a.glb");

    let err = flow.send_email().await.unwrap_err();

    assert!(matches!(err, FlowError::Notification(_)));
    let notices = flow.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].step, Some(FlowStep::Email));
    assert!(flow.dismiss(notices[0].id));
    assert!(flow.notices().is_empty());
}

#[tokio::test]
async fn test_view_uses_fallback_and_reaches_viewing() {
    let flow = DesignFlow::new(FALLBACK).with_probe(Arc::new(FakeProbe {
        reachable: vec![FALLBACK.to_string()],
    }));
    flow.adopt_model_url("https://cdn.example.com/broken.glb");

    let outcome = flow.view().await.unwrap();

    assert!(outcome.used_fallback);
    assert_eq!(outcome.url, FALLBACK);
    assert_eq!(flow.stage(), FlowStage::Viewing);
    assert_eq!(flow.progress_index(), 2);
    assert_eq!(flow.notices()[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_view_terminal_error() {
    let flow = DesignFlow::new(FALLBACK).with_probe(Arc::new(FakeProbe { reachable: vec![] }));
    flow.adopt_model_url("https://cdn.example.com/broken.glb");

    let err = flow.view().await.unwrap_err();

    assert!(matches!(err, FlowError::Viewer(_)));
    assert_eq!(flow.stage(), FlowStage::ModelGenerating);
}

#[tokio::test]
async fn test_session_round_trip_between_flows() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = SessionStore::in_dir(temp.path()).unwrap();

    let first = DesignFlow::new(FALLBACK)
        .with_description_service(FakeDescriber::replying(vec![Ok("A red cover.".to_string())]))
        .with_model_service(FakeModeler::replying(vec![ModelResult::succeeded(
            "https://cdn.example.com/a.glb",
            "ok",
        )]))
        .with_session_store(store.clone());
    first.set_selection(red_minimalist());
    first.describe().await.unwrap();
    first.generate_model().await.unwrap();

    let saved = store.load().unwrap();
    assert_eq!(saved.prosthetic_model_description.as_deref(), Some("A red cover."));
    assert_eq!(
        saved.prosthetic_model_url.as_deref(),
        Some("https://cdn.example.com/a.glb")
    );
    assert!(
        saved
            .prosthetic_model_prompt
            .as_deref()
            .is_some_and(|p| p.starts_with("A red cover."))
    );

    let second = DesignFlow::new(FALLBACK).with_session_store(store);
    second.resume_from_session().unwrap();
    assert_eq!(second.stage(), FlowStage::ModelGenerating);
    assert_eq!(second.description().as_deref(), Some("A red cover."));
    assert_eq!(
        second.model_url().as_deref(),
        Some("https://cdn.example.com/a.glb")
    );
}

#[tokio::test]
async fn test_new_description_drops_saved_model() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = SessionStore::in_dir(temp.path()).unwrap();

    let flow = DesignFlow::new(FALLBACK)
        .with_description_service(FakeDescriber::replying(vec![
            Ok("A red cover.".to_string()),
            Ok("A blue cover.".to_string()),
        ]))
        .with_model_service(FakeModeler::replying(vec![ModelResult::succeeded(
            "https://cdn.example.com/a.glb",
            "ok",
        )]))
        .with_session_store(store.clone());
    flow.set_selection(red_minimalist());
    flow.describe().await.unwrap();
    flow.generate_model().await.unwrap();
    flow.describe().await.unwrap();

    let saved = store.load().unwrap();
    assert_eq!(saved.prosthetic_model_description.as_deref(), Some("A blue cover."));
    assert_eq!(saved.prosthetic_model_url, None);
    assert_eq!(saved.prosthetic_model_prompt, None);

    let resumed = DesignFlow::new(FALLBACK).with_session_store(store);
    resumed.resume_from_session().unwrap();
    assert_eq!(resumed.stage(), FlowStage::Describing);
    assert_eq!(resumed.model_url(), None);
}

#[tokio::test]
async fn test_snapshot_reflects_state() {
    let flow = DesignFlow::new(FALLBACK)
        .with_notification_service(FakeMailer::replying(vec![auth_required(
            "https://accounts.google.com/o/oauth2/auth",
        )]));
    flow.adopt_model_url("https://cdn.example.com/a.glb");
    flow.send_email().await.unwrap();

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.stage, FlowStage::ModelGenerating);
    assert!(snapshot.pending_authorization.is_some());
    assert!(snapshot.running.is_empty());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["stage"], "model_generating");
    assert_eq!(json["progress_index"], 2);
}
