// Integration tests for the debate arena.
//
// These drive the library crate's public API end to end: config -> provider
// -> app loop -> UiUpdate -> ViewState -> rendered frame, with either a stub
// provider or a local HTTP server standing in for the model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use debate_arena::app::{self, AppState, DebateEngine};
use debate_arena::protocol::*;
use debate_arena::tui::{apply_ui_update, render_frame, ViewState};
use debate_core::config::*;
use debate_core::debate::{DebateOrchestrator, Evaluator};
use debate_core::{GenerationParams, LoadError, ModelProvider, ProviderError};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

fn test_config(backend: Backend, endpoint: Option<String>) -> Config {
    Config {
        debate: DebateSection {
            default_claim: "Vaccines cause autism".into(),
        },
        model: ModelConfig {
            backend,
            name: "test-model".into(),
            endpoint,
        },
        generation: GenerationParams::default(),
        prompts: PromptConfig::default(),
        evaluation: EvaluationConfig::default(),
        repetition_guard: RepetitionGuardConfig::default(),
        credentials: CredentialsConfig::default(),
    }
}

/// Echoes the prompt and appends a per-call continuation, like a causal LM.
struct ScriptedProvider {
    continuations: Vec<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.continuations.get(idx) {
            Some(text) => Ok(format!("{prompt} {text}")),
            None => Err(ProviderError::EmptyResponse),
        }
    }
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

fn spawn_app(engine: DebateEngine) -> Harness {
    let (debate_tx, debate_rx) = mpsc::channel(16);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ui_tx, ui_rx) = mpsc::channel(64);
    let state = AppState::new(engine, Evaluator::default(), debate_tx);
    let handle = tokio::spawn(app::run(debate_rx, cmd_rx, ui_tx, state));
    Harness {
        cmd_tx,
        ui_rx,
        handle,
    }
}

/// Receive updates, applying each to `view`, until `done` matches one.
async fn pump_until(
    ui_rx: &mut mpsc::Receiver<UiUpdate>,
    view: &mut ViewState,
    done: impl Fn(&UiUpdate) -> bool,
) {
    loop {
        let update = ui_rx.recv().await.expect("app loop closed early");
        let finished = done(&update);
        apply_ui_update(view, update);
        if finished {
            return;
        }
    }
}

fn screen_text(view: &ViewState) -> String {
    let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
    terminal.draw(|frame| render_frame(frame, view)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}

// ===========================================================================
// Tests: stub provider
// ===========================================================================

#[tokio::test]
async fn full_debate_reaches_the_screen() {
    let provider = Arc::new(ScriptedProvider {
        continuations: vec![
            "No controlled trial shows this.",
            "A 2019 study of 650,000 children found no link.",
        ],
        calls: AtomicUsize::new(0),
    });
    let shared: Arc<dyn ModelProvider> = provider.clone();
    let config = test_config(Backend::Anthropic, None);
    let engine = DebateEngine::from_provider(Ok(shared), &config);
    let mut h = spawn_app(engine);
    let mut view = ViewState::new(&config.debate.default_claim);

    pump_until(&mut h.ui_rx, &mut view, |u| matches!(u, UiUpdate::ProviderStatus(_))).await;
    assert_eq!(view.provider_status, Some(ProviderStatus::Ready("scripted".into())));

    h.cmd_tx
        .send(UserCommand::StartDebate {
            claim: view.claim_input.clone(),
        })
        .await
        .unwrap();
    pump_until(&mut h.ui_rx, &mut view, |u| matches!(u, UiUpdate::DebateComplete(_))).await;

    assert_eq!(view.debate_status, DebateStatus::Complete);
    let report = view.report.as_ref().unwrap();
    assert_eq!(report.result.claim, "Vaccines cause autism");
    assert_eq!(report.result.skeptic_text, "No controlled trial shows this.");
    assert_eq!(
        report.result.advocate_text,
        "A 2019 study of 650,000 children found no link."
    );
    assert!(report.metrics.evidence_found);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

    let screen = screen_text(&view);
    assert!(screen.contains("No controlled trial shows this."));
    assert!(screen.contains("Evidence found: Yes"));

    h.cmd_tx.send(UserCommand::Quit).await.unwrap();
    assert!(h.handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn failed_turn_is_reported_without_partial_result() {
    // Only the skeptic call succeeds.
    let provider = Arc::new(ScriptedProvider {
        continuations: vec!["It is unproven."],
        calls: AtomicUsize::new(0),
    });
    let engine = DebateEngine::Active(Arc::new(DebateOrchestrator::new(
        provider,
        PromptConfig::default(),
        GenerationParams::default(),
        None,
    )));
    let mut h = spawn_app(engine);
    let mut view = ViewState::new("claim");

    h.cmd_tx
        .send(UserCommand::StartDebate {
            claim: "claim".into(),
        })
        .await
        .unwrap();
    pump_until(&mut h.ui_rx, &mut view, |u| matches!(u, UiUpdate::DebateFailed { .. })).await;

    assert_eq!(view.debate_status, DebateStatus::Error);
    assert!(view.report.is_none());
    let message = view.error_message.clone().unwrap();
    assert!(message.contains("advocate"), "error should name the turn: {message}");
    assert!(!screen_text(&view).contains("It is unproven."));

    h.cmd_tx.send(UserCommand::Quit).await.unwrap();
    let _ = h.handle.await;
}

#[tokio::test]
async fn load_failure_refuses_debates() {
    let config = test_config(Backend::Anthropic, None);
    let engine = DebateEngine::from_provider(
        Err(LoadError::MissingApiKey {
            backend: "anthropic".into(),
        }),
        &config,
    );
    let mut h = spawn_app(engine);
    let mut view = ViewState::new("claim");

    h.cmd_tx
        .send(UserCommand::StartDebate {
            claim: "claim".into(),
        })
        .await
        .unwrap();
    pump_until(&mut h.ui_rx, &mut view, |u| matches!(u, UiUpdate::DebateFailed { .. })).await;

    assert!(matches!(view.provider_status, Some(ProviderStatus::Unavailable(_))));
    assert!(view
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Model not loaded: no API key configured"));

    drop(h.cmd_tx);
    assert!(h.handle.await.unwrap().is_ok());
}

// ===========================================================================
// Tests: real provider against a local text-generation server
// ===========================================================================

/// Answer one request per continuation, in order, echoing the prompt back the
/// way `return_full_text` does.
async fn spawn_text_generation_server(continuations: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for continuation in continuations {
            let (mut socket, _) = listener.accept().await.unwrap();
            let body = read_request_body(&mut socket).await;
            let request: serde_json::Value = serde_json::from_str(&body).unwrap();
            let prompt = request["inputs"].as_str().unwrap();
            let reply = serde_json::json!([{ "generated_text": format!("{prompt} {continuation}") }])
                .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
        }
    });

    format!("http://{addr}/generate")
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).into_owned();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + content_length {
                return String::from_utf8_lossy(&data[end + 4..]).into_owned();
            }
        }
    }
    String::new()
}

#[tokio::test]
async fn text_generation_backend_end_to_end() {
    let endpoint = spawn_text_generation_server(vec![
        "Correlation is not causation.",
        "Large research cohorts found no link.",
    ])
    .await;
    let config = test_config(Backend::TextGeneration, Some(endpoint));

    let engine = DebateEngine::from_provider(debate_llm::build_provider(&config), &config);
    let mut h = spawn_app(engine);
    let mut view = ViewState::new(&config.debate.default_claim);

    h.cmd_tx
        .send(UserCommand::StartDebate {
            claim: view.claim_input.clone(),
        })
        .await
        .unwrap();
    pump_until(&mut h.ui_rx, &mut view, |u| {
        matches!(u, UiUpdate::DebateComplete(_) | UiUpdate::DebateFailed { .. })
    })
    .await;

    assert_eq!(
        view.provider_status,
        Some(ProviderStatus::Ready("text-generation/test-model".into()))
    );
    let report = view.report.as_ref().expect("debate should complete");
    assert_eq!(report.result.skeptic_text, "Correlation is not causation.");
    assert_eq!(report.result.advocate_text, "Large research cohorts found no link.");
    assert!(report.metrics.evidence_found);
    assert!((report.metrics.length_score - 0.06).abs() < 1e-9);

    h.cmd_tx.send(UserCommand::Quit).await.unwrap();
    let _ = h.handle.await;
}
