//! End-to-end turn loop over a scripted provider: a tool-calling turn
//! followed by a plain turn, driven the way the console driver drives it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rivet_agent::Agent;
use rivet_core::error::ProviderError;
use rivet_core::message::{Role, SessionId};
use rivet_core::provider::{Provider, ProviderRequest};
use rivet_tools::ToolSet;
use tokio::sync::mpsc;

struct Scripted {
    responses: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
        })
    }
}

#[async_trait]
impl Provider for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<String, ProviderError> {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ProviderError::Network("script exhausted".into()))
    }
}

#[tokio::test]
async fn tool_turn_then_plain_turn_terminates_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/a.py"), "print('a')\n").unwrap();
    std::fs::write(dir.path().join("src/b.py"), "print('b')\n").unwrap();

    let provider = Scripted::new(&[
        r#"Let me check the sources. <ListDir path="src" />"#,
        "The src directory holds a.py and b.py.",
    ]);

    let mut agent = Agent::with_provider(
        provider,
        "test/scripted",
        "scripted",
        SessionId::from("loop-session"),
        "You are a coding agent.",
        ToolSet::standard(dir.path().to_path_buf()),
        &dir.path().join("logs"),
        2048,
    );

    // The driver loop: first round carries the user message, continuations
    // don't; a round with no tool calls ends the turn.
    let (tx, mut rx) = mpsc::channel(64);
    let mut user = Some("what's in src?");
    let mut rounds = 0;
    let mut summaries = Vec::new();

    loop {
        let result = agent.stream(user.take(), tx.clone()).await.unwrap();
        rounds += 1;
        match result {
            Some(r) => summaries.push(r.summary),
            None => break,
        }
        assert!(rounds < 500, "loop failed to terminate");
    }
    drop(tx);

    assert_eq!(rounds, 2);
    assert_eq!(summaries, vec!["📁 LISTED src/ (2 items)"]);

    // Everything the provider streamed came through the chunk channel
    let mut streamed = String::new();
    while let Some(chunk) = rx.recv().await {
        streamed.push_str(&chunk);
    }
    assert!(streamed.contains("<ListDir"));
    assert!(streamed.contains("a.py and b.py"));

    // Transcript: seed, user, assistant, tool results, assistant
    let roles: Vec<Role> = agent.transcript().messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::System,
            Role::Assistant
        ]
    );
    let tool_results = &agent.transcript().messages[3];
    assert!(tool_results.content.starts_with("[Tool Results]\n"));
    assert!(tool_results.content.contains("a.py\nb.py"));

    // And the whole thing round-trips through the JSONL log
    let log = dir.path().join("logs/loop-session.jsonl");
    let lines = std::fs::read_to_string(log).unwrap();
    assert_eq!(lines.lines().count(), 5);
}

#[tokio::test]
async fn single_plain_turn_is_one_round() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Scripted::new(&["hi back"]);

    let mut agent = Agent::with_provider(
        provider,
        "test/scripted",
        "scripted",
        SessionId::new(),
        "seed",
        ToolSet::standard(dir.path().to_path_buf()),
        &dir.path().join("logs"),
        2048,
    );

    let (tx, _rx) = mpsc::channel(64);
    let result = agent.stream(Some("hi"), tx).await.unwrap();
    assert!(result.is_none());
    assert_eq!(agent.transcript().len(), 3);
}
