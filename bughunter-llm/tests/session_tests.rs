//! Session and workflow tests against a scripted backend stub.
//!
//! Everything here runs without a real inference process: the stub replays a
//! fixed script of responses and records the prompts it was given.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bughunter_llm::{
    HuntSession, LlmError, LlmResult, ModelBackend, Role, VulnerabilityRecord,
};

/// Deterministic stand-in for the inference process
struct ScriptedBackend {
    prompts: Mutex<Vec<String>>,
    script: Mutex<VecDeque<LlmResult<String>>>,
}

impl ScriptedBackend {
    fn replying(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            script: Mutex::new(
                responses
                    .iter()
                    .map(|r| Ok((*r).to_string()))
                    .collect(),
            ),
        })
    }

    fn failing_after(responses: &[&str]) -> Arc<Self> {
        let backend = Self::replying(responses);
        backend.script.lock().unwrap().push_back(Err(LlmError::NonZeroExit {
            code: 1,
            stderr: "model crashed".to_string(),
        }));
        backend
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn invoke(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("scripted reply".to_string()))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

#[tokio::test]
async fn dialogue_invokes_model_exactly_turns_times() {
    for turns in [0usize, 1, 3] {
        let backend = ScriptedBackend::replying(&["a", "b", "c"]);
        let mut session = HuntSession::new(backend.clone());

        let transcript = session.self_dialogue("stack smashing", turns).await.unwrap();

        assert_eq!(backend.calls(), turns);
        assert_eq!(transcript.turns, turns);
        assert_eq!(session.ledger().len(), turns);
        assert!(session
            .ledger()
            .turns()
            .iter()
            .all(|t| t.role == Role::Assistant));
    }
}

#[tokio::test]
async fn dialogue_feeds_accumulated_text_into_next_turn() {
    let backend = ScriptedBackend::replying(&["first insight", "second insight"]);
    let mut session = HuntSession::new(backend.clone());

    let transcript = session.self_dialogue("heap corruption", 2).await.unwrap();

    let prompts = backend.prompts();
    assert!(prompts[0].contains("heap corruption"));
    assert!(prompts[1].contains("first insight"));
    assert!(prompts[1].contains("Please continue the analysis."));
    assert!(transcript.text.contains("second insight"));
}

#[tokio::test]
async fn dialogue_failure_surfaces_partial_transcript() {
    let backend = ScriptedBackend::failing_after(&["only turn that worked"]);
    let mut session = HuntSession::new(backend.clone());

    let err = session.self_dialogue("race conditions", 3).await.unwrap_err();

    assert_eq!(err.completed, 1);
    assert_eq!(err.requested, 3);
    assert!(err.transcript.contains("only turn that worked"));
    assert!(matches!(err.source, LlmError::NonZeroExit { code: 1, .. }));
    // The one successful turn still landed in the ledger
    assert_eq!(session.ledger().len(), 1);
}

#[tokio::test]
async fn analyze_file_records_prompt_then_response() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("vuln.c");
    std::fs::write(&target, "strcpy(dst, src);").unwrap();

    let backend = ScriptedBackend::replying(&["buffer overflow at line 1"]);
    let mut session = HuntSession::new(backend.clone());

    let analysis = session.analyze_file(&target).await.unwrap();

    assert_eq!(analysis, "buffer overflow at line 1");
    assert!(backend.prompts()[0].contains("strcpy(dst, src);"));

    let turns = session.ledger().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::System);
    assert!(turns[0].content.contains("strcpy(dst, src);"));
    assert_eq!(turns[1].role, Role::Assistant);
}

#[tokio::test]
async fn failed_invocation_leaves_ledger_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("vuln.c");
    std::fs::write(&target, "gets(buf);").unwrap();

    let backend = ScriptedBackend::failing_after(&[]);
    let mut session = HuntSession::new(backend);

    let err = session.analyze_file(&target).await.unwrap_err();
    assert!(matches!(err, LlmError::NonZeroExit { .. }));
    assert!(session.ledger().is_empty());
}

#[tokio::test]
async fn describe_tree_prompts_with_nested_mapping() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "x").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("c.txt"), "x").unwrap();

    let backend = ScriptedBackend::replying(&["rendered tree"]);
    let mut session = HuntSession::new(backend.clone());

    let description = session.describe_tree(dir.path()).await.unwrap();

    assert_eq!(description.rendered, "rendered tree");
    assert_eq!(description.tree.file_count(), 2);
    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("\"a.txt\": \"file\""));
    assert!(prompt.contains("\"sub\""));
    assert!(prompt.contains("\"c.txt\": \"file\""));
    assert_eq!(session.ledger().len(), 2);
}

#[tokio::test]
async fn compose_report_passes_markup_through_verbatim() {
    let backend = ScriptedBackend::replying(&["# Report"]);
    let mut session = HuntSession::new(backend.clone());

    let record = VulnerabilityRecord {
        description: "Format string\nwith newline".to_string(),
        location: "src/log.c:87".to_string(),
        writeup: "Uses *user input* as `printf` format".to_string(),
        poc: "./app \"%n%n%n\"".to_string(),
    };
    let report = session.compose_report(&record).await.unwrap();

    assert_eq!(report, "# Report");
    let prompt = &backend.prompts()[0];
    assert!(prompt.contains("Format string\nwith newline"));
    assert!(prompt.contains("`printf`"));
    assert!(prompt.contains("\"%n%n%n\""));

    let turns = session.ledger().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::System);
    assert_eq!(turns[1].role, Role::Assistant);
}

#[tokio::test]
async fn interactive_prompt_records_human_turn() {
    let backend = ScriptedBackend::replying(&["hello back"]);
    let mut session = HuntSession::new(backend);

    let response = session.prompt("what is a use-after-free?").await.unwrap();

    assert_eq!(response, "hello back");
    let turns = session.ledger().turns();
    assert_eq!(turns[0].role, Role::Human);
    assert_eq!(turns[0].content, "what is a use-after-free?");
    assert_eq!(turns[1].role, Role::Assistant);
}

#[tokio::test]
async fn read_chunk_returns_exact_window() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("a.txt");
    std::fs::write(&target, "HELLO WORLD").unwrap();

    let backend = ScriptedBackend::replying(&[]);
    let session = HuntSession::new(backend.clone());

    let chunk = session.read_chunk(&target, 2, 5).await.unwrap();
    assert_eq!(chunk, "LLO");
    // No model involvement for chunk reads
    assert_eq!(backend.calls(), 0);
}
