//! Interactive Command Surface
//!
//! Line-delimited stdin consumed as an ordered message queue: one reader task
//! feeds lines into a channel, one consumer processes them in order. A slow
//! model invocation can never interleave with line handling, and input is
//! handled strictly in arrival order.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::error;

use bughunter_llm::HuntSession;

/// Literal token that begins a self-dialogue conversation
const START_TOKEN: &str = "start";
const DEFAULT_TOPIC: &str = "code vulnerabilities in C programs";
const DEFAULT_TURNS: usize = 3;

pub async fn run(session: &mut HuntSession) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<String>(32);

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });

    println!(
        "bughunter interactive session (model: {})",
        session.backend().model_id()
    );
    println!(
        "type `{START_TOKEN}` to begin a self-dialogue, `quit` to exit, \
         or any other line to prompt the model directly"
    );
    prompt_marker();

    while let Some(line) = rx.recv().await {
        let line = line.trim();
        match line {
            "" => {}
            "quit" | "exit" => break,
            START_TOKEN => match session.self_dialogue(DEFAULT_TOPIC, DEFAULT_TURNS).await {
                Ok(transcript) => println!("{}", transcript.text),
                Err(err) => {
                    error!("self-dialogue failed: {err}");
                    // Show what the dialogue produced before it died
                    println!("{}", err.transcript);
                }
            },
            prompt => match session.prompt(prompt).await {
                Ok(response) => println!("{response}"),
                Err(err) => error!("invocation failed: {err}"),
            },
        }
        prompt_marker();
    }

    reader.abort();
    Ok(())
}

fn prompt_marker() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}
