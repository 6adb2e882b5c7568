//! UCI engine session wrapper (async I/O).

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::debug;

use crate::error::ReviewError;

/// Per-position search budget.
#[derive(Debug, Clone, Copy)]
pub enum SearchLimit {
    Nodes(u64),
    /// Milliseconds
    MoveTime(u64),
    Depth(u32),
}

impl SearchLimit {
    fn go_command(&self) -> String {
        match self {
            SearchLimit::Nodes(n) => format!("go nodes {n}"),
            SearchLimit::MoveTime(ms) => format!("go movetime {ms}"),
            SearchLimit::Depth(d) => format!("go depth {d}"),
        }
    }
}

/// Result of a single position evaluation, raw from the engine: score is
/// from the side to move, the principal variation may be empty.
#[derive(Debug, Clone)]
pub struct EngineLine {
    pub cp: Option<i32>,
    pub mate: Option<i32>,
    pub pv: Vec<String>,
}

/// Analysis oracle consumed by the review walk. The production
/// implementation is [`UciEngine`]; tests substitute a scripted one.
#[allow(async_fn_in_trait)]
pub trait Evaluator {
    async fn evaluate(
        &mut self,
        fen: &str,
        limit: &SearchLimit,
    ) -> Result<EngineLine, ReviewError>;
}

/// One long-lived engine process. Not safe for concurrent queries; a
/// review owns its session exclusively for its whole duration.
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl UciEngine {
    /// Spawn the engine process and initialize UCI.
    pub async fn spawn(path: &str) -> Result<Self, ReviewError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| {
                ReviewError::EngineUnavailable(format!("failed to spawn {path}: {e}"))
            })?;

        let stdin = process.stdin.take().unwrap();
        let stdout = BufReader::new(process.stdout.take().unwrap());

        let mut engine = Self {
            process,
            stdin,
            stdout,
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        // Configure for analysis
        engine.send("setoption name Threads value 1").await?;
        engine.send("setoption name Hash value 256").await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    async fn send(&mut self, cmd: &str) -> Result<(), ReviewError> {
        debug!(cmd, "engine <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| ReviewError::EngineUnavailable(format!("write failed: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ReviewError::EngineUnavailable(format!("flush failed: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, ReviewError> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| ReviewError::EngineUnavailable(format!("read failed: {e}")))?;
        if n == 0 {
            return Err(ReviewError::EngineUnavailable(
                "engine closed its output".to_string(),
            ));
        }
        Ok(line)
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), ReviewError> {
        loop {
            let line = self.read_line().await?;
            let trimmed = line.trim();
            debug!(line = trimmed, "engine >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    /// Evaluate a position, returning the last full info line's score and
    /// principal variation.
    pub async fn evaluate(
        &mut self,
        fen: &str,
        limit: &SearchLimit,
    ) -> Result<EngineLine, ReviewError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&limit.go_command()).await?;

        let mut result = EngineLine {
            cp: None,
            mate: None,
            pv: Vec::new(),
        };

        loop {
            let line = self.read_line().await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" pv ") {
                let (cp, mate, pv) = parse_info(trimmed);
                if mate.is_some() {
                    result.mate = mate;
                    result.cp = None;
                } else if cp.is_some() {
                    result.cp = cp;
                    result.mate = None;
                }
                if !pv.is_empty() {
                    result.pv = pv;
                }
            } else if trimmed.starts_with("bestmove") {
                // Checkmated/stalemated positions report no pv at all
                if result.pv.is_empty() {
                    if let Some(best) = trimmed.split_whitespace().nth(1) {
                        if best != "(none)" {
                            result.pv = vec![best.to_string()];
                        }
                    }
                }
                break;
            }
        }

        Ok(result)
    }

    /// Send quit and wait for the process to exit.
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill so no engine subprocess leaks
        let _ = self.process.start_kill();
    }
}

impl Evaluator for UciEngine {
    async fn evaluate(
        &mut self,
        fen: &str,
        limit: &SearchLimit,
    ) -> Result<EngineLine, ReviewError> {
        UciEngine::evaluate(self, fen, limit).await
    }
}

/// Parse score and principal variation out of a single `info` line.
fn parse_info(line: &str) -> (Option<i32>, Option<i32>, Vec<String>) {
    let mut cp = None;
    let mut mate = None;
    let mut pv = Vec::new();

    let mut tokens = line.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        match token {
            "cp" => cp = tokens.peek().and_then(|v| v.parse().ok()),
            "mate" => mate = tokens.peek().and_then(|v| v.parse().ok()),
            "pv" => {
                for mv in tokens.by_ref() {
                    // The pv runs to the end of the line except for
                    // trailing annotations
                    if mv == "string" || mv.starts_with("bmc") {
                        break;
                    }
                    pv.push(mv.to_string());
                }
                break;
            }
            _ => {}
        }
    }

    (cp, mate, pv)
}
