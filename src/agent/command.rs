//! Proposer backed by an external command.
//!
//! The command string is split with shell rules, the prompt is written to its
//! stdin, and stdout is parsed as a proposal (fenced JSON is accepted).
use super::{build_prompt, parse_proposal, ChatMessage, FragmentProposer, Proposal};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct CommandProposer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandProposer {
    /// Parse and resolve `command`; fails when the program is not on PATH.
    pub fn new(command: &str) -> Result<Self> {
        let mut words =
            shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;
        if words.is_empty() {
            return Err(anyhow!("LM command is empty"));
        }
        let program_name = words.remove(0);
        let program = which::which(&program_name)
            .with_context(|| format!("resolve LM command program {program_name}"))?;
        Ok(CommandProposer {
            program,
            args: words,
        })
    }

    fn invoke(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn LM command: {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .context("write prompt to LM stdin")?;
        }

        let output = child.wait_with_output().context("wait for LM command")?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::info!(
            program = %self.program.display(),
            elapsed_ms,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm command complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                crate::util::truncate_string(stderr.trim(), 2000)
            ));
        }
        String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")
    }
}

impl FragmentProposer for CommandProposer {
    fn propose_fragment(
        &self,
        user_message: &str,
        history: &[ChatMessage],
        session: &Value,
    ) -> Result<Proposal> {
        let prompt = build_prompt(user_message, history, session);
        let text = self.invoke(&prompt)?;
        Ok(parse_proposal(&text))
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
