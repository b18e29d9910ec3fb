//! CLI argument parsing for the setup page builder.
//!
//! Every command reads and writes plain session files, so each step can be
//! rerun on its own.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "gorb",
    version,
    about = "Classify, validate, and generate setup pages from session files",
    after_help = "Commands:\n  classify --answers <file> --out <session>   Classify answers into a session file\n  validate <session>                          Check structure and canonical rules\n  build <session>... --out <dir>              Generate linked pages\n  merge <session> --fragment <file>           Apply a session fragment and re-validate\n  chat <session> --message <text>             Ask the agent for a session fragment\n  info                                        List setup types\n\nExamples:\n  gorb classify --answers answers.json --out sessions/suite.json\n  gorb validate sessions/suite.json --report suite.report.json\n  gorb build sessions/*.json --out site --templates templates\n  gorb build sessions/draft.json --out preview --preview",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Config file (JSON); defaults to $GORB_CONFIG or the user config dir
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Emit debug logs to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Classify(ClassifyArgs),
    Validate(ValidateArgs),
    Build(BuildArgs),
    Merge(MergeArgs),
    Chat(ChatArgs),
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Classify questionnaire answers into a session file")]
pub struct ClassifyArgs {
    /// Answers file: {"metadata": {...}, "answers": [{"question": ..., "value": ...}]}
    #[arg(long, value_name = "PATH")]
    pub answers: PathBuf,

    /// Output session file
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Overwrite an existing session file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Validate a session file")]
pub struct ValidateArgs {
    /// Session file to check
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Emit the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Also write the report to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Generate linked pages for one or more sessions")]
pub struct BuildArgs {
    /// Session files, processed in order
    #[arg(value_name = "SESSION", required = true)]
    pub sessions: Vec<PathBuf>,

    /// Output directory
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Template directory (<id>.html); pages are emitted as JSON models when omitted
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Content root with <kind>/<slug>/content.md front matter
    #[arg(long, value_name = "DIR")]
    pub content: Option<PathBuf>,

    /// Generate even when validation reports errors
    #[arg(long)]
    pub preview: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Merge a session fragment into a session file")]
pub struct MergeArgs {
    /// Session file to update
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// JSON object whose top-level keys replace the session's
    #[arg(long, value_name = "PATH")]
    pub fragment: PathBuf,

    /// Write the merged session here instead of in place
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Send one message to the configuration agent")]
pub struct ChatArgs {
    /// Session file to update with the agent's proposal
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// User message for this turn
    #[arg(long, value_name = "TEXT")]
    pub message: String,

    /// Conversation history file (JSON array), appended after the turn
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// LM command (overrides config lm_command and GORB_LM_COMMAND)
    #[arg(long, value_name = "COMMAND")]
    pub lm: Option<String>,

    /// Print the proposal without touching the session file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List setup types or print a config stub")]
pub struct InfoArgs {
    /// Print a config file with every default filled in
    #[arg(long)]
    pub config_stub: bool,
}
