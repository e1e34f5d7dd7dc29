//! CLI binary for edgequake-pdfqa.
//!
//! A thin shim over the library crate: maps CLI flags and the secrets file
//! to `AnalyserConfig`, runs the login gate, then either answers `--ask`
//! questions and exits or drops into an interactive loop.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfqa::config::DEFAULT_PROVIDER;
use edgequake_pdfqa::secrets::api_key_env_var;
use edgequake_pdfqa::{
    export_tables, inspect, AnalyserConfig, AnalysisProgressCallback, AuthState, ChatEntry,
    DocQaError, DocumentAnalyser, DocumentSession, ExtractionMethod, OcrEngineKind,
    ProgressCallback, Secrets,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while extracting or waiting for the model, a bar while OCR runs.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn spinner(&self, prefix: &str, msg: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix(prefix.to_string());
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(80));
        self.replace(Some(bar));
    }

    fn replace(&self, next: Option<ProgressBar>) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(old) = slot.take() {
                old.finish_and_clear();
            }
            *slot = next;
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(ref bar) = *slot {
                f(bar);
            }
        }
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, file_name: &str) {
        self.spinner("Extracting", format!("reading text layer of {file_name}…"));
    }

    fn on_ocr_fallback(&self, file_name: &str, total_pages: usize) {
        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        bar.set_prefix("OCR");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("No text layer in {file_name}; running OCR on {total_pages} pages…"))
        ));
        self.replace(Some(bar));
    }

    fn on_ocr_page(&self, page_num: usize, _total_pages: usize) {
        self.with_bar(|bar| bar.set_position(page_num.saturating_sub(1) as u64));
    }

    fn on_extraction_complete(&self, method: ExtractionMethod, char_count: usize) {
        self.replace(None);
        eprintln!(
            "{} extracted {} via {}",
            green("✔"),
            bold(&format!("{char_count} chars")),
            method
        );
    }

    fn on_question_start(&self, _question: &str) {
        self.spinner("Thinking", "waiting for the model…".to_string());
    }

    fn on_answer_complete(&self, _answer_len: usize, _table_count: usize) {
        self.replace(None);
    }

    fn on_error(&self, _message: &str) {
        self.replace(None);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session
  pdfqa tender.pdf

  # One-shot questions
  pdfqa tender.pdf --ask "What is the bid deadline?" --ask "List the line items"

  # Save tables from the answers as CSV
  pdfqa tender.pdf --ask "Tabulate the payment schedule" --export out/

  # Use OpenAI instead of Gemini
  pdfqa --provider openai --model gpt-4.1-mini report.pdf

  # Inspect PDF metadata (no API key needed)
  pdfqa --inspect-only document.pdf

INTERACTIVE COMMANDS:
  <question>          ask about the loaded document
  :load <path|url>    load another PDF (clears history)
  :preview            first characters of the extracted text
  :history            questions and answers so far
  :clear              forget the history, keep the document
  :export <dir>       write tables of the last answer as CSV
  :logout             log out (clears document and history)
  :help               this list
  :quit               exit

SECRETS FILE (.pdfqa/secrets.toml or .streamlit/secrets.toml):
  api_key = "..."
  [auth]
  username = "..."
  password = "..."

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium
  PDFQA_SECRETS           Path to the secrets file
"#;

/// Ask questions about PDF documents with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about PDF documents with an LLM",
    long_about = "Load a PDF (local file or URL), extract its text (with OCR for scanned \
documents), and ask questions answered by a hosted LLM using the document as context. \
Tabular answers can be exported as CSV.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL to load at start-up.
    input: Option<String>,

    /// Ask this question and exit (repeatable).
    #[arg(short, long = "ask", visible_alias = "question", value_name = "QUESTION")]
    ask: Vec<String>,

    /// Write tables from `--ask` answers as CSV into this directory.
    #[arg(long, env = "PDFQA_EXPORT_DIR")]
    export: Option<PathBuf>,

    /// Secrets file with api_key and [auth] credentials.
    #[arg(long, env = "PDFQA_SECRETS")]
    secrets: Option<PathBuf>,

    /// LLM model ID (default: gemini-2.0-flash).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Login username (prompted for when omitted and login is required).
    #[arg(long, env = "PDFQA_USER")]
    user: Option<String>,

    /// Login password (prompted for when omitted and login is required).
    #[arg(long, env = "PDFQA_LOGIN_PASSWORD", hide_env_values = true)]
    login_password: Option<String>,

    /// Refuse to run without login even if no credentials are configured.
    #[arg(long, env = "PDFQA_REQUIRE_LOGIN")]
    require_login: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFQA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDFQA_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Do not ask the model to format tables as csv blocks.
    #[arg(long, env = "PDFQA_NO_TABLE_HINT")]
    no_table_hint: bool,

    /// Earlier exchanges sent along with each question.
    #[arg(long, env = "PDFQA_HISTORY_TURNS", default_value_t = 0)]
    history_turns: usize,

    /// OCR engine for scanned PDFs.
    #[arg(long, env = "PDFQA_OCR_ENGINE", value_enum, default_value = "tesseract")]
    ocr_engine: OcrEngineArg,

    /// Tesseract language code(s), e.g. eng or eng+deu.
    #[arg(long, env = "PDFQA_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Tesseract binary to run.
    #[arg(long, env = "PDFQA_TESSERACT_CMD")]
    tesseract_cmd: Option<PathBuf>,

    /// Rendering DPI for OCR (72–400).
    #[arg(long, env = "PDFQA_OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    ocr_dpi: u32,

    /// Characters shown by the text preview.
    #[arg(long, env = "PDFQA_PREVIEW_CHARS", default_value_t = 2000)]
    preview_chars: usize,

    /// Max LLM output tokens per answer.
    #[arg(long, env = "PDFQA_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDFQA_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries per question on LLM failure.
    #[arg(long, env = "PDFQA_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Output answers as JSON instead of Markdown.
    #[arg(long, env = "PDFQA_JSON")]
    json: bool,

    /// Disable spinners and progress bars.
    #[arg(long, env = "PDFQA_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except answers and errors.
    #[arg(short, long, env = "PDFQA_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFQA_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// LLM call timeout in seconds.
    #[arg(long, env = "PDFQA_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OcrEngineArg {
    Tesseract,
    Vision,
}

impl From<OcrEngineArg> for OcrEngineKind {
    fn from(v: OcrEngineArg) -> Self {
        match v {
            OcrEngineArg::Tesseract => OcrEngineKind::Tesseract,
            OcrEngineArg::Vision => OcrEngineKind::Vision,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Spinners carry the user-facing feedback; library INFO logs would
    // interleave with them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let secrets = Secrets::discover(cli.secrets.as_deref()).context("Failed to load secrets")?;

    // The provider factory reads keys from the environment; do this before
    // the runtime spawns worker threads.
    export_api_key(&cli, &secrets);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(cli, secrets, show_progress))
}

/// Put the secrets-file API key where the provider factory looks for it,
/// unless the environment already has one.
fn export_api_key(cli: &Cli, secrets: &Secrets) {
    let Some(key) = secrets.api_key() else {
        return;
    };
    let provider = cli
        .provider
        .as_deref()
        .or_else(|| secrets.provider())
        .unwrap_or(DEFAULT_PROVIDER);
    if let Some(var) = api_key_env_var(provider) {
        if std::env::var_os(var).is_none() {
            std::env::set_var(var, key);
        }
    }
}

async fn run(cli: Cli, secrets: Secrets, show_progress: bool) -> Result<()> {
    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let input = cli
            .input
            .as_deref()
            .context("--inspect-only needs a PDF path or URL")?;
        let meta = inspect(input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, &secrets, progress_cb).await?;
    let auth = AuthState::new(secrets.credentials(), cli.require_login);
    let mut analyser = DocumentAnalyser::new(config, auth);

    let interactive = cli.ask.is_empty();
    if !login(&mut analyser, &cli, interactive, LoginSource::FlagsThenPrompt)? {
        return Ok(());
    }

    if let Some(ref input) = cli.input {
        match analyser.load_path(input).await {
            Ok(doc) => print_loaded(doc, cli.quiet),
            Err(e) if interactive && !e.is_configuration_error() => print_error(&e),
            Err(e) => return Err(e).context("Failed to load document"),
        }
    }

    if interactive {
        return repl(&mut analyser, &cli).await;
    }

    // ── One-shot questions ───────────────────────────────────────────────
    if analyser.current_document().is_none() {
        anyhow::bail!("--ask needs a PDF path or URL");
    }
    let stem = analyser
        .current_document()
        .map(|d| d.file_name().to_string())
        .unwrap_or_default();

    for question in &cli.ask {
        analyser
            .ask(question)
            .await
            .with_context(|| format!("Failed to answer '{question}'"))?;
        let n = analyser.history().len();
        let Some(entry) = analyser.history().last() else {
            continue;
        };
        if !cli.json {
            print_entry(entry, n);
        }
        if let Some(ref dir) = cli.export {
            let paths = export_tables(&entry.answer, dir, &stem).context("CSV export failed")?;
            report_export(&paths, cli.quiet);
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(analyser.history()).context("Failed to serialise answers")?
        );
    }
    Ok(())
}

/// Map CLI args and secrets to `AnalyserConfig`.
async fn build_config(
    cli: &Cli,
    secrets: &Secrets,
    progress: Option<ProgressCallback>,
) -> Result<AnalyserConfig> {
    let mut builder = AnalyserConfig::builder()
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .table_hint(!cli.no_table_hint)
        .history_turns(cli.history_turns)
        .preview_chars(cli.preview_chars)
        .ocr_engine(cli.ocr_engine.into())
        .ocr_language(cli.ocr_lang.clone())
        .ocr_dpi(cli.ocr_dpi)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(model) = cli.model.as_deref().or_else(|| secrets.model()) {
        builder = builder.model(model);
    }
    if let Some(provider) = cli.provider.as_deref().or_else(|| secrets.provider()) {
        builder = builder.provider_name(provider);
    }
    if let Some(ref cmd) = cli.tesseract_cmd {
        builder = builder.tesseract_cmd(cmd.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Where login credentials may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginSource {
    /// `--user`/`--login-password` when both are given, else the prompt.
    FlagsThenPrompt,
    /// Always prompt; used after an explicit `:logout`.
    Prompt,
}

fn flag_credentials(cli: &Cli, source: LoginSource) -> Option<(&str, &str)> {
    match source {
        LoginSource::FlagsThenPrompt => cli.user.as_deref().zip(cli.login_password.as_deref()),
        LoginSource::Prompt => None,
    }
}

/// Pass the login gate. Returns `false` when the user gave up (EOF).
fn login(
    analyser: &mut DocumentAnalyser,
    cli: &Cli,
    interactive: bool,
    source: LoginSource,
) -> Result<bool> {
    if analyser.is_authenticated() {
        return Ok(true);
    }

    if let Some((user, pwd)) = flag_credentials(cli, source) {
        analyser.login(user, pwd).context("Login failed")?;
        return Ok(true);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprintln!("{}", bold("Login"));
        let Some(user) = prompt(&mut lines, "Username: ")? else {
            return Ok(false);
        };
        let Some(pwd) = prompt(&mut lines, "Password: ")? else {
            return Ok(false);
        };
        match analyser.login(user.trim(), &pwd) {
            Ok(()) => {
                eprintln!("{} Logged in successfully!", green("✔"));
                return Ok(true);
            }
            Err(e @ DocQaError::AuthNotConfigured) => return Err(e).context("Login failed"),
            Err(e) if !interactive => return Err(e).context("Login failed"),
            Err(e) => print_error(&e),
        }
    }
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, label: &str) -> Result<Option<String>> {
    eprint!("{label}");
    io::stderr().flush().ok();
    match lines.next() {
        Some(line) => Ok(Some(line.context("Failed to read from stdin")?)),
        None => Ok(None),
    }
}

// ── Interactive loop ─────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Ask(String),
    Load(String),
    Preview,
    History,
    Clear,
    Export(PathBuf),
    Logout,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Ask(line.to_string());
    };
    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (rest, ""),
    };
    match (cmd, arg) {
        ("load" | "l", a) if !a.is_empty() => Command::Load(a.to_string()),
        ("preview" | "p", _) => Command::Preview,
        ("history" | "h", _) => Command::History,
        ("clear", _) => Command::Clear,
        ("export" | "e", a) => Command::Export(PathBuf::from(if a.is_empty() { "." } else { a })),
        ("logout", _) => Command::Logout,
        ("help" | "?", _) => Command::Help,
        ("quit" | "q" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

async fn repl(analyser: &mut DocumentAnalyser, cli: &Cli) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "{} Type a question, or {} for commands.",
            cyan("◆"),
            bold(":help")
        );
        if analyser.current_document().is_none() {
            eprintln!("{}", dim("Load a PDF file to get started: :load <path|url>"));
        }
    }

    let stdin = io::stdin();
    loop {
        eprint!("{} ", bold(">"));
        io::stderr().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read from stdin")? == 0 {
            return Ok(());
        }

        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => return Ok(()),
            Command::Help => eprintln!("{AFTER_HELP}"),
            Command::Unknown(cmd) => eprintln!("{} unknown command '{}' (try :help)", red("✘"), cmd),
            Command::Load(source) => match analyser.load_path(&source).await {
                Ok(doc) => print_loaded(doc, cli.quiet),
                Err(e) => halt_on_config_error(e)?,
            },
            Command::Preview => match analyser.preview() {
                Some(p) => {
                    let count = analyser
                        .current_document()
                        .map(|d| d.extraction().char_count())
                        .unwrap_or(0);
                    println!("{p}");
                    eprintln!("{}", dim(&format!("Total characters extracted: {count}")));
                }
                None => print_error(&DocQaError::NoDocumentLoaded),
            },
            Command::History => {
                if analyser.history().is_empty() {
                    eprintln!("{}", dim("No questions yet."));
                }
                for (i, entry) in analyser.history().iter().enumerate() {
                    print_entry(entry, i + 1);
                }
            }
            Command::Clear => {
                analyser.clear_history();
                eprintln!("{} history cleared", green("✔"));
            }
            Command::Export(dir) => export_last(analyser, &dir, cli.quiet),
            Command::Logout => {
                analyser.logout();
                eprintln!("{} Logged out.", green("✔"));
                if !login(analyser, cli, true, LoginSource::Prompt)? {
                    return Ok(());
                }
            }
            Command::Ask(question) => match analyser.ask(&question).await.map(|_| ()) {
                Ok(()) => {
                    let n = analyser.history().len();
                    if let Some(entry) = analyser.history().last() {
                        print_entry(entry, n);
                    }
                }
                Err(e) => halt_on_config_error(e)?,
            },
        }
    }
}

/// Print `e`; stop the loop if it means the setup is broken.
fn halt_on_config_error(e: DocQaError) -> Result<()> {
    if e.is_configuration_error() {
        return Err(e).context("Configuration problem; fix it and restart");
    }
    print_error(&e);
    Ok(())
}

fn export_last(analyser: &DocumentAnalyser, dir: &Path, quiet: bool) {
    let (Some(entry), Some(doc)) = (analyser.history().last(), analyser.current_document()) else {
        eprintln!("{} nothing to export yet", red("✘"));
        return;
    };
    match export_tables(&entry.answer, dir, doc.file_name()) {
        Ok(paths) => report_export(&paths, quiet),
        Err(e) => print_error(&e),
    }
}

// ── Output helpers ───────────────────────────────────────────────────────

fn print_loaded(doc: &DocumentSession, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!(
        "{} {}  {}",
        cyan("◆"),
        bold(doc.file_name()),
        dim(&format!(
            "{} pages · {} · {} chars",
            doc.extraction().page_count,
            doc.method(),
            doc.extraction().char_count()
        ))
    );
}

fn print_entry(entry: &ChatEntry, n: usize) {
    println!("{} {}", bold(&format!("Q{n}:")), entry.question());
    println!();
    print!("{}", entry.answer.to_markdown());
    let tables = entry.answer.tables().count();
    if tables > 0 {
        eprintln!(
            "{}",
            dim(&format!("{tables} table(s) found · :export <dir> saves them as CSV"))
        );
    }
    println!();
}

fn report_export(paths: &[PathBuf], quiet: bool) {
    if quiet {
        return;
    }
    if paths.is_empty() {
        eprintln!("{}", dim("No tables in the answer."));
    }
    for p in paths {
        eprintln!("{} wrote {}", green("✔"), p.display());
    }
}

fn print_error(e: &DocQaError) {
    eprintln!("{} {}", red("✘"), e);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_command("  What is the deadline?  "),
            Command::Ask("What is the deadline?".into())
        );
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command(":load a b.pdf"), Command::Load("a b.pdf".into()));
        assert_eq!(parse_command(":export out"), Command::Export(PathBuf::from("out")));
        assert_eq!(parse_command(":export"), Command::Export(PathBuf::from(".")));
        assert_eq!(parse_command(":quit"), Command::Quit);
        assert_eq!(parse_command(""), Command::Empty);
    }

    #[test]
    fn flag_credentials_are_not_reused_after_logout() {
        let cli = Cli::parse_from(["pdfqa", "--user", "analyst", "--login-password", "pw"]);
        assert_eq!(
            flag_credentials(&cli, LoginSource::FlagsThenPrompt),
            Some(("analyst", "pw"))
        );
        assert_eq!(flag_credentials(&cli, LoginSource::Prompt), None);
    }

    #[test]
    fn load_without_argument_is_unknown() {
        assert!(matches!(parse_command(":load"), Command::Unknown(_)));
    }
}
