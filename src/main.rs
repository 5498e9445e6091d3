use clap::{Parser, Subcommand};
use colored::Colorize;
use maungdb::shell::{Outcome, Session};
use maungdb::{Config, Executor, SessionContext, StorageEngine};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "maungdb")]
#[command(about = "MaungDB - a small file-backed database speaking MaungQL", long_about = None)]
struct Args {
    /// Data directory path
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Database to start in
    #[arg(short, long)]
    database: Option<String>,

    /// Session user name
    #[arg(short, long)]
    user: Option<String>,

    /// Session role (supermaung, admin, user)
    #[arg(short, long)]
    role: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,
    /// Run a single query and print its result
    Query {
        /// Query text, e.g. "TINGALI * TI pegawai"
        text: String,
    },
}

/// Tab completion over keyword spellings and shell commands
struct MaungHelper {
    completions: Vec<String>,
}

impl MaungHelper {
    fn new() -> Self {
        let mut completions: Vec<String> = maungql_core::lexer::all_spellings()
            .map(str::to_string)
            .collect();
        completions.extend(
            [
                ".help",
                ".exit",
                ".use",
                ".whoami",
                ".tables",
                ".databases",
                ".createdb",
            ]
            .map(String::from),
        );
        Self { completions }
    }

    fn word_start(line: &str) -> usize {
        line.rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl Completer for MaungHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let start = Self::word_start(&line[..pos]);
        let word = line[start..pos].to_uppercase();

        let matches: Vec<Pair> = self
            .completions
            .iter()
            .filter(|c| !word.is_empty() && c.to_uppercase().starts_with(&word))
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for MaungHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let word = &line[Self::word_start(line)..];
        if word.is_empty() {
            return None;
        }

        self.completions
            .iter()
            .find(|c| c.starts_with(word) && c.len() > word.len())
            .map(|c| c[word.len()..].to_string())
    }
}

impl Highlighter for MaungHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.truecolor(100, 100, 100).to_string())
    }
}

impl Validator for MaungHelper {}

impl Helper for MaungHelper {}

fn print_banner(ctx: &SessionContext) {
    println!(
        "{}",
        r#"
   __  __                         ___  ___
  |  \/  | __ _ _  _ _ _  __ _   |   \| _ )
  | |\/| |/ _` | || | ' \/ _` |  | |) | _ \
  |_|  |_|\__,_|\_,_|_||_\__, |  |___/|___/
                         |___/
"#
        .yellow()
    );
    println!(
        "  {} {}",
        "MaungDB shell".white().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!(
        "  {} {} ({})",
        "User:".dimmed(),
        ctx.username.white(),
        ctx.role
    );
    println!(
        "  Type {} for help, {} to quit\n",
        ".help".yellow(),
        ".exit".yellow()
    );
}

fn run_shell(mut session: Session) -> anyhow::Result<()> {
    print_banner(session.context());

    let mut rl: Editor<MaungHelper, rustyline::history::DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(MaungHelper::new()));

    let history_file = std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".maungdb_history"))
        .unwrap_or_else(|_| PathBuf::from(".maungdb_history"));
    let _ = rl.load_history(&history_file);

    loop {
        let prompt = format!("{}{} ", session.context().database.cyan(), ">".white());

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match session.handle_line(line) {
                    Outcome::Exit => {
                        println!("{}", "Wilujeng!".dimmed());
                        break;
                    }
                    Outcome::Output(text) if !text.is_empty() => println!("{}", text),
                    Outcome::Output(_) => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Type .exit to quit".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Wilujeng!".dimmed());
                break;
            }
            Err(err) => {
                println!("{} {:?}", "Error:".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_file);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cwd = std::env::current_dir()?;
    let mut config = Config::load(&cwd)?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(user) = args.user {
        config.username = user;
    }
    if let Some(role) = args.role {
        config.role = role;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage = StorageEngine::new(&config.data_dir)?;
    storage.initialize(&config.database)?;
    tracing::debug!(data_dir = %config.data_dir.display(), database = %config.database, "Storage ready");

    let ctx = SessionContext::new(&config.username, &config.role, &config.database);
    let session = Session::new(Executor::new(storage), ctx, args.json);

    match args.command.unwrap_or(Commands::Shell) {
        Commands::Shell => run_shell(session)?,
        Commands::Query { text } if text.trim_start().starts_with('.') => {
            let mut session = session;
            if let Outcome::Output(output) = session.handle_line(&text) {
                println!("{}", output);
            }
        }
        Commands::Query { text } => match session.try_query(text.trim()) {
            Ok(output) => println!("{}", output),
            Err(error) => {
                eprintln!("{}", error);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
