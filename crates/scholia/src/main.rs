//! Command line front end of scholia.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use scholia::accounts::{Accounts, User};
use scholia::history::History;
use scholia::research::{
    grounding_sources, response_text, EducationLevel, GroundingSource, MaterialType,
    ResearchRequest, TechnicalNorm,
};
use scholia::store::FileStore;
use scholia::{Config, ExportMetadata, Exporter};

/// Composes academic markup into word-processor documents.
#[derive(Debug, Parser)]
#[clap(name = "scholia", version)]
struct Cli {
    /// Path to a `scholia.toml` configuration file
    #[clap(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the store directory
    #[clap(long, global = true, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Logs debug information
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Exports a markup file to a `.docx` document
    Export(ExportArgs),
    /// Prints the markup rendered from model text
    Render(RenderArgs),
    /// Registers a user and signs in
    Signup(CredentialArgs),
    /// Signs a registered user in
    Login(CredentialArgs),
    /// Signs the current user out
    Logout,
    /// Prints the signed-in user
    Whoami,
    /// Stores a model response in the current user's history
    Record(RecordArgs),
    /// Works on the current user's history
    #[clap(subcommand)]
    History(HistoryCommands),
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Markup file produced by the editor
    #[clap(long, short, value_name = "INPUT")]
    input: PathBuf,

    /// Topic, used as title and file name
    #[clap(long)]
    topic: String,

    /// Material type, by label or name
    #[clap(long = "type", default_value = "ResearchPaper")]
    material_type: MaterialType,

    /// Education level, by label or name
    #[clap(long, default_value = "Higher")]
    level: EducationLevel,

    /// JSON array of `{ "title", "uri" }` sources
    #[clap(long, value_name = "SOURCES")]
    sources: Option<PathBuf>,

    /// Output directory
    #[clap(long, short, default_value = ".", value_name = "DIR")]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Text file, or `-` for stdin
    #[clap(long, short, value_name = "INPUT")]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct CredentialArgs {
    /// The username
    username: String,

    /// The password
    #[clap(long, env = "SCHOLIA_PASSWORD")]
    password: String,

    /// The e-mail address, for sign-up
    #[clap(long, default_value = "")]
    email: String,
}

#[derive(Debug, Args)]
struct RecordArgs {
    /// Topic of the request
    #[clap(long)]
    topic: String,

    /// Material type, by label or name
    #[clap(long = "type", default_value = "ResearchPaper")]
    material_type: MaterialType,

    /// Citation norm, guessed from `TZ` when omitted
    #[clap(long)]
    norm: Option<TechnicalNorm>,

    /// Education level, by label or name
    #[clap(long, default_value = "Higher")]
    level: EducationLevel,

    /// A `generateContent` JSON response
    #[clap(long, value_name = "RESPONSE")]
    response: PathBuf,
}

#[derive(Debug, Subcommand)]
enum HistoryCommands {
    /// Lists results, newest first
    List,
    /// Prints the markup of one result
    Show {
        /// Result id
        id: String,
    },
    /// Replaces the markup of one result with the content of a file
    Update {
        /// Result id
        id: String,
        /// Markup file
        #[clap(long, short)]
        input: PathBuf,
    },
    /// Exports one result to a `.docx` document
    Export {
        /// Result id
        id: String,
        /// Output directory
        #[clap(long, short, default_value = ".")]
        out: PathBuf,
    },
    /// Forgets every result
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = env_logger::builder()
        .filter_module(
            "scholia",
            if cli.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .try_init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cli.store_dir.clone() {
        config.store_dir = Some(dir);
    }

    match cli.cmd {
        Commands::Export(args) => export(&config, args),
        Commands::Render(args) => render(args),
        Commands::Signup(args) => {
            let mut store = open_store(&config)?;
            let user = Accounts::new(&mut store).sign_up(&args.username, &args.email, &args.password)?;
            println!("signed up as {} ({})", user.name, user.id);
            Ok(())
        }
        Commands::Login(args) => {
            let mut store = open_store(&config)?;
            let user = Accounts::new(&mut store).log_in(&args.username, &args.password)?;
            println!("logged in as {}", user.name);
            Ok(())
        }
        Commands::Logout => {
            let mut store = open_store(&config)?;
            Accounts::new(&mut store).log_out()?;
            Ok(())
        }
        Commands::Whoami => {
            let mut store = open_store(&config)?;
            match Accounts::new(&mut store).current_user()? {
                Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
                None => println!("not logged in"),
            }
            Ok(())
        }
        Commands::Record(args) => record(&config, args),
        Commands::History(cmd) => history(&config, cmd),
    }
}

fn open_store(config: &Config) -> Result<FileStore> {
    let dir = config.store_dir()?;
    FileStore::open(&dir).with_context(|| format!("cannot open store at {}", dir.display()))
}

fn signed_in(store: &mut FileStore) -> Result<User> {
    match Accounts::new(store).current_user()? {
        Some(user) => Ok(user),
        None => bail!("not logged in, run `scholia login` first"),
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn export(config: &Config, args: ExportArgs) -> Result<()> {
    let markup = read_input(&args.input)?;
    let sources: Vec<GroundingSource> = match &args.sources {
        Some(path) => serde_json::from_str(&read_input(path)?)
            .with_context(|| format!("invalid sources in {}", path.display()))?,
        None => Vec::new(),
    };

    let metadata = ExportMetadata {
        title: args.topic.as_str().into(),
        material_type: args.material_type,
        level: args.level,
        sources,
    };
    let doc = Exporter::new(config.compose_options()).export_markup(&markup, &metadata)?;
    let path = doc.save_in(&args.out)?;
    println!("{}", path.display());
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let markup = scholia::research::render_markup(&text);
    std::io::stdout()
        .write_all(markup.as_bytes())
        .context("failed to write to stdout")?;
    Ok(())
}

fn record(config: &Config, args: RecordArgs) -> Result<()> {
    let mut store = open_store(config)?;
    let user = signed_in(&mut store)?;

    let norm = args
        .norm
        .or_else(|| {
            std::env::var("TZ")
                .ok()
                .and_then(|tz| TechnicalNorm::from_time_zone(&tz))
        })
        .unwrap_or_default();
    let request = ResearchRequest {
        topic: args.topic,
        material_type: args.material_type,
        norm,
        level: args.level,
    };
    request.validate()?;

    let response: serde_json::Value = serde_json::from_str(&read_input(&args.response)?)
        .context("the response is not valid JSON")?;
    let result = History::new(&mut store).record(
        &user,
        request,
        &response_text(&response),
        grounding_sources(&response),
    )?;
    println!("{}", result.id);
    Ok(())
}

fn history(config: &Config, cmd: HistoryCommands) -> Result<()> {
    let mut store = open_store(config)?;
    let user = signed_in(&mut store)?;
    let mut history = History::new(&mut store);

    match cmd {
        HistoryCommands::List => {
            for entry in history.list(&user)? {
                let date = chrono::DateTime::from_timestamp_millis(entry.timestamp)
                    .map(|date| date.format("%d/%m/%Y").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {}  {:<22}  {}",
                    entry.id, date, entry.request.material_type, entry.request.topic
                );
            }
        }
        HistoryCommands::Show { id } => {
            let entry = history
                .get(&user, &id)?
                .with_context(|| format!("no result with id {id}"))?;
            println!("{}", entry.content);
        }
        HistoryCommands::Update { id, input } => {
            let markup = read_input(&input)?;
            if !history.update_content(&user, &id, &markup)? {
                bail!("no result with id {id}");
            }
        }
        HistoryCommands::Export { id, out } => {
            let entry = history
                .get(&user, &id)?
                .with_context(|| format!("no result with id {id}"))?;
            let doc = Exporter::new(config.compose_options()).export(&entry)?;
            println!("{}", doc.save_in(&out)?.display());
        }
        HistoryCommands::Clear => history.clear(&user)?,
    }

    Ok(())
}
