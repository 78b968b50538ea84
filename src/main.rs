use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use crossbeam_channel::Sender;
use owo_colors::OwoColorize;
use readalong::alignment::AlignmentState;
use readalong::cli::{Cli, Commands, ConfigAction};
use readalong::config::Config;
use readalong::defaults;
use readalong::error::ReadAlongError;
use readalong::focus::FocusPhraseBuilder;
use readalong::output::EventRenderer;
use readalong::protocol::{BiasUpdate, TransportEvent};
use readalong::script::{Position, ScriptModel};
use readalong::session::{ChannelListener, ReadingSession, SessionRunner};
use readalong::story::StoryDocument;
use readalong::transport::{JsonLinesSource, pump};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Read {
            story,
            transcript,
            auto_turn,
            covers,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.session.auto_turn_pages |= auto_turn;
            config.session.include_covers |= covers;
            run_read_command(&config, &story, transcript.as_deref(), cli.quiet, cli.verbose)
                .await?;
        }
        Commands::Focus {
            story,
            page,
            sentence,
            word,
            covers,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.session.include_covers |= covers;
            let position = Position::new(page, sentence, word);
            handle_focus_command(&config, &story, position)?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "readalong",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Install env_logger; `RUST_LOG` still wins over the flags.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, _) => log::LevelFilter::Debug,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        if !path.exists() {
            return Err(ReadAlongError::ConfigFileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn load_script(config: &Config, story: &Path) -> Result<Arc<ScriptModel>> {
    let document = StoryDocument::load(story)
        .with_context(|| format!("Failed to load story {}", story.display()))?;
    let script = document.into_script(config.session.include_covers)?;
    Ok(Arc::new(script))
}

/// Replay a transcript through a session running on its own thread.
async fn run_read_command(
    config: &Config,
    story: &Path,
    transcript: Option<&Path>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    let script = load_script(config, story)?;
    log::info!(
        "readalong {}: {} pages, {} words",
        readalong::version_string(),
        script.page_count(),
        script.word_count()
    );
    let renderer = EventRenderer::new(Arc::clone(&script)).with_focus(verbose > 0);

    let (event_tx, event_rx) = crossbeam_channel::bounded(defaults::TRANSPORT_BUFFER);
    let (session_tx, session_rx) = crossbeam_channel::bounded(defaults::EVENT_BUFFER);

    let mut session = ReadingSession::new(Arc::clone(&script), config);
    session.add_listener(Box::new(ChannelListener::new(session_tx)));

    let render_handle = std::thread::spawn(move || {
        for event in session_rx.iter() {
            if !quiet {
                renderer.render(&event);
            }
        }
    });

    let runner = SessionRunner::spawn(session, event_rx);

    let forwarded = match transcript {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open transcript {}", path.display()))?;
            replay(BufReader::new(file), &event_tx).await
        }
        None => replay(BufReader::new(tokio::io::stdin()), &event_tx).await,
    };
    drop(event_tx);

    let session = runner.join()?;
    let position = session.position();
    let state = session.state();
    drop(session);
    if render_handle.join().is_err() {
        log::warn!("Event renderer panicked");
    }

    let forwarded = forwarded?;
    if !quiet {
        print_summary(&script, position, state, forwarded);
    }
    Ok(())
}

async fn replay<R>(reader: R, tx: &Sender<TransportEvent>) -> Result<usize>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut source = JsonLinesSource::new(reader);
    Ok(pump(&mut source, tx).await?)
}

fn print_summary(script: &ScriptModel, position: Position, state: AlignmentState, events: usize) {
    let read = if state == AlignmentState::StoryComplete {
        script.word_count()
    } else {
        script.flat_index(position).unwrap_or(0)
    };
    let status = match state {
        AlignmentState::StoryComplete => "story complete".green().to_string(),
        AlignmentState::PageComplete => "waiting for page turn".yellow().to_string(),
        AlignmentState::SentenceComplete | AlignmentState::Reading => {
            format!("stopped at {}", position).yellow().to_string()
        }
    };
    eprintln!(
        "{} {}/{} words, {} ({} recognizer events)",
        "Read".bold(),
        read,
        script.word_count(),
        status,
        events
    );
}

fn handle_focus_command(config: &Config, story: &Path, position: Position) -> Result<()> {
    let script = load_script(config, story)?;
    if script.word_at(position).is_none() {
        bail!("{} is outside the story", position);
    }

    let mut builder = FocusPhraseBuilder::new(&config.focus);
    let mode = builder.mode();
    let update = BiasUpdate::from_entries(builder.entries(&script, position), mode);
    println!("{}", update.to_json()?);
    Ok(())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            match config.get_value_by_path(&key) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("{} {}", "Error:".red(), e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
