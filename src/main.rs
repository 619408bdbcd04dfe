mod client;
mod config;
mod export;
mod lyrics;
mod player;
mod server;
mod theme;
mod transform;
mod upstream;

#[cfg(test)]
mod testing;

use anyhow::Context;
use clap::{Parser, Subcommand};
use client::{ApiClient, ClientError, Session, SessionEvent};
use export::{ExportFormat, ResultFormat};
use lyrics::LyricsPayload;
use std::path::PathBuf;
use theme::ThemeContext;
use tokio::sync::mpsc;
use transform::TransformKind;

#[derive(Debug, Parser)]
#[command(name = "lyrica", version, about = "Lyrics search, sync, translation and export")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the API proxy (default).
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Search and print lyrics.
    Lyrics {
        artist: String,
        song: String,
        /// Show the unsynced view even when timestamps exist.
        #[arg(long)]
        plain: bool,
    },
    /// Search and save lyrics as a file.
    Export {
        artist: String,
        song: String,
        #[arg(short, long, value_enum)]
        format: ExportFormat,
        /// Directory to write into (defaults to the current one).
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Export the unsynced view.
        #[arg(long)]
        plain: bool,
    },
    /// Translate lyrics into another language.
    Translate {
        artist: String,
        song: String,
        #[arg(short, long, default_value = "english")]
        language: String,
        /// Also save the result.
        #[arg(long, value_enum)]
        save: Option<ResultFormat>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Transliterate lyrics into the Latin alphabet.
    Transliterate {
        artist: String,
        song: String,
        /// latin, roman or iso.
        #[arg(short, long, default_value = "latin")]
        system: String,
        #[arg(long, value_enum)]
        save: Option<ResultFormat>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Play a local audio file with synchronized lyrics (needs mpv).
    Play {
        artist: String,
        song: String,
        audio: PathBuf,
    },
    /// Show or toggle the colour theme.
    Theme {
        #[command(subcommand)]
        cmd: Option<ThemeCommand>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeCommand {
    Show,
    Toggle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    let mut theme = ThemeContext::init(cfg.ui.theme);

    let command = cli.command.unwrap_or(Command::Serve {
        bind: None,
        port: None,
    });

    match command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            server::serve(&cfg).await?;
        }
        Command::Lyrics {
            artist,
            song,
            plain,
        } => {
            let mut session = make_session(&cfg)?;
            search(&mut session, &artist, &song).await?;
            session.set_synced(!plain);
            if let Some(payload) = session.display_payload() {
                print_lyrics(&artist, &song, &payload, &session.export_formats());
            }
        }
        Command::Export {
            artist,
            song,
            format,
            out,
            plain,
        } => {
            let mut session = make_session(&cfg)?;
            search(&mut session, &artist, &song).await?;
            session.set_synced(!plain);
            let file = session.export(format)?;
            let path = file.write_to(&out_dir(out)?)?;
            println!("Saved {} ({})", path.display(), file.mime);
        }
        Command::Translate {
            artist,
            song,
            language,
            save,
            out,
        } => {
            run_transform(&cfg, TransformKind::Translation, &artist, &song, &language, save, out)
                .await?;
        }
        Command::Transliterate {
            artist,
            song,
            system,
            save,
            out,
        } => {
            run_transform(&cfg, TransformKind::Transliteration, &artist, &song, &system, save, out)
                .await?;
        }
        Command::Play {
            artist,
            song,
            audio,
        } => {
            let mut session = make_session(&cfg)?;
            let payload = search(&mut session, &artist, &song).await?;
            player::play(&payload, &artist, &song, &audio, &cfg.player, theme.palette()).await?;
        }
        Command::Theme { cmd } => match cmd.unwrap_or(ThemeCommand::Show) {
            ThemeCommand::Show => println!("{}", theme.theme().label()),
            ThemeCommand::Toggle => {
                let now = theme.toggle(&mut cfg);
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Theme set to {}.", now.label());
            }
        },
    }

    Ok(())
}

fn make_session(cfg: &config::Config) -> anyhow::Result<Session> {
    let api = ApiClient::new(&cfg.client.api_base)?;
    Ok(Session::new(
        api,
        cfg.client.soft_timeout(),
        cfg.client.hard_timeout(),
    ))
}

async fn search(session: &mut Session, artist: &str, song: &str) -> anyhow::Result<LyricsPayload> {
    if let Err(ClientError::Api { status, .. }) = session.search(artist, song).await {
        tracing::debug!(status, "proxy answered with an error");
    }
    let view = session.state();
    match (&view.payload, &view.error) {
        (Some(payload), _) => Ok(payload.clone()),
        (None, Some(message)) => anyhow::bail!("{message}"),
        (None, None) => anyhow::bail!("Search for a song first."),
    }
}

fn out_dir(out: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match out {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("current dir"),
    }
}

async fn run_transform(
    cfg: &config::Config,
    kind: TransformKind,
    artist: &str,
    song: &str,
    target: &str,
    save: Option<ResultFormat>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    if kind.find(target).is_none() {
        let codes: Vec<&str> = kind.choices().iter().map(|c| c.code).collect();
        anyhow::bail!("unknown {} '{target}' (choose from: {})", kind.param(), codes.join(", "));
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = make_session(cfg)?.with_events(tx);
    search(&mut session, artist, song).await?;

    // Surface the advisory while the request is still running.
    let notices = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            match ev {
                SessionEvent::StillProcessing(msg) => eprintln!("Still processing: {msg}"),
                SessionEvent::Loading => tracing::debug!("request started"),
                SessionEvent::Failed(msg) => tracing::debug!("request failed: {msg}"),
            }
        }
    });

    eprintln!(
        "{}... (this may take a few minutes)",
        match kind {
            TransformKind::Translation => "Translating",
            TransformKind::Transliteration => "Transliterating",
        }
    );
    let result = session.transform(kind, target).await.map(str::to_string);

    let saved = match (&result, save) {
        (Ok(_), Some(format)) => Some(session.export_transformed(format)?),
        _ => None,
    };
    drop(session);
    let _ = notices.await;

    let text = match result {
        Ok(text) => text,
        Err(e) => anyhow::bail!("{} Failed: {e}", kind.noun()),
    };
    println!("{} to {}\n", kind.past(), kind.target_name(target));
    println!("{text}");

    if let Some(file) = saved {
        let path = file.write_to(&out_dir(out)?)?;
        eprintln!("Saved {}", path.display());
    }
    Ok(())
}

fn print_lyrics(artist: &str, song: &str, payload: &LyricsPayload, formats: &[ExportFormat]) {
    println!("{song}\nby {artist}\n");
    if !payload.has_text() {
        println!("No lyrics available");
        return;
    }
    println!("{}", payload.copy_text());
    let exts: Vec<&str> = formats.iter().map(|f| f.extension()).collect();
    eprintln!("\nExport as: {}", exts.join(", "));
}
