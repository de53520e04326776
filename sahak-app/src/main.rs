use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sahak_classify::{PageId, Pipeline};
use sahak_common::observability::{LogConfig, init_logging};
use sahak_config::{SahakConfig, SahakConfigLoader};
use std::path::PathBuf;
use tether::Tether;
use tokio::io::{AsyncBufReadExt, BufReader};

mod render;
mod tether;

#[derive(Parser)]
#[command(name = "sahak")]
#[command(version, about = "역사 인물 성향 분류기")]
struct Cli {
    /// YAML config file (default: ./sahak.yaml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the classification pages
    Pages,

    /// Classify one person and optionally check a guess
    Classify {
        #[arg(short, long)]
        page: PageId,

        #[arg(short, long)]
        name: String,

        /// One of the page's categories
        #[arg(short, long)]
        guess: Option<String>,

        /// Print the source text the analysis was grounded on
        #[arg(long)]
        show_snippet: bool,
    },

    /// Summarise a world-history figure from Wikipedia
    Profile {
        #[arg(short, long)]
        name: String,
    },

    /// Read `name[,guess]` lines from stdin for one page
    Repl {
        #[arg(short, long)]
        page: PageId,

        #[arg(long)]
        show_snippet: bool,
    },

    /// Print the effective configuration with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_ref())?;
    let log_path = init_logging(LogConfig {
        app_name: "sahak",
        log_dir: cfg.log.dir.clone(),
        emit_stderr: cli.verbose || cfg.log.stderr,
        format: cfg.log.format,
        default_filter: cfg.log.level.clone(),
    })?;
    tracing::debug!(log = %log_path.display(), "sahak.start");

    match cli.command {
        Commands::Pages => print!("{}", render::pages()),
        Commands::Config => print!("{}", cfg.to_redacted_yaml()?),
        Commands::Classify {
            page,
            name,
            guess,
            show_snippet,
        } => {
            let pipeline = Tether::from_config(&cfg)?.pipeline(page)?;
            let assessment = pipeline.run(&name, guess.as_deref()).await?;
            print!("{}", render::assessment(&assessment, show_snippet));
        }
        Commands::Profile { name } => {
            let profiler = Tether::from_config(&cfg)?.profiler()?;
            let profile = profiler.run(&name).await?;
            print!("{}", render::profile(&profile));
        }
        Commands::Repl { page, show_snippet } => {
            let pipeline = Tether::from_config(&cfg)?.pipeline(page)?;
            repl(&pipeline, show_snippet).await?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<SahakConfig> {
    let loader = match path {
        Some(p) => SahakConfigLoader::new().with_file(p),
        None => SahakConfigLoader::new().with_default_files(),
    };
    loader.load().context("loading configuration")
}

async fn repl(pipeline: &Pipeline, show_snippet: bool) -> Result<()> {
    let page = pipeline.page();
    println!("{} ({})", page.title(), pipeline.vocabulary().categories().join(", "));
    println!("이름[,예상 분류]를 입력하세요. 빈 줄이나 EOF로 종료합니다.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some((name, guess)) = parse_line(&line) else {
            break;
        };
        match pipeline.run(name, guess).await {
            Ok(assessment) => println!("{}", render::assessment(&assessment, show_snippet)),
            Err(e) => eprintln!("⚠️ {e}"),
        }
    }

    if let (Some(snippets), replies) = pipeline.cache_stats() {
        tracing::info!(
            page = %page,
            snippet_hits = snippets.hits,
            snippet_misses = snippets.misses,
            reply_hits = replies.map(|r| r.hits),
            "repl.finished"
        );
    }
    Ok(())
}

/// `name[,guess]`; a blank line ends the session.
fn parse_line(line: &str) -> Option<(&str, Option<&str>)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(',') {
        Some((name, guess)) => {
            let guess = guess.trim();
            (name.trim(), (!guess.is_empty()).then_some(guess))
        }
        None => (line, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repl_lines() {
        assert_eq!(parse_line("  최익현 "), Some(("최익현", None)));
        assert_eq!(
            parse_line("최익현, 위정척사파"),
            Some(("최익현", Some("위정척사파")))
        );
        assert_eq!(parse_line("김옥균,"), Some(("김옥균", None)));
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn cli_parses_classify() {
        let cli = Cli::try_parse_from([
            "sahak", "-v", "classify", "--page", "byeongja", "--name", "김상헌", "--guess", "주전론",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Classify { page, name, guess, .. } => {
                assert_eq!(page, PageId::Byeongja);
                assert_eq!(name, "김상헌");
                assert_eq!(guess.as_deref(), Some("주전론"));
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn unknown_page_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["sahak", "repl", "--page", "joseon"]).is_err());
    }
}
