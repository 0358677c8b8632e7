use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use examkey_pinyin::{
    associations, is_similar_with, matches, normalize_query, romanizer_from_config,
    score_breakdown, Config, LevelConfig, QuestionBank, QuestionType, RedbSettings,
    StrictnessLevel, SuggestionEngine,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "examkey", about = "Pinyin search over exam question banks")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the toneless pinyin of TEXT.
    Romanize { text: Vec<String> },
    /// Check QUERY against the romanization of TEXT.
    Match {
        text: String,
        query: String,
        /// Override the persisted level for this call.
        #[arg(long)]
        level: Option<StrictnessLevel>,
    },
    /// Punctuation-insensitive fuzzy containment of QUERY in CORPUS.
    Similar { query: String, corpus: String },
    /// Search a question bank (JSON array of questions).
    Search {
        #[arg(long)]
        bank: PathBuf,
        query: String,
        #[arg(long)]
        level: Option<StrictnessLevel>,
        #[arg(long = "type", value_enum)]
        question_type: Option<TypeArg>,
        /// Print the score components of each hit.
        #[arg(long)]
        explain: bool,
    },
    /// Show or change the persisted strictness level.
    Level {
        #[command(subcommand)]
        action: LevelAction,
    },
    /// Word suggestions for typed pinyin.
    Suggest {
        pinyin: String,
        /// Also list follow-up words after the top suggestion.
        #[arg(long)]
        follow: bool,
    },
}

#[derive(Subcommand)]
enum LevelAction {
    Show,
    Set { level: StrictnessLevel },
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Single,
    Multiple,
    TrueFalse,
}

impl From<TypeArg> for QuestionType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Single => QuestionType::SingleChoice,
            TypeArg::Multiple => QuestionType::MultipleChoice,
            TypeArg::TrueFalse => QuestionType::TrueFalse,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::load_toml(p).with_context(|| format!("load config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn open_levels(config: &Config) -> anyhow::Result<LevelConfig<RedbSettings>> {
    let store = RedbSettings::open(config.resolved_settings_path())?;
    Ok(LevelConfig::new(store, config.default_level))
}

fn resolve_level(config: &Config, explicit: Option<StrictnessLevel>) -> anyhow::Result<StrictnessLevel> {
    match explicit {
        Some(level) => Ok(level),
        None => Ok(open_levels(config)?.level()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Romanize { text } => {
            let romanizer = romanizer_from_config(&config);
            println!("{}", romanizer.romanize(&text.join(" ")));
        }
        Command::Match { text, query, level } => {
            let level = resolve_level(&config, level)?;
            let romanized = romanizer_from_config(&config).romanize(&text);
            let hit = matches(&romanized, &query, level);
            let b = score_breakdown(&text, &romanized, &query, level);
            println!("{} [{}] {} -> {}", romanized, level, query, if hit { "match" } else { "no match" });
            println!("score {} ({:?})", b.total(), b);
        }
        Command::Similar { query, corpus } => {
            println!("{}", is_similar_with(&config.similarity, &query, &corpus));
        }
        Command::Search {
            bank,
            query,
            level,
            question_type,
            explain,
        } => {
            let level = resolve_level(&config, level)?;
            let romanizer = romanizer_from_config(&config);
            let bank = QuestionBank::load_json(&bank, romanizer)?;
            info!(questions = bank.len(), %level, "searching");
            let hits = bank.ranked_hits(&query, level, question_type.map(QuestionType::from));
            if hits.is_empty() {
                println!("(no questions found)");
            }
            for (rank, hit) in hits.iter().take(config.max_results).enumerate() {
                let q = &bank.questions()[hit.id];
                println!("{}. [{}] {}", rank + 1, q.question_type.label(), q.text);
                println!("   answer: {}", q.answer_description());
                if explain {
                    let folded = normalize_query(&query);
                    let b = score_breakdown(&q.text, &q.pinyin_text, &folded, level);
                    println!("   score {} ({:?})", hit.score, b);
                }
            }
        }
        Command::Level { action } => {
            let levels = open_levels(&config)?;
            match action {
                LevelAction::Show => {
                    let level = levels.level();
                    println!("{} (min {} chars)", level, level.min_length());
                    println!("{}", levels.description());
                    println!("{}", levels.example());
                }
                LevelAction::Set { level } => {
                    levels.set_level(level)?;
                    println!("level set to {} ({})", level, levels.store().path().display());
                }
            }
        }
        Command::Suggest { pinyin, follow } => {
            let engine = SuggestionEngine::new();
            let words = engine.candidates(&pinyin);
            if words.is_empty() {
                println!("(no candidates found)");
            }
            for (i, w) in words.iter().enumerate() {
                println!("{}. {}", i + 1, w);
            }
            if follow {
                if let Some(first) = words.first() {
                    println!("after {}: {}", first, associations(first).join(" "));
                }
            }
        }
    }
    Ok(())
}
