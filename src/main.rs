use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use chapter_quiz::data::read_bank;
use chapter_quiz::quiz::ChapterKey;
use chapter_quiz::{
    AnsweredPolicy, BankReport, Quiz, QuizController, QuizError, ScoringMode, Settings,
    load_bank_from_json,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file to load the questions from
    #[arg(short, long)]
    questions: PathBuf,

    /// How answers are given and scored
    #[arg(long, value_enum, default_value_t = ScoringMode::Selection)]
    scoring: ScoringMode,

    /// Keep the bank order of questions
    #[arg(long)]
    no_shuffle_questions: bool,

    /// Keep the declared order of options
    #[arg(long)]
    no_shuffle_options: bool,

    /// Show verdicts while answering
    #[arg(long)]
    practice: bool,

    /// What counts as an answered question
    #[arg(long, value_enum, default_value_t = AnsweredPolicy::Touched)]
    answered: AnsweredPolicy,

    /// Seed for reproducible shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Chapters to preselect, e.g. 1,3
    #[arg(long, value_delimiter = ',')]
    chapters: Vec<u32>,

    /// Validate the bank and print a summary instead of starting the quiz
    #[arg(long)]
    check: bool,

    /// Print the check summary as JSON
    #[arg(long, requires = "check")]
    json: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            scoring: self.scoring,
            shuffle_questions: !self.no_shuffle_questions,
            shuffle_options: !self.no_shuffle_options,
            practice: self.practice,
            answered: self.answered,
            seed: self.seed,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Error opening log file: {}", e);
        return ExitCode::FAILURE;
    }

    let result = if args.check {
        check(&args)
    } else {
        run(&args).map(|()| ExitCode::SUCCESS)
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// The quiz owns the terminal, so interactive runs only log to a file.
fn init_logging(args: &Args) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chapter_quiz=info"));

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if args.check {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), QuizError> {
    let bank = load_bank_from_json(&args.questions)?;
    let mut controller = QuizController::new(bank, args.settings());

    if !args.chapters.is_empty() {
        let (known, unknown): (Vec<ChapterKey>, Vec<ChapterKey>) = args
            .chapters
            .iter()
            .copied()
            .map(ChapterKey)
            .partition(|key| controller.chapters().contains(key));
        if !unknown.is_empty() {
            let names: Vec<String> = unknown.iter().map(ToString::to_string).collect();
            tracing::warn!("not in the bank: {}", names.join(", "));
        }
        controller.select_chapters(known)?;
    }

    Quiz::new(controller).run()
}

fn check(args: &Args) -> Result<ExitCode, QuizError> {
    let bank = read_bank(&args.questions)?;
    let report = BankReport::of(&bank);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => return Err(QuizError::Io(e.into())),
        }
    } else {
        print_report(&args.questions, &report);
    }

    Ok(if report.questions == 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(path: &Path, report: &BankReport) {
    println!("{}: {} questions", path.display(), report.questions);
    for summary in &report.chapters {
        println!("  {}: {}", summary.chapter, summary.questions);
    }
    if report.unchaptered > 0 {
        println!("  without chapter: {}", report.unchaptered);
    }

    if report.is_clean() {
        println!("No rejected records");
    } else {
        println!("{} rejected:", report.rejected.len());
        for diagnostic in &report.rejected {
            println!("  {}", diagnostic);
        }
    }
}
