//! Nachshon command-line tool
//!
//! Translates `.נח` sources to Python and runs them with the host interpreter.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use nachshon::feedback::{CheckReport, CheckStats};
use nachshon::frontend::dump::dump_program;
use nachshon::runner::{Executor, PythonProcess, Session};
use nachshon::{parse, tokenize, Error, Generator, Program, SOURCE_EXTENSION};

/// Nachshon - a Hebrew programming language built on Python
#[derive(Parser, Debug)]
#[command(name = "nachshon")]
#[command(version)]
#[command(about = "נחשון - שפת תכנות עברית מבוססת פייתון")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate and run a source file
    Run {
        /// Input source file (.נח)
        input: PathBuf,

        /// Print the generated Python before running it
        #[arg(long)]
        show_python: bool,

        /// Python interpreter (default: $NACHSHON_PYTHON or python3)
        #[arg(long, value_name = "BIN")]
        python: Option<String>,
    },
    /// Translate a source file to a Python file
    Build {
        /// Input source file (.נח)
        input: PathBuf,

        /// Output file (default: input with .py extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not bind Hebrew builtin names
        #[arg(long)]
        no_prelude: bool,
    },
    /// Check a source file for errors
    Check {
        /// Input source file (.נח)
        input: PathBuf,

        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },
    /// Print the tokens of a source file
    Tokens {
        input: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Print the syntax tree of a source file
    Ast {
        input: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Run a code snippet and show the value of its last expression
    Eval {
        code: String,

        /// Python interpreter (default: $NACHSHON_PYTHON or python3)
        #[arg(long, value_name = "BIN")]
        python: Option<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run { input, show_python, python } => run_file(input, *show_python, python),
        Commands::Build { input, output, no_prelude } => {
            build_file(input, output.clone(), *no_prelude)
        }
        Commands::Check { input, json } => check_file(input, *json),
        Commands::Tokens { input, json } => show_tokens(input, *json),
        Commands::Ast { input, json } => show_ast(input, *json),
        Commands::Eval { code, python } => eval_code(code, python),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("❌ שגיאה: {:#}", e);
            process::exit(1);
        }
    }
}

/// Read a source file, warning about an unexpected extension
fn read_source(input: &Path) -> Result<String> {
    if input.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
        warn!("{} does not have the .{} extension", input.display(), SOURCE_EXTENSION);
    }
    fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))
}

fn parse_source(source: &str) -> Result<Program, Error> {
    Ok(parse(tokenize(source)?)?)
}

fn interpreter(python: &Option<String>) -> PythonProcess {
    match python {
        Some(bin) => PythonProcess::new(bin.clone()),
        None => PythonProcess::from_env(),
    }
}

/// Translate and run a source file
fn run_file(input: &Path, show_python: bool, python: &Option<String>) -> Result<bool> {
    println!("🚀 מריץ: {}", input.display());

    let source = read_source(input)?;
    let program = parse_source(&source)?;
    let code = Generator::new().generate(&program)?;

    if show_python {
        println!("\n--- קוד פייתון ---");
        print!("{}", code);
        println!("--- סוף קוד ---\n");
    }

    let mut process = interpreter(python).inherit_stdio();
    let outcome = process.execute(&code, &mut Session::new())?;
    if !outcome.success {
        eprintln!("❌ שגיאת הרצה: exit status {:?}", outcome.exit_code);
    }
    Ok(outcome.success)
}

/// Translate a source file to Python and write it next to the input
fn build_file(input: &Path, output: Option<PathBuf>, no_prelude: bool) -> Result<bool> {
    println!("🔨 בונה: {}", input.display());

    let source = read_source(input)?;
    let program = parse_source(&source)?;

    let mut generator = Generator::new().with_source_file(&input.to_string_lossy());
    if no_prelude {
        generator = generator.without_prelude();
    }
    let code = generator.generate(&program)?;

    let out_path = output.unwrap_or_else(|| input.with_extension("py"));
    fs::write(&out_path, &code)
        .with_context(|| format!("cannot write {}", out_path.display()))?;

    println!("✅ נוצר קובץ: {}", out_path.display());
    Ok(true)
}

/// Check a source file for errors without generating code
fn check_file(input: &Path, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let file_name = input.display().to_string();

    let checked = tokenize(&source).map_err(Error::from).and_then(|tokens| {
        let token_count = tokens.len();
        let program = parse(tokens)?;
        Generator::new().generate(&program)?;
        Ok(CheckStats { tokens: token_count, statements: program.body.len() })
    });

    let report = match &checked {
        Ok(stats) => CheckReport::success(file_name.as_str(), *stats),
        Err(e) => CheckReport::failure(file_name.as_str(), e),
    };

    if json {
        println!("{}", report.to_json());
    } else {
        println!("🔍 בודק: {}", input.display());
        match &checked {
            Ok(_) => println!("✅ אין שגיאות תחביר!"),
            Err(e) => eprintln!("❌ שגיאה: {}", e),
        }
    }
    Ok(report.success)
}

fn show_tokens(input: &Path, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let tokens = tokenize(&source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        println!("🔤 טוקנים: {}", input.display());
        for token in &tokens {
            println!("  {}", token);
        }
    }
    Ok(true)
}

fn show_ast(input: &Path, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let program = parse_source(&source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        println!("🌳 עץ תחביר: {}", input.display());
        print!("{}", dump_program(&program));
    }
    Ok(true)
}

/// Run a snippet, echoing the value of a trailing expression
fn eval_code(code: &str, python: &Option<String>) -> Result<bool> {
    let program = parse_source(code)?;
    let generated = Generator::new().with_result_echo().generate(&program)?;

    let mut process = interpreter(python);
    if !process.is_available() {
        bail!("Python interpreter '{}' not found", process.interpreter());
    }
    let outcome = process.execute(&generated, &mut Session::new())?;
    print!("{}", outcome.stdout);
    if !outcome.success {
        eprint!("{}", outcome.stderr);
    }
    Ok(outcome.success)
}
