use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use teeny::{CompileResult, TokenKind};

/// Teeny tiny compiler: translate a teaching-language program to C.
#[derive(Parser, Debug)]
#[command(name = "teeny", version, about)]
struct Cli {
  /// Source file to compile.
  input: PathBuf,

  /// Where to write the generated C.
  #[arg(short, long, default_value = "out.c")]
  output: PathBuf,

  /// How far to take the compilation.
  #[arg(long, value_enum, default_value_t = Phase::Compile)]
  phase: Phase,

  /// Enable debug logging (overridden by RUST_LOG).
  #[arg(short, long)]
  verbose: bool,

  /// Suppress the banner and completion message.
  #[arg(short, long)]
  quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Phase {
  /// Print the token stream and stop.
  Lex,
  /// Compile and write the output file.
  Compile,
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  if !cli.quiet && cli.phase == Phase::Compile {
    println!("Teeny tiny compiler!");
  }

  if let Err(err) = run(&cli) {
    eprintln!("error: {err}");
    process::exit(1);
  }

  if !cli.quiet && cli.phase == Phase::Compile {
    println!("Compiling completed.");
  }
}

fn run(cli: &Cli) -> CompileResult<()> {
  match cli.phase {
    Phase::Lex => {
      let source = teeny::read_source(&cli.input)?;
      for token in teeny::tokenize(&source)? {
        match token.kind {
          TokenKind::Eof | TokenKind::Newline => println!("{}", token.kind),
          _ => println!("{} {}", token.kind, token.text),
        }
      }
      Ok(())
    }
    Phase::Compile => teeny::compile_file(&cli.input, &cli.output),
  }
}

/// Logs go to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
  let filter = if std::env::var("RUST_LOG").is_ok() {
    EnvFilter::from_default_env()
  } else if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::new("warn")
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}
