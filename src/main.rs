#![allow(clippy::print_stderr)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{ArgAction, CommandFactory, Parser, ValueHint, value_parser};
use clap_complete::aot::{Shell, generate};
use snoop::{
    MtimeOperator, Snoop, SnoopError,
    filters::{MtimeOperatorParser, TimestampParser},
    util::PrinterBuilder,
};
use std::{ffi::OsString, io::stdout, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[cfg(all(
    feature = "mimalloc",
    any(target_os = "linux", target_os = "macos", target_os = "android")
))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const START_PREFIX: &str = ".";
const LOG_ENV: &str = "SNOOP_LOG";

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
///generate our arguments and parse them.
pub struct Args {
    #[arg(
        value_name = "PATH",
        help = format!("Directory to search (defaults to {START_PREFIX})"),
        value_hint = ValueHint::DirPath,
        required = false,
        index = 1
    )]
    directory: Option<OsString>,

    #[arg(
        short = 'e',
        long = "extension",
        action = ArgAction::Append,
        help = "Only keep files whose name ends with EXT (can use multiple times), eg -e js -e php"
    )]
    extension: Vec<String>,

    #[arg(short = 'r', long = "recursive", help = "Descend into subdirectories")]
    recursive: bool,

    #[arg(
        short = 's',
        long = "case-sensitive",
        help = "Match extensions, filters and regexes case-sensitively"
    )]
    case_sensitive: bool,

    #[arg(
        short = 'f',
        long = "filter",
        action = ArgAction::Append,
        help = "Only keep files whose full path contains TEXT (can use multiple times)"
    )]
    filter: Vec<String>,

    #[arg(
        short = 'x',
        long = "regex",
        action = ArgAction::Append,
        help = "Only keep files whose full path matches REGEX (can use multiple times)"
    )]
    regex: Vec<String>,

    #[arg(
        long = "mtime",
        value_parser = TimestampParser,
        help = "Reference time for the mtime filter: now, epoch seconds, YYYY-MM-DD[ HH:MM:SS] or RFC 3339"
    )]
    mtime: Option<i64>,

    #[arg(
        long = "mtime-op",
        value_parser = MtimeOperatorParser,
        help = "Compare as `reference OP mtime`, one of <, <=, >, >= (defaults to <=)"
    )]
    mtime_op: Option<MtimeOperator>,

    #[arg(
        short = 'b',
        long = "cut-base",
        help = "Print paths relative to PATH"
    )]
    cut_base: bool,

    #[arg(
        short = 'S',
        long = "cut-slash",
        requires = "cut_base",
        help = "Also drop the leading slash left by --cut-base"
    )]
    cut_slash: bool,

    #[arg(
        short = 'H',
        long = "hide-hidden",
        help = "Skip hidden files and directories eg .gitignore or .git"
    )]
    hide_hidden: bool,

    #[arg(
        long = "collect-errors",
        help = "Skip unreadable subdirectories and symlink loops instead of failing"
    )]
    collect_errors: bool,

    #[arg(
        long = "print-errors",
        requires = "collect_errors",
        help = "Print skipped directories and symlinks to stderr"
    )]
    print_errors: bool,

    #[arg(
        short = 'n',
        long = "max-results",
        help = "Print only the first N results"
    )]
    top_n: Option<usize>,

    #[arg(
        short = '0',
        long = "print0",
        help = "Terminate results with NUL instead of newline (for xargs -0)"
    )]
    null_terminated: bool,

    #[arg(long = "nocolour", alias = "nocolor", help = "Disable colouring")]
    nocolour: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = format!("Increase log verbosity (overridden by {LOG_ENV})")
    )]
    verbose: u8,

    #[arg(
        long = "generate",
        action = ArgAction::Set,
        value_parser = value_parser!(Shell),
        help = "Generate shell completions"
    )]
    generate: Option<Shell>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_snoop(args: &Args) -> Snoop {
    let root = args
        .directory
        .clone()
        .map_or_else(|| PathBuf::from(START_PREFIX), PathBuf::from);

    let mut snoop = Snoop::new(root);

    if args.recursive {
        snoop.recursive();
    }
    if args.case_sensitive {
        snoop.case_sensitive();
    }
    if args.cut_base {
        snoop.cut_base_path();
    }
    if args.cut_slash {
        snoop.cut_slash();
    }
    if args.hide_hidden {
        snoop.hide_hidden();
    }
    if args.collect_errors {
        snoop.collect_errors();
    }

    for ext in &args.extension {
        snoop.add_extension(ext);
    }
    for filter in &args.filter {
        snoop.add_filter(filter);
    }
    for regex in &args.regex {
        snoop.add_regex(regex);
    }

    if let Some(timestamp) = args.mtime {
        snoop.set_mtime(timestamp);
    }
    if let Some(operator) = args.mtime_op {
        snoop.mtime_operator(operator);
    }

    snoop
}

fn main() -> Result<(), SnoopError> {
    let args = Args::parse();

    if let Some(generator) = args.generate {
        let mut cmd = Args::command();
        let cmd_clone = cmd.clone();
        generate(
            generator,
            &mut cmd,
            cmd_clone.get_name().to_owned(),
            &mut stdout(),
        );
        return Ok(());
    }

    init_logging(args.verbose);

    let mut snoop = build_snoop(&args);
    if let Err(error) = snoop.scan() {
        eprintln!("{error}");
        std::process::exit(1);
    }

    let errors = if args.print_errors {
        snoop.errors()
    } else {
        &[]
    };

    PrinterBuilder::new(snoop.iter().map(PathBuf::as_path))
        .limit(args.top_n)
        .nocolour(args.nocolour)
        .null_terminated(args.null_terminated)
        .errors(errors)
        .print()?;

    Ok(())
}
