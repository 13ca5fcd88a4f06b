//! blockdsl CLI - run nested command blocks

use std::path::Path;

use blockdsl::cli::{Args, SubCommand};
use blockdsl::script::runner::SCRIPT_EXTENSION;
use blockdsl::{explain_script, format_output, parse_script, Report, ScriptRunner};
use clap::Parser;
use log::{debug, LevelFilter};

fn init_logger(verbose: bool) {
    use env_logger::Builder;
    use std::io::Write;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        if !e.trace().is_empty() {
            debug!("trace:\n{}", e.trace());
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> blockdsl::Result<()> {
    let ctx = args.context();
    debug!("execution context: {:?}", ctx);

    let report = match args.command {
        SubCommand::Run { file, args: script_args } => {
            let runner = ScriptRunner::new(ctx.load_vocabulary()?).with_args(script_args);
            let result = runner.run_file(&file)?;
            debug!("script completed: {} statements", result.statements);
            Report::Value {
                value: result.value,
                statements: result.statements,
            }
        }

        SubCommand::Eval { source } => {
            let runner = ScriptRunner::new(ctx.load_vocabulary()?);
            let result = runner.run_source(&source)?;
            Report::Value {
                value: result.value,
                statements: result.statements,
            }
        }

        SubCommand::Commands { block } => {
            let vocabulary = ctx.load_vocabulary()?;
            let commands = vocabulary.effective_commands_for(&block)?;
            Report::Commands { block, commands }
        }

        SubCommand::Explain { input } => {
            // A path to an existing .blk file, otherwise inline source
            let path = Path::new(&input);
            let (source, content) =
                if path.is_file() && path.extension().is_some_and(|e| e == SCRIPT_EXTENSION) {
                    (path.display().to_string(), std::fs::read_to_string(path)?)
                } else {
                    ("<inline>".to_string(), input.clone())
                };
            let script = parse_script(&content)?;
            Report::Explanation {
                source,
                lines: explain_script(&script),
            }
        }
    };

    println!("{}", format_output(&report, &ctx.output_format));
    Ok(())
}
