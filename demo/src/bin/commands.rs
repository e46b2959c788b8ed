// A single subcommand with a repeatable flag.

use std::process::ExitCode;

use argtree::{Command, Opt, Parser};
use argtree_demo::{exit_code, init_logging};

fn main() -> ExitCode {
    init_logging();

    let mut parser = Parser::new("commands", "Example application utilizing flag options.");
    let root = parser.root();

    let registered = parser
        .add_command(root, Command::new("run").description("Run a given command"))
        .and_then(|run| {
            parser.add_option(
                run,
                Opt::flag('v', "verbose")
                    .description("Enable verbosity level. Allows multiple occurrences."),
            )
        });
    let verbose = match registered {
        Ok(verbose) => verbose,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = parser.parse_env();
    if result.is_err() {
        return exit_code(&result);
    }

    let report = || -> argtree::Result<()> {
        let verbosity = parser.option(verbose)?;
        eprintln!("Flag present? {}", if verbosity.is_set() { "Yes" } else { "No" });
        eprintln!("Flag count?   {}", verbosity.count());
        Ok(())
    };
    exit_code(&report())
}
