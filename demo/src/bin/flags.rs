// Options, a nested command and a greedy positional list.

use std::process::ExitCode;

use argtree::{Command, Opt, Parser, Positional};
use argtree_demo::{exit_code, init_logging};

fn main() -> ExitCode {
    init_logging();

    let mut parser = Parser::builder("flags")
        .description("Short description of the application and its use-case.")
        .footer("Set RUST_LOG=debug to trace the parse.")
        .build();
    let root = parser.root();

    let built = (|| -> argtree::Result<_> {
        let verbose = parser.add_option(
            root,
            Opt::flag('v', "verbose").description("Verbosity flag enabling more logging."),
        )?;
        let test =
            parser.add_option(root, Opt::flag('t', "test").description("Set testing flag."))?;
        let output = parser.add_option(
            root,
            Opt::single('o', "output")
                .placeholder("PATH")
                .description("Optional output file path."),
        )?;
        let files = parser.add_option(
            root,
            Opt::list('l', "list").placeholder("FILE").description("List of optional files."),
        )?;

        let run =
            parser.add_command(root, Command::new("run").description("The run subcommand."))?;
        let flag =
            parser.add_option(run, Opt::flag('f', "flag").description("Activate some flag."))?;

        let show =
            parser.add_command(run, Command::new("show").description("The show subcommand."))?;
        parser.add_option(show, Opt::flag('w', "what").description("What to show?"))?;
        let vars = parser
            .add_positional(show, Positional::list("VARS").description("Some variables."))?;

        Ok((verbose, test, output, files, run, flag, vars))
    })();
    let (verbose, test, output, files, run, flag, vars) = match built {
        Ok(handles) => handles,
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
        println!("verbose - Count: {}", parser.flag_count(verbose)?);
        println!("test - Count: {}", parser.flag_count(test)?);
        if let Some(path) = parser.value(output)? {
            println!("output - Value: {}", path);
        }
        for (i, file) in parser.values(files)?.iter().enumerate() {
            println!("list - Item {}: {}", i, file);
        }

        if parser.is_reached(run)? {
            println!("flag - Count: {}", parser.flag_count(flag)?);
            for (i, var) in parser.positional(vars)?.values().iter().enumerate() {
                println!("VARS - Item {}: {}", i, var);
            }
        }
        Ok(())
    };
    exit_code(&report())
}
