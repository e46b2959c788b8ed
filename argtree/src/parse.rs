//! Recursive descent over the command tree.
//!
//! Each command consumes a contiguous span of the argument vector. Index 0 of
//! the span is the command's own name, already matched by the caller. When a
//! child command name shows up, the rest of the span is handed to the child
//! and the parent is done once it returns.

use std::io::Write;

use tracing::{debug, trace};

use crate::parser::Parser;
use crate::{Error, Result};

/// Where help and diagnostics go during one parse pass.
pub(crate) struct Streams<'a> {
    pub(crate) out: &'a mut dyn Write,
    pub(crate) err: &'a mut dyn Write,
}

impl Streams<'_> {
    pub(crate) fn diagnose(&mut self, err: &Error) {
        let _ = writeln!(self.err, "error: {}", err);
    }
}

fn is_option_token(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

impl Parser {
    /// Parse the span belonging to command `index` and return how many
    /// tokens of `tokens` it used.
    pub(crate) fn parse_command(
        &mut self,
        index: usize,
        tokens: &[String],
        io: &mut Streams,
    ) -> Result<usize> {
        if self.commands[index].reached {
            let err = Error::Reentrancy(self.command_path(index));
            io.diagnose(&err);
            return Err(err);
        }
        self.commands[index].reached = true;
        debug!(command = %self.command_path(index), span = tokens.len(), "parsing command");

        let mut pos = 1;
        let mut literal = false;
        while pos < tokens.len() {
            let token = tokens[pos].as_str();

            if !literal && (token == "-h" || token == "--help") {
                trace!(command = %self.command_path(index), "help requested");
                let _ = self.render_help(index, io.out);
                return Err(Error::HelpRequested);
            }

            if !literal && token == "--" {
                literal = true;
                pos += 1;
                continue;
            }

            if !literal && is_option_token(token) {
                let end = self.boundary(index, tokens, pos + 1);
                match self.parse_option(index, token, &tokens[pos + 1..end]) {
                    Ok(used) => pos += used + 1,
                    Err(err) => return Err(self.fail_with_help(index, err, io)),
                }
                continue;
            }

            if let Some(child) = self.child_named(index, token) {
                let used = self.parse_command(child, &tokens[pos..], io)?;
                pos += used;
                self.finish(index, false, io)?;
                return Ok(pos);
            }

            pos = self.parse_positionals(index, tokens, pos, literal, io)?;
            self.finish(index, true, io)?;
            return Ok(pos);
        }

        self.finish(index, true, io)?;
        Ok(tokens.len())
    }

    /// First index at or after `from` that starts another option or names a
    /// child command.
    fn boundary(&self, index: usize, tokens: &[String], from: usize) -> usize {
        tokens
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, token)| {
                is_option_token(token) || self.child_named(index, token).is_some()
            })
            .map(|(i, _)| i)
            .unwrap_or(tokens.len())
    }

    /// Dispatch one `-x`, `-xyz` or `--name` token. `values` is already cut
    /// at the boundary.
    fn parse_option(&mut self, index: usize, token: &str, values: &[String]) -> Result<usize> {
        let command = &mut self.commands[index];

        if let Some(long) = token.strip_prefix("--") {
            let slot = command
                .long_option(long)
                .ok_or_else(|| Error::UnknownToken(token.to_string()))?;
            trace!(option = token, available = values.len(), "long option");
            return command.options[slot].fill(values);
        }

        let shorts: Vec<char> = token[1..].chars().collect();
        if let [short] = shorts[..] {
            let slot = command
                .short_option(short)
                .ok_or_else(|| Error::UnknownToken(token.to_string()))?;
            trace!(option = token, available = values.len(), "short option");
            return command.options[slot].fill(values);
        }

        // A cluster only counts flags; validate the whole token before
        // touching any counter.
        let mut slots = Vec::with_capacity(shorts.len());
        for short in shorts {
            let slot = command
                .short_option(short)
                .ok_or_else(|| Error::UnknownToken(format!("-{}", short)))?;
            if command.options[slot].arity().takes_value() {
                return Err(Error::ClusteredValue {
                    option: format!("-{}", short),
                    token: token.to_string(),
                });
            }
            slots.push(slot);
        }
        trace!(option = token, flags = slots.len(), "short cluster");
        for slot in slots {
            command.options[slot].fill(&[])?;
        }
        Ok(0)
    }

    /// Hand the rest of the span to the positionals in registration order.
    /// A Value positional takes the next token as is, even one starting
    /// with `-`.
    fn parse_positionals(
        &mut self,
        index: usize,
        tokens: &[String],
        start: usize,
        literal: bool,
        io: &mut Streams,
    ) -> Result<usize> {
        if self.commands[index].positionals.is_empty() {
            let err = Error::UnexpectedArgument(tokens[start].clone());
            return Err(self.fail_with_help(index, err, io));
        }

        let mut pos = start;
        for positional in self.commands[index].positionals.iter_mut() {
            if pos >= tokens.len() {
                break;
            }
            match positional.fill(&tokens[pos..]) {
                Ok(used) => {
                    trace!(positional = positional.name(), used, "positional");
                    pos += used;
                }
                Err(err) => {
                    io.diagnose(&err);
                    return Err(err);
                }
            }
        }

        if pos < tokens.len() {
            if !literal && tokens[pos..].iter().any(|t| t == "-h" || t == "--help") {
                trace!(command = %self.command_path(index), "help requested");
                let _ = self.render_help(index, io.out);
                return Err(Error::HelpRequested);
            }
            let err = Error::UnexpectedArgument(tokens[pos].clone());
            return Err(self.fail_with_help(index, err, io));
        }
        Ok(pos)
    }

    /// Required options, and unless a child took over, positionals.
    fn finish(&self, index: usize, check_positionals: bool, io: &mut Streams) -> Result<()> {
        let command = &self.commands[index];
        let path = self.command_path(index);
        let mut missing = Vec::new();

        for opt in command.options.iter().filter(|opt| !opt.satisfied()) {
            let signature = opt.signature();
            let _ = writeln!(
                io.err,
                "error: missing required option '{}' for '{}'",
                signature, path
            );
            missing.push(signature);
        }
        if check_positionals {
            for positional in command.positionals.iter().filter(|p| !p.is_filled()) {
                let _ = writeln!(
                    io.err,
                    "error: missing required argument '{}' for '{}'",
                    positional.name(),
                    path
                );
                missing.push(positional.name().to_string());
            }
        }

        if missing.is_empty() {
            debug!(command = %path, "command satisfied");
            Ok(())
        } else {
            Err(Error::MissingRequired {
                command: path,
                missing,
            })
        }
    }

    fn fail_with_help(&self, index: usize, err: Error, io: &mut Streams) -> Error {
        io.diagnose(&err);
        let _ = self.render_help(index, io.out);
        err
    }
}

#[cfg(test)]
mod tests {
    use crate::{Command, Error, Opt, Parser, Positional};

    struct Run {
        result: crate::Result<()>,
        out: String,
        err: String,
    }

    fn run(parser: &mut Parser, args: &[&str]) -> Run {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let result = parser.parse_with(args.iter().copied(), &mut out, &mut err);
        Run {
            result,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn repeated_flag_counts() {
        let mut parser = Parser::new("prog", "");
        let verbose = parser.add_option(parser.root(), Opt::flag('v', "verbose")).unwrap();
        run(&mut parser, &["prog", "-v", "--verbose", "-v"]).result.unwrap();
        assert_eq!(parser.flag_count(verbose).unwrap(), 3);
    }

    #[test]
    fn clustered_flags_count_each_character() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let verbose = parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        let quiet = parser.add_option(root, Opt::flag('q', "quiet")).unwrap();
        run(&mut parser, &["prog", "-vvv", "-qv"]).result.unwrap();
        assert_eq!(parser.flag_count(verbose).unwrap(), 4);
        assert_eq!(parser.flag_count(quiet).unwrap(), 1);
    }

    #[test]
    fn cluster_with_value_option_is_rejected_whole() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let verbose = parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        parser.add_option(root, Opt::single('o', "output")).unwrap();
        let run = run(&mut parser, &["prog", "-vo", "file"]);
        assert!(matches!(run.result, Err(Error::ClusteredValue { .. })));
        assert_eq!(parser.flag_count(verbose).unwrap(), 0);
        assert!(run.out.contains("Usage: prog"));
    }

    #[test]
    fn value_twice_is_already_populated() {
        let mut parser = Parser::new("prog", "");
        let output = parser.add_option(parser.root(), Opt::single('o', "output")).unwrap();
        let run = run(&mut parser, &["prog", "-o", "a", "--output", "b"]);
        assert!(matches!(run.result, Err(Error::AlreadyPopulated(ref n)) if n == "--output"));
        assert_eq!(parser.value(output).unwrap(), Some("a"));
        assert!(run.err.contains("'--output' was already given"));
    }

    #[test]
    fn value_without_token_is_insufficient() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        parser.add_option(root, Opt::single('o', "output")).unwrap();
        parser.add_option(root, Opt::flag('v', "verbose")).unwrap();

        let end = run(&mut parser, &["prog", "-o"]);
        assert!(matches!(end.result, Err(Error::InsufficientTokens(_))));

        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        parser.add_option(root, Opt::single('o', "output")).unwrap();
        parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        let before_flag = run(&mut parser, &["prog", "-o", "-v"]);
        assert!(matches!(before_flag.result, Err(Error::InsufficientTokens(_))));
    }

    #[test]
    fn list_stops_at_next_option() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let list = parser.add_option(root, Opt::list('l', "list")).unwrap();
        let verbose = parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        run(&mut parser, &["prog", "--list", "a", "b", "c", "-v"]).result.unwrap();
        assert_eq!(parser.values(list).unwrap(), &["a", "b", "c"]);
        assert_eq!(parser.flag_count(verbose).unwrap(), 1);
    }

    #[test]
    fn list_stops_at_child_command() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let list = parser.add_option(root, Opt::list('l', "list")).unwrap();
        let build = parser.add_command(root, Command::new("build")).unwrap();
        run(&mut parser, &["prog", "-l", "x", "y", "build"]).result.unwrap();
        assert_eq!(parser.values(list).unwrap(), &["x", "y"]);
        assert!(parser.is_reached(build).unwrap());
    }

    #[test]
    fn unparsed_queries_read_unset() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let output = parser.add_option(root, Opt::single('o', "output")).unwrap();
        let input = parser.add_positional(root, Positional::list("INPUT")).unwrap();
        assert!(!parser.is_set(output).unwrap());
        assert_eq!(parser.value(output).unwrap(), None);
        assert!(parser.positional(input).unwrap().values().is_empty());
        assert!(!parser.is_reached(root).unwrap());
    }

    #[test]
    fn required_positional() {
        let mut parser = Parser::new("prog", "");
        let input = parser.add_positional(parser.root(), Positional::single("INPUT")).unwrap();
        let missing = run(&mut parser, &["prog"]);
        assert!(matches!(
            missing.result,
            Err(Error::MissingRequired { ref missing, .. }) if missing == &["INPUT"]
        ));
        assert!(missing.err.contains("missing required argument 'INPUT'"));
        assert!(!parser.positional(input).unwrap().is_filled());

        let mut parser = Parser::new("prog", "");
        let input2 = parser.add_positional(parser.root(), Positional::single("INPUT")).unwrap();
        run(&mut parser, &["prog", "foo.txt"]).result.unwrap();
        assert_eq!(parser.positional(input2).unwrap().value(), Some("foo.txt"));
    }

    #[test]
    fn positionals_fill_in_order() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let src = parser.add_positional(root, Positional::single("SRC")).unwrap();
        let rest = parser.add_positional(root, Positional::list("REST")).unwrap();
        parser.add_option(root, Opt::flag('f', "force")).unwrap();
        run(&mut parser, &["prog", "-f", "a", "b", "c"]).result.unwrap();
        assert_eq!(parser.positional(src).unwrap().value(), Some("a"));
        assert_eq!(parser.positional(rest).unwrap().values(), &["b", "c"]);
    }

    #[test]
    fn double_dash_makes_flags_positional() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let verbose = parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        let args = parser.add_positional(root, Positional::list("ARGS")).unwrap();
        run(&mut parser, &["prog", "-v", "--", "-v", "--help"]).result.unwrap();
        assert_eq!(parser.flag_count(verbose).unwrap(), 1);
        assert_eq!(parser.positional(args).unwrap().values(), &["-v", "--help"]);
    }

    #[test]
    fn extra_token_is_unexpected() {
        let mut parser = Parser::new("prog", "");
        parser.add_positional(parser.root(), Positional::single("INPUT")).unwrap();
        let run = run(&mut parser, &["prog", "a", "b"]);
        assert!(matches!(run.result, Err(Error::UnexpectedArgument(ref t)) if t == "b"));

        let mut bare = Parser::new("bare", "");
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let result = bare.parse_with(["bare", "stray"], &mut out, &mut err);
        assert!(matches!(result, Err(Error::UnexpectedArgument(_))));
    }

    #[test]
    fn unknown_option_prints_help() {
        let mut parser = Parser::new("prog", "does things");
        parser.add_option(parser.root(), Opt::flag('v', "verbose")).unwrap();
        let run = run(&mut parser, &["prog", "--nope"]);
        assert!(matches!(run.result, Err(Error::UnknownToken(ref t)) if t == "--nope"));
        assert!(run.err.contains("unknown option '--nope'"));
        assert!(run.out.contains("does things"));
    }

    #[test]
    fn short_and_long_never_cross_match() {
        let mut parser = Parser::new("prog", "");
        parser.add_option(parser.root(), Opt::flag('v', "verbose")).unwrap();
        assert!(matches!(
            run(&mut parser, &["prog", "--v"]).result,
            Err(Error::UnknownToken(_))
        ));
    }

    fn nested() -> (Parser, crate::CommandId, crate::OptionId, crate::OptionId) {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let top = parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        let run_cmd = parser.add_command(root, Command::new("run")).unwrap();
        let file = parser
            .add_option(run_cmd, Opt::single('f', "file").required())
            .unwrap();
        (parser, run_cmd, top, file)
    }

    #[test]
    fn nested_dispatch() {
        let (mut parser, run_cmd, top, file) = nested();
        run(&mut parser, &["prog", "run", "-f", "val"]).result.unwrap();
        assert!(parser.is_reached(run_cmd).unwrap());
        assert!(parser.is_reached(parser.root()).unwrap());
        assert_eq!(parser.value(file).unwrap(), Some("val"));
        assert!(!parser.is_set(top).unwrap());
    }

    #[test]
    fn nested_missing_required_fails_whole_parse() {
        let (mut parser, run_cmd, _, _) = nested();
        let run = run(&mut parser, &["prog", "run"]);
        match run.result {
            Err(Error::MissingRequired { command, missing }) => {
                assert_eq!(command, "prog run");
                assert_eq!(missing, vec!["-f, --file <FILE>".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(run.err.contains("missing required option '-f, --file <FILE>' for 'prog run'"));
        assert!(parser.is_reached(run_cmd).unwrap());
    }

    #[test]
    fn parent_options_are_not_inherited() {
        let (mut parser, _, top, _) = nested();
        let run = run(&mut parser, &["prog", "run", "-v", "-f", "x"]);
        assert!(matches!(run.result, Err(Error::UnknownToken(ref t)) if t == "-v"));
        assert!(!parser.is_set(top).unwrap());
    }

    #[test]
    fn help_at_depth_stops_parsing() {
        let (mut parser, _, top, file) = nested();
        let run = run(&mut parser, &["prog", "-v", "run", "--help", "-f", "x"]);
        assert!(matches!(run.result, Err(Error::HelpRequested)));
        assert!(run.result.as_ref().unwrap_err().is_help());
        assert!(run.out.contains("Usage: prog run"));
        assert!(run.err.is_empty());
        assert_eq!(parser.flag_count(top).unwrap(), 1);
        assert!(!parser.is_set(file).unwrap());
    }

    #[test]
    fn second_parse_is_reentrancy() {
        let mut parser = Parser::new("prog", "");
        run(&mut parser, &["prog"]).result.unwrap();
        let again = run(&mut parser, &["prog"]);
        assert!(matches!(again.result, Err(Error::Reentrancy(ref c)) if c == "prog"));
    }

    #[test]
    fn empty_args_parse_as_bare_program() {
        let mut parser = Parser::new("prog", "");
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        parser
            .parse_with(Vec::<String>::new(), &mut out, &mut err)
            .unwrap();
        assert!(parser.is_reached(parser.root()).unwrap());
    }

    #[test]
    fn lone_dash_is_a_positional() {
        let mut parser = Parser::new("prog", "");
        let input = parser.add_positional(parser.root(), Positional::single("INPUT")).unwrap();
        run(&mut parser, &["prog", "-"]).result.unwrap();
        assert_eq!(parser.positional(input).unwrap().value(), Some("-"));
    }

    #[test]
    fn help_after_positionals_is_still_help() {
        let mut parser = Parser::new("prog", "");
        parser.add_positional(parser.root(), Positional::single("INPUT")).unwrap();
        let run = run(&mut parser, &["prog", "foo", "--help"]);
        assert!(matches!(run.result, Err(Error::HelpRequested)));
        assert!(run.out.contains("Usage: prog INPUT"));
        assert!(run.err.is_empty(), "stderr: {}", run.err);
    }

    #[test]
    fn help_after_double_dash_is_an_argument() {
        let mut parser = Parser::new("prog", "");
        parser.add_positional(parser.root(), Positional::single("INPUT")).unwrap();
        let run = run(&mut parser, &["prog", "--", "foo", "--help"]);
        assert!(matches!(run.result, Err(Error::UnexpectedArgument(ref t)) if t == "--help"));
    }

    #[test]
    fn list_option_twice_is_already_populated() {
        let mut parser = Parser::new("prog", "");
        let list = parser.add_option(parser.root(), Opt::list('l', "list")).unwrap();
        let run = run(&mut parser, &["prog", "-l", "a", "-l", "b"]);
        assert!(matches!(run.result, Err(Error::AlreadyPopulated(ref n)) if n == "--list"));
        assert_eq!(parser.values(list).unwrap(), &["a"]);
    }

    #[test]
    fn list_option_before_flag_is_insufficient() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let list = parser.add_option(root, Opt::list('l', "list")).unwrap();
        parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        let run = run(&mut parser, &["prog", "-l", "-v"]);
        assert!(matches!(run.result, Err(Error::InsufficientTokens(ref n)) if n == "--list"));
        assert!(parser.values(list).unwrap().is_empty());
    }

    #[test]
    fn required_list_option_missing() {
        let mut parser = Parser::new("prog", "");
        parser
            .add_option(parser.root(), Opt::list('l', "list").required())
            .unwrap();
        let run = run(&mut parser, &["prog"]);
        assert!(matches!(
            run.result,
            Err(Error::MissingRequired { ref missing, .. }) if missing == &["-l, --list <LIST>..."]
        ));
        assert!(run.err.contains("missing required option '-l, --list <LIST>...' for 'prog'"));
    }

    #[test]
    fn single_positional_takes_dashed_token_literally() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        let verbose = parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        let src = parser.add_positional(root, Positional::single("SRC")).unwrap();
        let dst = parser.add_positional(root, Positional::single("DST")).unwrap();
        run(&mut parser, &["prog", "a", "-v"]).result.unwrap();
        assert_eq!(parser.positional(src).unwrap().value(), Some("a"));
        assert_eq!(parser.positional(dst).unwrap().value(), Some("-v"));
        assert_eq!(parser.flag_count(verbose).unwrap(), 0);
    }

    #[test]
    fn dashed_token_after_filled_positionals_is_unexpected() {
        let mut parser = Parser::new("prog", "");
        let root = parser.root();
        parser.add_option(root, Opt::flag('v', "verbose")).unwrap();
        parser.add_positional(root, Positional::single("SRC")).unwrap();
        let run = run(&mut parser, &["prog", "a", "-v"]);
        assert!(matches!(run.result, Err(Error::UnexpectedArgument(ref t)) if t == "-v"));
    }
}
