use std::fmt;
use std::str::FromStr;

use crate::slot::{Arity, Slot};
use crate::Result;

/// A named optional argument: `-s` / `--long`.
///
/// Built with [`Opt::flag`], [`Opt::value`] or [`Opt::list`] and registered
/// with [`Parser::add_option`](crate::Parser::add_option). After parsing the
/// same value answers the queries.
#[derive(Debug)]
pub struct Opt {
    short: char,
    long: String,
    description: Option<String>,
    placeholder: Option<String>,
    required: bool,
    slot: Slot,
}

impl Opt {
    fn new(short: char, long: &str, arity: Arity) -> Self {
        Opt {
            short,
            long: long.to_string(),
            description: None,
            placeholder: None,
            required: false,
            slot: Slot::new(arity),
        }
    }

    pub fn flag(short: char, long: &str) -> Self {
        Self::new(short, long, Arity::Flag)
    }

    pub fn single(short: char, long: &str) -> Self {
        Self::new(short, long, Arity::Value)
    }

    pub fn list(short: char, long: &str) -> Self {
        Self::new(short, long, Arity::List)
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Label shown for the value in help, e.g. `PATH` in `--output <PATH>`.
    pub fn placeholder(mut self, label: &str) -> Self {
        self.placeholder = Some(label.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn short(&self) -> char {
        self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn arity(&self) -> Arity {
        self.slot.arity()
    }

    /// Occurrences seen during parsing. Flags count every repetition.
    pub fn count(&self) -> usize {
        self.slot.occurrences()
    }

    pub fn is_set(&self) -> bool {
        self.count() > 0
    }

    pub fn value(&self) -> Option<&str> {
        self.slot.value()
    }

    pub fn values(&self) -> &[String] {
        self.slot.values()
    }

    pub fn value_as<T>(&self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.slot.value_as(&self.label())
    }

    pub fn values_as<T>(&self) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.slot.values_as(&self.label())
    }

    /// Placeholder text, defaulting to the upper-cased long name.
    pub fn value_label(&self) -> String {
        match &self.placeholder {
            Some(label) => label.clone(),
            None => self.long.to_uppercase().replace('-', "_"),
        }
    }

    /// `-s, --long <LABEL>` as used in help rows and diagnostics.
    pub fn signature(&self) -> String {
        let mut out = format!("-{}, --{}", self.short, self.long);
        match self.arity() {
            Arity::Flag => {}
            Arity::Value => out.push_str(&format!(" <{}>", self.value_label())),
            Arity::List => out.push_str(&format!(" <{}>...", self.value_label())),
        }
        out
    }

    /// Whether the required constraint is met after parsing.
    pub(crate) fn satisfied(&self) -> bool {
        !self.required || self.count() > 0
    }

    pub(crate) fn label(&self) -> String {
        format!("--{}", self.long)
    }

    pub(crate) fn fill(&mut self, tokens: &[String]) -> Result<usize> {
        let label = self.label();
        self.slot.fill(tokens, &label)
    }
}
