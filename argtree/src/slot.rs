//! Token storage shared by options and positionals.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// How many tokens an argument consumes per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No tokens; may repeat, each occurrence is counted.
    Flag,
    /// Exactly one token, at most once.
    Value,
    /// Every token up to the boundary, at most once.
    List,
}

impl Arity {
    pub fn takes_value(self) -> bool {
        !matches!(self, Arity::Flag)
    }
}

#[derive(Debug)]
pub(crate) struct Slot {
    arity: Arity,
    occurrences: usize,
    values: Vec<String>,
}

impl Slot {
    pub(crate) fn new(arity: Arity) -> Self {
        Slot {
            arity,
            occurrences: 0,
            values: Vec::new(),
        }
    }

    pub(crate) fn arity(&self) -> Arity {
        self.arity
    }

    /// Consume tokens from the head of `tokens` and return how many were taken.
    ///
    /// `tokens` must already be cut at the boundary the caller computed; a
    /// List takes all of it.
    pub(crate) fn fill(&mut self, tokens: &[String], label: &str) -> Result<usize> {
        match self.arity {
            Arity::Flag => {
                self.occurrences += 1;
                Ok(0)
            }
            Arity::Value | Arity::List => {
                if self.occurrences != 0 {
                    return Err(Error::AlreadyPopulated(label.to_string()));
                }
                if tokens.is_empty() {
                    return Err(Error::InsufficientTokens(label.to_string()));
                }
                let take = if self.arity == Arity::Value {
                    1
                } else {
                    tokens.len()
                };
                self.values.extend_from_slice(&tokens[..take]);
                self.occurrences = 1;
                Ok(take)
            }
        }
    }

    pub(crate) fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub(crate) fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub(crate) fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn value_as<T>(&self, label: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.value().map(|raw| convert(label, raw)).transpose()
    }

    pub(crate) fn values_as<T>(&self, label: &str) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.values.iter().map(|raw| convert(label, raw)).collect()
    }
}

fn convert<T>(label: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|err| Error::InvalidValue {
        name: label.to_string(),
        reason: format!("{:?}: {}", raw, err),
    })
}
