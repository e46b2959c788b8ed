use std::fmt;
use std::str::FromStr;

use crate::slot::{Arity, Slot};
use crate::Result;

/// An unnamed, always-required argument matched by position.
#[derive(Debug)]
pub struct Positional {
    name: String,
    description: Option<String>,
    slot: Slot,
}

impl Positional {
    /// A single token.
    pub fn single(name: &str) -> Self {
        Positional {
            name: name.to_string(),
            description: None,
            slot: Slot::new(Arity::Value),
        }
    }

    /// Every remaining token of the command.
    pub fn list(name: &str) -> Self {
        Positional {
            name: name.to_string(),
            description: None,
            slot: Slot::new(Arity::List),
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn arity(&self) -> Arity {
        self.slot.arity()
    }

    pub fn is_filled(&self) -> bool {
        self.slot.occurrences() > 0
    }

    pub fn value(&self) -> Option<&str> {
        self.slot.value()
    }

    pub fn values(&self) -> &[String] {
        self.slot.values()
    }

    /// Number of tokens stored.
    pub fn count(&self) -> usize {
        self.slot.values().len()
    }

    pub fn value_as<T>(&self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.slot.value_as(&self.name)
    }

    pub fn values_as<T>(&self) -> Result<Vec<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.slot.values_as(&self.name)
    }

    /// `NAME`, or `NAME...` for a list.
    pub fn usage(&self) -> String {
        match self.arity() {
            Arity::List => format!("{}...", self.name),
            _ => self.name.clone(),
        }
    }

    pub(crate) fn fill(&mut self, tokens: &[String]) -> Result<usize> {
        self.slot.fill(tokens, &self.name)
    }
}
