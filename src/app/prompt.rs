//! Interactive terminal input
//!
//! Prompts are cooperative suspension points: the task simply waits for the
//! user, with no timeout.

use std::io::{self, BufRead, Write};

/// Source of answers to interactive questions
pub trait Prompter: Send {
    /// Ask one question; `hidden` input is not echoed
    fn ask(&mut self, label: &str, hidden: bool) -> io::Result<String>;
}

/// Reads answers from stdin, hidden answers via `rpassword`
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, label: &str, hidden: bool) -> io::Result<String> {
        if hidden {
            return rpassword::prompt_password(format!("{} ", label));
        }

        print!("{} ", label);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

/// Answers questions from a fixed script, in order
///
/// Used where input must be supplied without a terminal.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Labels of every question asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, label: &str, _hidden: bool) -> io::Result<String> {
        self.asked.push(label.to_string());
        // An exhausted script behaves like an empty answer
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}
