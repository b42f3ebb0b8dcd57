//! Interactive prompting for course details missing from the command line

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::domain::{Course, CourseStatus};

/// Course fields as given on the command line; `None` means ask
#[derive(Debug, Clone, Default)]
pub struct CourseAnswers {
    pub name: Option<String>,
    pub status: Option<CourseStatus>,
    pub quarter: Option<String>,
}

impl CourseAnswers {
    /// True when nothing needs to be asked
    pub fn is_complete(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && self.status.is_some()
            && self.quarter.as_deref().is_some_and(|q| !q.trim().is_empty())
    }
}

/// Fill in missing course fields by calling `ask` with a prompt until each
/// answer is usable
///
/// A blank status answer means the default status. `ask` returning an error
/// aborts the whole prompt.
pub fn resolve_course<F>(answers: CourseAnswers, mut ask: F) -> Result<Course>
where
    F: FnMut(&str) -> Result<String>,
{
    debug!(?answers, "resolve_course: called");

    let name = match answers.name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name,
        None => ask_non_empty(&mut ask, "Course name: ")?,
    };

    let status = match answers.status {
        Some(status) => status,
        None => loop {
            let answer = ask("Status [IP/D/NS] (default NS): ")?;
            if answer.trim().is_empty() {
                break CourseStatus::default();
            }
            match answer.parse::<CourseStatus>() {
                Ok(status) => break status,
                Err(e) => eprintln!("{}", e.as_str().yellow()),
            }
        },
    };

    let quarter = match answers.quarter.filter(|q| !q.trim().is_empty()) {
        Some(quarter) => quarter,
        None => ask_non_empty(&mut ask, "Quarter: ")?,
    };

    Ok(Course::new(&name, status, &quarter))
}

fn ask_non_empty<F>(ask: &mut F, prompt: &str) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    loop {
        let answer = ask(prompt)?;
        if !answer.trim().is_empty() {
            return Ok(answer);
        }
    }
}

/// Prompt on the terminal for whatever `answers` is missing
pub fn prompt_course(answers: CourseAnswers) -> Result<Course> {
    if answers.is_complete() {
        return resolve_course(answers, |_| Err(eyre::eyre!("no prompt needed")));
    }

    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
    resolve_course(answers, |prompt| match rl.readline(prompt) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Err(eyre::eyre!("Cancelled")),
        Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
    })
}
