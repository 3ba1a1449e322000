//! Interactive keypad session.
//!
//! One task owns the [`Session`] and the assistant slots. Typed lines come
//! from a stdin reader thread and assistant results from [`AiTasks`]; both
//! are handled in order on the same loop, so no state is shared.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::ai::{
    AiCompletion, AiError, AiKind, AiRequest, AiResponse, AiTasks, CorrectRequest,
    ExplainRequest, Generator, render_markdown,
};
use crate::calculator::copy_result;
use crate::session::{PressOutcome, Session, parse_keys};

const HELP: &str = "\
Type keys and press Enter, e.g. 12+sin(30)=
  digits . + - * / ^ ( )   keypad keys
  sin( cos( tan( log( sqrt(   function keys
  C  clear    <  backspace    =  evaluate
Commands:
  :explain                    explain the last result
  :correct <heard> | <meant>  fix a misheard voice input
  :history                    list past calculations
  :recall <n>                 load calculation <n> from :history
  :copy                       copy the display to the clipboard
  :cancel [explain|correct]   cancel a running assistant request
  :help                       show this help
  :quit                       exit";

const INVALID_EXPRESSION: &str = "Invalid Expression: please check your calculation.";

/// Whether the loop keeps running after a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl<G, W> {
    session: Session,
    tasks: Result<AiTasks<G>, AiError>,
    out: W,
}

impl<G: Generator, W: Write> Repl<G, W> {
    /// `tasks` is the error that made the assistant unavailable, if any.
    pub fn new(session: Session, tasks: Result<AiTasks<G>, AiError>, out: W) -> Self {
        Self {
            session,
            tasks,
            out,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `:quit` or end of input.
    pub async fn run(mut self, lines: flume::Receiver<String>) -> Result<()> {
        writeln!(self.out, "MotionCalc. Type :help for keys and commands.")?;
        self.print_display()?;

        loop {
            self.prompt()?;
            let event = tokio::select! {
                line = lines.recv_async() => Event::Line(line.ok()),
                completion = next_completion(&mut self.tasks) => Event::Ai(completion),
            };

            match event {
                Event::Line(Some(line)) => {
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                Event::Line(None) => break,
                Event::Ai(completion) => self.handle_completion(completion)?,
            }
        }

        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(command) = line.strip_prefix(':') else {
            self.handle_keys(line)?;
            return Ok(Flow::Continue);
        };

        let (name, args) = command
            .split_once(char::is_whitespace)
            .map(|(name, args)| (name, args.trim()))
            .unwrap_or((command, ""));

        match name {
            "q" | "quit" | "exit" => return Ok(Flow::Quit),
            "h" | "help" => writeln!(self.out, "{HELP}")?,
            "history" => self.print_history()?,
            "recall" => self.recall(args)?,
            "explain" => self.explain()?,
            "correct" => self.correct(args)?,
            "cancel" => self.cancel(args)?,
            "copy" => match copy_result(self.session.display()) {
                Ok(()) => writeln!(self.out, "Copied {}", self.session.display())?,
                Err(e) => writeln!(self.out, "{e}")?,
            },
            other => writeln!(self.out, "Unknown command :{other}. Type :help.")?,
        }

        Ok(Flow::Continue)
    }

    fn handle_keys(&mut self, line: &str) -> Result<()> {
        let keys = match parse_keys(line) {
            Ok(keys) => keys,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(());
            }
        };

        for key in keys {
            if self.session.press(key) == PressOutcome::InvalidExpression {
                writeln!(self.out, "{INVALID_EXPRESSION}")?;
            }
        }

        self.print_display()
    }

    pub fn handle_completion(&mut self, completion: AiCompletion) -> Result<()> {
        debug!(kind = %completion.kind, ok = completion.result.is_ok(), "AI request finished");
        writeln!(self.out)?;

        match completion.result {
            Ok(AiResponse::Explanation(response)) => {
                writeln!(self.out, "AI Explanation\n")?;
                writeln!(self.out, "{}", render_markdown(&response.explanation))?;
            }
            Ok(AiResponse::Correction(response)) => {
                self.session.apply_correction(&response.calculation);
                writeln!(self.out, "Corrected to {}", response.calculation)?;
                self.print_display()?;
            }
            Err(e) => writeln!(self.out, "{e}")?,
        }

        Ok(())
    }

    fn explain(&mut self) -> Result<()> {
        let Some(calculation) = self.session.explain_request() else {
            writeln!(self.out, "Nothing to explain yet: finish a calculation with =.")?;
            return Ok(());
        };
        self.start(AiRequest::Explain(ExplainRequest { calculation }))
    }

    fn correct(&mut self, args: &str) -> Result<()> {
        let Some((heard, meant)) = args
            .split_once('|')
            .map(|(heard, meant)| (heard.trim(), meant.trim()))
            .filter(|(heard, meant)| !heard.is_empty() && !meant.is_empty())
        else {
            writeln!(self.out, "Usage: :correct <heard> | <meant>")?;
            return Ok(());
        };

        self.start(AiRequest::Correct(CorrectRequest {
            original_input: heard.to_string(),
            corrected_input: meant.to_string(),
        }))
    }

    fn start(&mut self, request: AiRequest) -> Result<()> {
        let kind = request.kind();
        let started = match &mut self.tasks {
            Ok(tasks) => tasks.start(request),
            Err(e) => Err(e.clone()),
        };

        match started {
            Ok(()) => writeln!(self.out, "Loading {kind}... (:cancel to stop)")?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(())
    }

    fn cancel(&mut self, args: &str) -> Result<()> {
        let kinds: &[AiKind] = match args {
            "" => &[AiKind::Explain, AiKind::Correct],
            "explain" => &[AiKind::Explain],
            "correct" => &[AiKind::Correct],
            other => {
                writeln!(self.out, "Nothing named {other:?} to cancel.")?;
                return Ok(());
            }
        };

        let Ok(tasks) = &mut self.tasks else {
            return Ok(());
        };
        for &kind in kinds {
            if tasks.cancel(kind) {
                writeln!(self.out, "Cancelled {kind}.")?;
            }
        }
        Ok(())
    }

    fn recall(&mut self, args: &str) -> Result<()> {
        let recalled = args
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .is_some_and(|index| self.session.recall(index));

        if recalled {
            self.print_display()
        } else {
            writeln!(self.out, "No history entry {args:?}. See :history.")?;
            Ok(())
        }
    }

    fn print_history(&mut self) -> Result<()> {
        if self.session.history().is_empty() {
            writeln!(self.out, "No history yet.")?;
            return Ok(());
        }
        let history = self.session.history();
        writeln!(self.out, "History ({} of {} kept):", history.len(), history.limit())?;
        for (i, item) in history.iter().enumerate() {
            writeln!(self.out, "{:>3}. {}", i + 1, item.expression)?;
            writeln!(self.out, "     = {}", item.result)?;
        }
        Ok(())
    }

    fn print_display(&mut self) -> Result<()> {
        writeln!(self.out, "  {}", self.session.expression())?;
        writeln!(self.out, "= {}", self.session.display())?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }
}

enum Event {
    Line(Option<String>),
    Ai(AiCompletion),
}

async fn next_completion<G: Generator>(tasks: &mut Result<AiTasks<G>, AiError>) -> AiCompletion {
    match tasks {
        Ok(tasks) => tasks.next_completion().await,
        Err(_) => std::future::pending().await,
    }
}

/// Read stdin lines on a dedicated thread.
pub fn spawn_stdin_reader() -> flume::Receiver<String> {
    let (tx, rx) = flume::unbounded();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
