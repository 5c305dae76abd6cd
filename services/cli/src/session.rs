//! The interactive assessment loop: reads candidate responses line by line,
//! feeds them to the engine, and prints whatever it decides to ask next.

use crate::config::Mode;
use crate::display;
use anyhow::{Context, Result};
use assessor_core::criteria::GroupId;
use assessor_core::engine::{AssessmentEngine, EngineLimits, Turn};
use assessor_core::feedback::{FeedbackRequest, FeedbackWriter};
use assessor_core::questions::Interviewer;
use assessor_core::scoring::ScoringModel;
use assessor_core::selector::Selector;
use assessor_core::transcript::{ConversationTracker, Role};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, Lines};
use tracing::{debug, info};

const QUIT_MESSAGE: &str = "Ending assessment. Thank you for participating!";
const SKIPPED_NOTE: &str = "Too many invalid responses. Moving to next question.";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every group was covered; the transcript was written to `path`.
    Completed { path: PathBuf },
    /// The candidate typed `exit` or `quit`.
    Quit,
    /// Standard input reached end-of-file.
    InputClosed,
}

enum Input {
    Line(String),
    Quit,
    Closed,
}

pub struct AssessmentSession {
    interviewer: Interviewer,
    scoring: ScoringModel,
    feedback: FeedbackWriter,
    selector: Arc<dyn Selector>,
    sessions_dir: PathBuf,
    tracker: ConversationTracker,
}

impl AssessmentSession {
    pub fn new(
        interviewer: Interviewer,
        scoring: ScoringModel,
        feedback: FeedbackWriter,
        selector: Arc<dyn Selector>,
        sessions_dir: PathBuf,
    ) -> Self {
        Self {
            interviewer,
            scoring,
            feedback,
            selector,
            sessions_dir,
            tracker: ConversationTracker::new(),
        }
    }

    pub fn tracker(&self) -> &ConversationTracker {
        &self.tracker
    }

    /// Runs one assessment to completion. `mode` is asked for on `input`
    /// when not supplied.
    pub async fn run<R>(&mut self, input: &mut Lines<R>, mode: Option<Mode>) -> Result<Outcome>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("{}", display::welcome(self.interviewer.case()));

        let groups = self.scoring.groups().len();
        let mode = match mode {
            Some(mode) => mode,
            None => match self.select_mode(input, groups).await? {
                Input::Line(choice) => Mode::from_choice(&choice).unwrap_or(Mode::Quick),
                Input::Quit => return Ok(self.quit()),
                Input::Closed => return Ok(Outcome::InputClosed),
            },
        };
        let limits = match mode {
            Mode::Quick => EngineLimits::quick(),
            Mode::Full => EngineLimits::full(),
        };
        info!(mode = mode.as_str(), session_id = %self.tracker.session_id(), "Assessment mode selected");
        println!("{}", display::mode_started(mode, &limits, groups));

        let engine = AssessmentEngine::new(self.scoring.groups(), limits, self.selector.clone());
        let mut state = engine.begin(&self.interviewer.case().focus_areas);

        let opening = self.interviewer.opening_question(&state.focus_topic).await;
        self.ask(&opening);

        let mut shown_group: Option<GroupId> = None;
        loop {
            let response = match read_response(input, "\nYour response: ").await? {
                Input::Line(line) => line,
                Input::Quit => return Ok(self.quit()),
                Input::Closed => {
                    info!("Input closed before the assessment finished");
                    return Ok(Outcome::InputClosed);
                }
            };
            self.tracker.record(Role::Candidate, response.as_str());

            let (next, turn) = engine.step(state, &response);
            state = next;

            let Turn::Ask {
                question,
                guidance,
                skipped,
                group_changed,
            } = turn
            else {
                break;
            };

            if let Some(text) = &guidance {
                println!("{}", display::guidance(text));
                self.tracker.record(Role::System, text.as_str());
            }
            if skipped {
                println!("{}", display::skipped());
                self.tracker.record(Role::System, SKIPPED_NOTE);
            }
            if let Some(id) = question.group {
                if group_changed || shown_group != Some(id) {
                    if let Some(group) = self.scoring.group(id) {
                        println!("{}", display::group_header(group));
                    }
                    shown_group = Some(id);
                }
            }

            let text = self.interviewer.phrase(&question).await;
            self.ask(&text);
        }

        println!("\n=== Assessment Complete ===");
        let result = self.scoring.aggregate(&state.records);
        println!("{}", display::scores(&result));

        let request = FeedbackRequest::new(result.clone(), &state.records);
        let feedback = self.feedback.write(&request).await;
        println!("{}", display::feedback(&feedback));

        let path = self
            .tracker
            .save(&self.sessions_dir, mode.as_str(), &result, &feedback)
            .context("Failed to save session transcript")?;
        println!("\nSession data saved to: {}", path.display());
        info!(path = %path.display(), "Assessment complete");
        Ok(Outcome::Completed { path })
    }

    async fn select_mode<R>(&mut self, input: &mut Lines<R>, groups: usize) -> Result<Input>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("{}", display::mode_menu(groups));
        loop {
            match read_response(input, "\nEnter your choice (1 or 2): ").await? {
                Input::Line(choice) if Mode::from_choice(&choice).is_some() => {
                    return Ok(Input::Line(choice));
                }
                Input::Line(choice) => {
                    debug!(choice = %choice, "Unrecognised mode choice");
                    println!("Please enter either 1 or 2.");
                }
                other => return Ok(other),
            }
        }
    }

    fn ask(&mut self, text: &str) {
        println!("{}", display::question(text));
        self.tracker.record(Role::Assessor, text);
    }

    fn quit(&mut self) -> Outcome {
        println!("\n{QUIT_MESSAGE}");
        self.tracker.record(Role::System, QUIT_MESSAGE);
        info!("Assessment ended by candidate");
        Outcome::Quit
    }
}

async fn read_response<R>(input: &mut Lines<R>, prompt: &str) -> Result<Input>
where
    R: AsyncBufRead + Unpin,
{
    print!("{prompt}");
    std::io::stdout().flush().ok();
    let Some(line) = input.next_line().await.context("Failed to read from stdin")? else {
        return Ok(Input::Closed);
    };
    let line = line.trim().to_string();
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Ok(Input::Quit);
    }
    Ok(Input::Line(line))
}
