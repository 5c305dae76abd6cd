//! Candidate-facing text. Every function returns the rendered block so the
//! session can print it and tests can inspect it.

use crate::config::Mode;
use assessor_core::case::CaseDocument;
use assessor_core::criteria::CriterionGroup;
use assessor_core::engine::EngineLimits;
use assessor_core::feedback::Feedback;
use assessor_core::scoring::{AssessmentResult, GroupOutcome};
use colored::Colorize;
use std::fmt;

const RULE: &str = "==================================================";

pub fn welcome(case: &CaseDocument) -> String {
    let mut out = String::from("\n");
    line(
        &mut out,
        format!("=== {} Role Play Assessment ===", case.title).cyan().bold(),
    );
    out.push('\n');
    line(&mut out, format!("{} {}", "Scenario:".bold(), case.description));
    out.push('\n');
    line(
        &mut out,
        format!(
            "{} {} ({})",
            "Your Role:".bold(),
            case.role.title,
            case.role.responsibility
        ),
    );
    if !case.instructions.is_empty() {
        out.push('\n');
        line(&mut out, "Instructions:".bold());
        for instruction in &case.instructions {
            line(&mut out, format!("- {instruction}"));
        }
    }
    out.push('\n');
    line(
        &mut out,
        format!("You have {} minutes for this assessment.", case.time_limit_minutes),
    );
    out.push_str(&"Type 'exit' or 'quit' at any time to stop.".dimmed().to_string());
    out
}

pub fn mode_menu(groups: usize) -> String {
    let quick = EngineLimits::quick().questions_per_group as usize;
    let full = EngineLimits::full().questions_per_group as usize;
    format!(
        "\n{}\n1. Quick Assessment ({} questions, {} per group)\n2. Full Assessment ({} questions, {} per group)",
        "Select Assessment Mode:".bold(),
        quick * groups,
        quick,
        full * groups,
        full
    )
}

pub fn mode_started(mode: Mode, limits: &EngineLimits, groups: usize) -> String {
    let name = match mode {
        Mode::Quick => "Quick",
        Mode::Full => "Full",
    };
    format!(
        "\nStarting {} Assessment\nTotal questions: {} ({} per group)\n\nFirst, let's discuss your understanding of the case.",
        name,
        limits.questions_per_group as usize * groups,
        limits.questions_per_group
    )
}

pub fn question(text: &str) -> String {
    format!("\n{} {}", "Assessor:".green().bold(), text)
}

pub fn group_header(group: &CriterionGroup) -> String {
    format!(
        "\n{}\nWe'll evaluate your {}",
        format!("=== Now let's focus on {} ===", group.name).cyan().bold(),
        group.description.to_lowercase()
    )
}

pub fn guidance(text: &str) -> String {
    format!(
        "\n{}\n{}",
        text.yellow(),
        "Please try again with a more detailed response.".dimmed()
    )
}

pub fn skipped() -> String {
    format!(
        "\n{}",
        "Too many invalid responses. Moving to next question...".yellow()
    )
}

/// Per-group breakdown followed by the overall score.
pub fn scores(result: &AssessmentResult) -> String {
    let mut out = String::from("\n");
    line(&mut out, "Detailed Scores by Group:".bold());
    line(&mut out, RULE);

    for group in &result.groups {
        line(&mut out, format!("\n{}:", group.name.bold()));
        match &group.outcome {
            GroupOutcome::NoData => line(&mut out, "No scored responses".dimmed()),
            GroupOutcome::Scored(score) => {
                line(
                    &mut out,
                    format!(
                        "Average Score: {:.2}/{:.2}",
                        score.average_score, score.max_possible
                    ),
                );
                line(&mut out, format!("Percentage: {:.1}%", score.percentage));
                line(&mut out, "\nBreakdown of Individual Responses:");
                for (i, breakdown) in score.individual_scores.iter().enumerate() {
                    line(&mut out, format!("\nResponse {}:", i + 1));
                    for (criterion, value) in &breakdown.scores {
                        line(
                            &mut out,
                            format!("- {}: {:.2}", title_case(criterion.as_str()), value),
                        );
                    }
                    line(
                        &mut out,
                        format!("Total: {:.2}/{:.0}", breakdown.total, breakdown.max_possible),
                    );
                }
            }
        }
    }

    line(&mut out, format!("\n{}", "Overall Assessment Score:".bold()));
    line(&mut out, RULE);
    match &result.overall {
        Some(overall) => {
            line(
                &mut out,
                format!("\nFinal Score: {:.2}/{:.2}", overall.score, overall.max_score),
            );
            line(&mut out, format!("Percentage: {:.1}%", overall.percentage));
            out.push_str(&format!(
                "Performance Level: {}",
                overall.level.to_string().bold()
            ));
        }
        None => out.push_str("\nNo scored responses were collected."),
    }
    out
}

pub fn feedback(feedback: &Feedback) -> String {
    let mut out = String::from("\n");
    line(&mut out, "Assessment Feedback:".bold());
    line(&mut out, RULE);

    for (name, group) in &feedback.groups {
        line(&mut out, format!("\n{}:", name.bold()));
        if let Some(score) = group.score {
            line(&mut out, format!("Score: {score:.1}"));
        }
        push_list(&mut out, "Key behaviors", &group.key_behaviors);
        push_list(&mut out, "Development priorities", &group.development_priorities);
        push_list(&mut out, "Action steps", &group.action_steps);
    }

    let overall = &feedback.overall_assessment;
    line(&mut out, format!("\n{}", "Overall:".bold()));
    push_list(&mut out, "Strengths", &overall.strengths);
    push_list(&mut out, "Development areas", &overall.development_areas);
    push_list(&mut out, "Recommendations", &overall.recommendations);
    if let Some(note) = &feedback.note {
        line(&mut out, format!("Note: {note}").dimmed());
    }
    out
}

/// Appends `text` and a newline.
fn line(out: &mut String, text: impl fmt::Display) {
    out.push_str(&text.to_string());
    out.push('\n');
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    line(out, format!("{label}:"));
    for item in items {
        line(out, format!("  - {item}"));
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
