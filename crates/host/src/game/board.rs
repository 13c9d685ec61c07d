//! Text tables shown to players.

use std::fmt::Write;

use super::category::LABELS;
use super::engine::GameEngine;

fn header(out: &mut String) {
    let _ = writeln!(out, "| {:<3} | {:<15} | {:>3} |", "Num", "Name", "Pts");
}

fn row(out: &mut String, num: &str, label: &str, pts: &str) {
    let _ = writeln!(out, "| {:<3} | {:<15} | {:>3} |", num, label, pts);
}

/// Every slot with its points, blank while unscored.
pub fn scoreboard(engine: &GameEngine) -> String {
    let mut out = String::new();
    header(&mut out);
    for (index, label) in LABELS.iter().enumerate() {
        let pts = engine.score(index).map(|s| s.to_string()).unwrap_or_default();
        row(&mut out, &(index + 1).to_string(), label, &pts);
    }
    out
}

/// Open categories with the number to pass to `score`.
pub fn available(engine: &GameEngine) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {:<3} | {:<15} |", "Num", "Name");
    for category in engine.available_categories() {
        let _ = writeln!(
            out,
            "| {:<3} | {:<15} |",
            category.index() + 1,
            category.label()
        );
    }
    out
}

/// Final score sheet with section totals and the upper bonus.
pub fn final_tally(engine: &GameEngine) -> String {
    let tally = engine.tally();
    let mut out = String::new();
    let _ = writeln!(out, "| {:^27} |", "Upper Section");
    header(&mut out);
    for (index, label) in LABELS.iter().enumerate() {
        if index == 6 {
            row(&mut out, "", "Bonus", &tally.upper_bonus.to_string());
            let _ = writeln!(out, "| {:^27} |", "Lower Section");
            header(&mut out);
        }
        let pts = engine.score(index).unwrap_or_default();
        row(&mut out, &(index + 1).to_string(), label, &pts.to_string());
    }
    let _ = writeln!(out, "| {:>21} | {:>3} |", "Total Lower Score", tally.lower);
    let _ = writeln!(
        out,
        "| {:>21} | {:>3} |",
        "Total Upper Score",
        tally.upper + tally.upper_bonus
    );
    let _ = writeln!(out, "| {:>21} | {:>3} |", "GRAND TOTAL", tally.grand_total());
    out
}
