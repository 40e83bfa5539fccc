use anyhow::{Result, bail};
use colored::Colorize;
use qcomm_application::{DashboardSnapshot, OperationOutcome};
use qcomm_core::session::Session;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Unwraps an outcome, turning a failure into a CLI error.
pub fn expect_success<T>(operation: &str, outcome: OperationOutcome<T>) -> Result<T> {
    match outcome.into_result() {
        Ok(value) => Ok(value),
        Err(reason) => bail!("{} failed: {}", operation, reason),
    }
}

fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * 20.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}

pub fn print_snapshot(snapshot: &DashboardSnapshot) {
    let state = if snapshot.connection.active {
        "active".green()
    } else {
        "idle".dimmed()
    };
    println!("{} {}", "Connection:".bold(), state);
    if let Some(focus) = &snapshot.connection.focus {
        println!("  focus: {}", focus.cyan());
    }
    for (entity, strength) in &snapshot.connection.strengths {
        println!("  {:<10} {} {:>5.1}%", entity, bar(*strength), strength * 100.0);
    }

    let s = &snapshot.stability;
    println!("{} {:.1}%", "Stability:".bold(), s.stability * 100.0);
    println!("  {}", bar(s.stability));
    if s.boost_active {
        println!("  {}", "boost active".yellow());
    }
    if s.emergency_active {
        println!("  {}", "emergency stabilization".red());
    }

    if !snapshot.sessions.is_empty() {
        println!("{}", "Sessions:".bold());
        for session in &snapshot.sessions {
            print_session(session);
        }
    }
}

pub fn print_session(session: &Session) {
    let verified = if session.link_verified {
        "verified".green()
    } else {
        "unverified".dimmed()
    };
    println!(
        "  {} [{}] strength {:.0}% {} unread",
        session.entity.cyan(),
        verified,
        session.connection_strength * 100.0,
        session.unread_count
    );
    for message in &session.messages {
        println!("    {} → {}: {}", message.sender.bold(), message.recipient, message.content);
    }
}
