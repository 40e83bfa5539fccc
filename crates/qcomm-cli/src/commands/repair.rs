use super::Context;
use super::output::{expect_success, print_json};
use anyhow::Result;
use colored::Colorize;

pub async fn run(ctx: &Context) -> Result<()> {
    let dashboard = ctx.dashboard()?;
    let report = expect_success("Repair", dashboard.repair_links().await)?;

    if ctx.json {
        return print_json(&report);
    }

    if report.converged {
        println!(
            "{} after {} attempt(s)",
            "Diagnostics stabilized".green().bold(),
            report.attempts
        );
    } else {
        println!(
            "{} after {} attempt(s)",
            "Diagnostics did not stabilize".yellow().bold(),
            report.attempts
        );
    }
    println!("Remediation rounds: {}", report.remediation_rounds);
    for result in &report.last_results {
        println!(
            "  {:<20} {:<9} {:>5.1}",
            result.module_name,
            result.status.to_string(),
            result.resonance
        );
    }
    Ok(())
}
