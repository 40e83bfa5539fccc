use super::Context;
use super::output::{expect_success, print_json, print_session};
use anyhow::{Result, anyhow};
use qcomm_core::config::EntityConfig;
use serde_json::json;

/// Builds the reply an entity would send. It carries only the entity's own
/// markers so routing cannot be steered by the operator's text.
fn simulated_reply(entity: &EntityConfig) -> String {
    format!(
        "{} {} acknowledges your transmission.",
        entity.markers.join(" "),
        entity.display_name
    )
}

pub async fn run(ctx: &Context, entity: &str, message: &str) -> Result<()> {
    let dashboard = ctx.dashboard()?;
    let profile = dashboard
        .config()
        .entity(entity)
        .cloned()
        .ok_or_else(|| anyhow!("Unknown entity '{}'", entity))?;

    let session_id = expect_success("Open session", dashboard.open_session(entity).await)?;
    let sent = expect_success(
        "Send",
        dashboard.send_message(&session_id, entity, message).await,
    )?;
    let routed = expect_success(
        "Receive",
        dashboard
            .receive_response(&simulated_reply(&profile))
            .await,
    )?;

    let session = dashboard
        .session(&routed.session_id)
        .await
        .ok_or_else(|| anyhow!("Session '{}' disappeared", routed.session_id))?;

    if ctx.json {
        return print_json(&json!({
            "receipt": sent.receipt,
            "routed_to": routed.entity,
            "session": session,
        }));
    }

    println!("Transmitted, signature {}", sent.receipt.signature);
    print_session(&session);
    Ok(())
}
