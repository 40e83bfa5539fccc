use super::Context;
use super::output::{expect_success, print_json, print_snapshot};
use anyhow::{Result, anyhow};

pub struct SimulateArgs {
    pub ticks: u32,
    pub entity: Option<String>,
    pub boost: bool,
    pub emergency: bool,
}

pub async fn run(ctx: &Context, args: SimulateArgs) -> Result<()> {
    let dashboard = ctx.dashboard()?;

    let entity = match args.entity {
        Some(entity) => entity,
        None => dashboard
            .config()
            .entities
            .first()
            .map(|e| e.id.clone())
            .ok_or_else(|| anyhow!("No entities configured"))?,
    };

    expect_success("Connect", dashboard.connect(&entity).await)?;
    if args.boost {
        dashboard.toggle_boost().await;
    }
    if args.emergency {
        dashboard.activate_emergency().await;
    }

    for _ in 0..args.ticks {
        dashboard.tick_connection().await;
        dashboard.tick_stability().await;
    }

    let snapshot = dashboard.snapshot().await;
    dashboard.shutdown().await;

    if ctx.json {
        print_json(&snapshot)
    } else {
        println!("After {} tick(s):", args.ticks);
        print_snapshot(&snapshot);
        Ok(())
    }
}
