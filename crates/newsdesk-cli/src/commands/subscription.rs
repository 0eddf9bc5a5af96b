use anyhow::{Result, anyhow};
use colored::Colorize;
use newsdesk_application::AppContext;

use super::Output;

pub async fn status(ctx: &AppContext, out: &Output) -> Result<()> {
    let store = ctx.subscription();
    let status = store
        .fetch_subscription_status()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    let snapshot = store.snapshot().await;
    out.emit(&status, || {
        match &snapshot.subscription {
            None => println!("{}", "No subscription.".dimmed()),
            Some(subscription) => {
                let plan = snapshot
                    .plan_info()
                    .map(|plan| plan.name.clone())
                    .unwrap_or_else(|| format!("plan #{}", subscription.plan));
                let state = if snapshot.is_active() {
                    subscription.status.to_string().green()
                } else {
                    subscription.status.to_string().yellow()
                };
                println!("{} ({})", plan.bold(), state);
                println!(
                    "  ends {} · {} days left",
                    subscription.end_date.format("%Y-%m-%d"),
                    snapshot.days_remaining()
                );
            }
        }
        match snapshot.pinned_post_info() {
            Some(post) => println!("Pinned: {} (/posts/{})", post.title.bold(), post.slug),
            None if snapshot.can_pin_posts() => println!("{}", "Nothing pinned.".dimmed()),
            None => {}
        }
    })
}

pub async fn pin(ctx: &AppContext, out: &Output, post_id: i64) -> Result<()> {
    let pinned = ctx
        .subscription()
        .pin_post(post_id)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    out.emit(&pinned, || {
        println!("{} {}", "Pinned post".green(), pinned.post);
    })
}

pub async fn unpin(ctx: &AppContext, out: &Output) -> Result<()> {
    ctx.subscription()
        .unpin_post()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    out.success("Post unpinned");
    Ok(())
}
