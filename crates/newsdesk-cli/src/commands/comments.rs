use anyhow::{Result, anyhow};
use colored::Colorize;
use newsdesk_application::AppContext;
use newsdesk_core::comment::{CommentThread, Completeness};

use super::Output;

pub async fn show(ctx: &AppContext, out: &Output, post_id: i64, full: bool) -> Result<()> {
    let comments = ctx.comments();
    comments
        .fetch_post_comments(post_id)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    let roots = comments.top_level_comments().await;
    if full {
        let ids: Vec<i64> = roots
            .iter()
            .filter(|c| c.replies_count > 0)
            .map(|c| c.id)
            .collect();
        for (id, outcome) in comments.preload_replies(&ids).await {
            if let Err(e) = outcome {
                tracing::warn!("Replies of comment {} unavailable: {}", id, e);
            }
        }
    }

    let mut threads = Vec::with_capacity(roots.len());
    for root in &roots {
        threads.push(comments.comment_thread(root.id).await);
    }

    if out.is_json() {
        println!("{}", serde_json::to_string_pretty(&threads)?);
        return Ok(());
    }

    if threads.is_empty() {
        println!("{}", "No comments yet.".dimmed());
        return Ok(());
    }
    for thread in &threads {
        print_thread(ctx, thread).await;
    }
    println!(
        "{}",
        format!(
            "{} comments, {} replies",
            comments.total_comments_count().await,
            comments.replies_count().await
        )
        .dimmed()
    );
    Ok(())
}

async fn print_thread(ctx: &AppContext, thread: &CommentThread) {
    for comment in &thread.comments {
        let depth = ctx.comments().comment_depth(comment).await;
        let indent = "  ".repeat(depth);
        let author = comment
            .author_info
            .as_ref()
            .map(|info| info.username.clone())
            .unwrap_or_else(|| format!("user #{}", comment.author));
        let content = if comment.is_active {
            comment.content.normal()
        } else {
            comment.content.dimmed()
        };
        println!(
            "{}{} {}",
            indent,
            author.bold(),
            comment.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        println!("{}  {}", indent, content);
    }

    if let Completeness::Partial { missing_replies } = &thread.completeness {
        println!(
            "{}",
            format!(
                "  … {} comment(s) have replies not loaded, use --full",
                missing_replies.len()
            )
            .yellow()
        );
    }
}
