use anyhow::{Result, anyhow};
use colored::Colorize;
use newsdesk_application::AppContext;
use newsdesk_core::post::{AuthorRef, Post, PostQuery};

use super::Output;

pub struct ListArgs {
    pub page: u32,
    pub search: Option<String>,
    pub category: Option<i64>,
    pub ordering: Option<String>,
    pub mine: bool,
}

pub async fn list(ctx: &AppContext, out: &Output, args: ListArgs) -> Result<()> {
    let fetched = if args.mine {
        ctx.posts()
            .fetch_my_posts(vec![("page".to_string(), args.page.to_string())])
            .await
    } else {
        ctx.posts()
            .fetch_posts(PostQuery {
                search: args.search,
                category: args.category.map(Some),
                ordering: args.ordering,
                page: Some(args.page),
                ..PostQuery::default()
            })
            .await
    };
    let page = fetched.map_err(|e| anyhow!(e.user_message()))?;

    out.emit(&page, || {
        if page.results.is_empty() {
            println!("{}", "No posts.".dimmed());
            return;
        }
        for post in &page.results {
            print_summary(post);
        }
        println!("{}", format!("page {} · {} posts total", args.page, page.count).dimmed());
    })
}

pub async fn show(ctx: &AppContext, out: &Output, slug: &str) -> Result<()> {
    let post = ctx
        .posts()
        .fetch_post_by_slug(slug)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    out.emit(&post, || {
        println!("{}", post.title.bold());
        println!(
            "{}",
            format!(
                "by {} · {} · {} views · {} comments",
                author_name(&post),
                post.created_at.format("%Y-%m-%d"),
                post.views_count,
                post.comments_count
            )
            .dimmed()
        );
        if let Some(category) = &post.category_info {
            println!("{}", format!("in {}", category.name).cyan());
        }
        if ctx.session().can_edit_post(&post) {
            println!("{}", "(you can edit this post)".dimmed());
        }
        println!();
        println!("{}", post.content);
    })
}

fn print_summary(post: &Post) {
    let status = if post.is_published() {
        String::new()
    } else {
        format!(" [{}]", post.status).yellow().to_string()
    };
    println!("{}{}", post.title.bold(), status);
    println!(
        "  {}",
        format!("/posts/{} · {} · {} views", post.slug, author_name(post), post.views_count)
            .dimmed()
    );
}

fn author_name(post: &Post) -> String {
    match (&post.author_info, &post.author) {
        (Some(info), _) => info.username.clone(),
        (None, AuthorRef::Username(name)) => name.clone(),
        (None, AuthorRef::Id(id)) => format!("user #{}", id),
    }
}
