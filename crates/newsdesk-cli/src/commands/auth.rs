use anyhow::{Result, bail};
use colored::Colorize;
use newsdesk_application::AppContext;
use newsdesk_core::user::LoginRequest;

use super::Output;

pub async fn login(ctx: &AppContext, out: &Output, email: String, password: String) -> Result<()> {
    let user = ctx
        .session()
        .login(LoginRequest { email, password })
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    out.emit(&user, || {
        println!("{} {}", "Signed in as".green(), user.display_name().bold());
    })
}

pub async fn logout(ctx: &AppContext, out: &Output) -> Result<()> {
    ctx.session().logout().await;
    out.success("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext, out: &Output) -> Result<()> {
    let Some(user) = ctx.session().user() else {
        bail!("Not signed in. Run `newsdesk login` first.");
    };

    out.emit(&user, || {
        println!("{} ({})", user.display_name().bold(), user.username);
        if !user.email.is_empty() {
            println!("  email: {}", user.email);
        }
        if user.is_staff || user.is_superuser {
            println!("  {}", "staff".cyan());
        }
        println!("  posts: {}  comments: {}", user.posts_count, user.comments_count);
    })
}
