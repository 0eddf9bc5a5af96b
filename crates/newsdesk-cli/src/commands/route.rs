use anyhow::Result;
use colored::Colorize;
use newsdesk_application::AppContext;
use newsdesk_application::router::Navigation;

use super::Output;

pub async fn resolve(ctx: &AppContext, out: &Output, path: &str) -> Result<()> {
    let navigation = ctx.router().navigate(path).await;

    out.emit(&navigation, || match &navigation {
        Navigation::Proceed(route) => {
            println!("{} {}", route.name.to_string().green(), route.title);
            for (name, value) in &route.params {
                println!("  {} = {}", name, value);
            }
        }
        Navigation::Redirect {
            to,
            redirect,
            reason,
        } => {
            let target = match redirect {
                Some(destination) => format!("{} (then {})", to.path(None), destination),
                None => to.path(None),
            };
            println!("{} {} [{}]", "redirect".yellow(), target, reason);
        }
    })
}
