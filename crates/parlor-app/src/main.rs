use tracing::info;

use parlor_app::App;
use parlor_app::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parlor_app::init_tracing();

    let config = AppConfig::from_env()?;
    let app = App::bootstrap(config)?;

    match app.session().current() {
        Some(account) => info!("Signed in as {}", account.username),
        None => info!("No active session"),
    }

    let summary = app.summary();
    info!(
        accounts = summary.accounts,
        posts = summary.posts,
        comments = summary.comments,
        messages = summary.messages,
        groups = summary.groups,
        "Parlor storage ready"
    );

    Ok(())
}
