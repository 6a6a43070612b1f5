use anyhow::Result;
use url::Url;

use crate::api;
use crate::cli::{actions::Action, globals::GlobalArgs};

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Fail fast on an unparseable DSN instead of at pool creation.
            let dsn = Url::parse(&dsn)?;

            api::new(port, dsn.to_string(), globals).await?;
        }
    }

    Ok(())
}
