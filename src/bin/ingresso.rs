use anyhow::Result;
use ingresso::cli::{actions, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (globals, action) = start()?;

    // Handle the action
    actions::session::handle(action, &globals).await?;

    Ok(())
}
