//! Placard local TUI entry point.

use placard_tui::Runtime;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::new()?;
    Ok(runtime.run().await?)
}
