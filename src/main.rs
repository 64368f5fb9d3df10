use clap::Parser;

use retire::api::{App, run};
use retire::logging::init_logging;

#[tokio::main]
async fn main() {
    let app = App::parse();
    init_logging(&app.log_level);

    if let Err(e) = run(app).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
