use clap::Parser;
use image_csv::cli::{error_report, Cli};
use image_csv::EngineConfig;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match cli.run(EngineConfig::from_env()).await {
        Ok(summary) => println!(
            "Successfully exported {} images to {}",
            summary.images,
            summary.path.display()
        ),
        Err(err) => {
            eprint!("{}", error_report(&err));
            process::exit(1);
        }
    }
}
