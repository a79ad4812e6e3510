use plugin_cli::exec;

#[tokio::main]
async fn main() {
    if let Err(e) = exec().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
