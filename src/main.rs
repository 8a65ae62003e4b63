// src/main.rs

use vscode_test_cli::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("vscode-test: {err:?}");
    }

    let code = match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err.render());
            1
        }
    };
    std::process::exit(code);
}
