use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use molt::app::App;
use molt::config::Config;
use molt::error::AppResult;
use molt::gateway::{HttpTransport, RequestGateway};
use molt::notify::LogNotifier;
use molt::page::MemoryPage;

struct CliArgs {
    base_url: String,
}

fn parse_cli(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let _program = args.next();
    let base_url = args.next().ok_or_else(usage)?;
    if base_url == "-h" || base_url == "--help" {
        return Err(usage());
    }
    if args.next().is_some() {
        return Err(usage());
    }
    Ok(CliArgs { base_url })
}

fn usage() -> String {
    "usage: molt <base-url>".to_string()
}

async fn run(args: CliArgs) -> AppResult<()> {
    let config = Config::load()?;

    let transport = HttpTransport::new(Duration::from_millis(config.gateway.request_timeout_ms))?;
    let mut gateway = RequestGateway::spawn(
        &args.base_url,
        config.gateway.worker_threads,
        Arc::new(transport),
    )?;

    let mut surface = MemoryPage::new();
    let mut notifier = LogNotifier;
    let mut app = App::new(config)?;
    app.run(&mut surface, &mut notifier, &mut gateway).await
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_cli(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("molt: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_cli;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parse_cli_takes_exactly_one_base_url() {
        let parsed = parse_cli(args(&["molt", "http://localhost:8000"]))
            .expect("one argument should parse");
        assert_eq!(parsed.base_url, "http://localhost:8000");
    }

    #[test]
    fn parse_cli_rejects_missing_or_extra_arguments() {
        assert!(parse_cli(args(&["molt"])).is_err());
        assert!(parse_cli(args(&["molt", "http://a", "http://b"])).is_err());
        assert!(parse_cli(args(&["molt", "--help"])).is_err());
    }
}
