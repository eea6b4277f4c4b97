use std::process::ExitCode;

use pagesieve::DEFAULT_MAX_TIER;

struct ExtractArgs {
    url: String,
    raw: bool,
}

fn print_usage() {
    eprintln!("Usage: pagesieve extract <url> [--raw]");
    eprintln!();
    eprintln!("  extract   Extract the title and body text of a web page");
    eprintln!("  --raw     Print the full result as pretty JSON");
}

fn parse_extract_args(args: impl Iterator<Item = String>) -> Option<ExtractArgs> {
    let mut url = None;
    let mut raw = false;
    for arg in args {
        if arg == "--raw" {
            raw = true;
        } else if arg.starts_with('-') {
            eprintln!("Unknown flag: {arg}");
            return None;
        } else if url.is_none() {
            url = Some(arg);
        } else {
            eprintln!("Unexpected argument: {arg}");
            return None;
        }
    }
    url.map(|url| ExtractArgs { url, raw })
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args();
    args.next(); // program name
    match args.next().as_deref() {
        Some("extract") => {}
        _ => {
            print_usage();
            return ExitCode::FAILURE;
        }
    }
    let Some(extract_args) = parse_extract_args(args) else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let result = pagesieve::extract(&extract_args.url, DEFAULT_MAX_TIER).await;

    if extract_args.raw {
        println!("{}", result.to_json_pretty());
    } else if result.success {
        println!("Title: {}", result.title.as_deref().unwrap_or("None"));
        println!(
            "Method: {}",
            result.fetch_method.map(|m| m.as_str()).unwrap_or("unknown")
        );
        println!("Length: {} chars", result.content_length);
        println!("Time: {}ms", result.elapsed_ms);
        println!();
        println!("{}", result.body.as_deref().unwrap_or(""));
    } else {
        eprintln!(
            "Failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
