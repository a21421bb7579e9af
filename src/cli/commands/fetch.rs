//! Fetch command - route one request through the active worker
//!
//! Status line and headers go to stderr, the body to stdout (or a file).

use crate::cli::args::FetchArgs;
use crate::cli::Host;
use crate::config::Config;
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::request::resolve_url;
use crate::http::{Request, RequestMode, Response};
use console::style;
use std::io::Write;
use tokio::fs;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ShellCacheResult<()> {
    let host = Host::new(config);
    let registration = host.registration().await?;

    let request = build_request(&args, &config.network.origin);
    let response = registration.handle_fetch(&request).await?;
    host.persist(&registration).await?;

    print_head(&response);
    match args.output {
        Some(path) => fs::write(&path, &response.body)
            .await
            .map_err(|e| ShellCacheError::io(format!("writing {}", path.display()), e))?,
        None => std::io::stdout()
            .write_all(&response.body)
            .map_err(|e| ShellCacheError::io("writing response body", e))?,
    }

    Ok(())
}

fn build_request(args: &FetchArgs, origin: &str) -> Request {
    let url = resolve_url(origin, &args.url);
    let mut request = if args.navigate {
        Request::navigate(url)
    } else {
        Request::get(url).with_mode(RequestMode::SameOrigin)
    }
    .with_method(&args.method);

    if let Some(ref accept) = args.accept {
        request.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("accept"));
        request = request.with_header("Accept", accept.as_str());
    }
    for (name, value) in &args.headers {
        request = request.with_header(name.as_str(), value.as_str());
    }
    request
}

fn print_head(response: &Response) {
    let status = format!("{} {}", response.status, response.status_text);
    let status = if response.is_ok() {
        style(status).green()
    } else {
        style(status).yellow()
    };
    eprintln!("{}", status.bold());
    for (name, value) in &response.headers {
        eprintln!("{}: {}", style(name).dim(), value);
    }
    eprintln!();
}
