mod config;

use std::path::Path;

use config::Config;
use futures_util::future::try_join_all;
use http_file_parser::{parse_all, RequestDescriptor};
use log::{debug, info};
use serde::Serialize;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Serialize)]
struct FileReport {
    file: String,
    requests: Vec<RequestDescriptor>,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = Config::from_args(std::env::args().skip(1))?;

    let contents = try_join_all(config.files.iter().map(|path| async move {
        tokio::fs::read(path)
            .await
            .map_err(|err| format!("{}: {err}", path.display()))
    }))
    .await?;

    let mut reports = Vec::new();
    for (path, content) in config.files.iter().zip(contents) {
        reports.push(report(&config, path, &content)?);
    }

    let output = if config.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{output}");

    Ok(())
}

fn report(config: &Config, path: &Path, content: &[u8]) -> Result<FileReport> {
    let requests = parse_all(content).map_err(|err| format!("{}: {err}", path.display()))?;
    info!("{}: {} requests", path.display(), requests.len());

    if config.check {
        for request in &requests {
            let built = request
                .to_request(config.base_url.as_ref())
                .map_err(|err| format!("{}: {err}", path.display()))?;
            debug!("{} {}", built.method(), built.uri());
        }
    }

    Ok(FileReport {
        file: path.display().to_string(),
        requests,
    })
}
