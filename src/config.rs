use std::path::{Path, PathBuf};

use url::Url;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

const USAGE: &str = "usage: http-file-parser [--base-url URL] [--pretty] [--no-check] FILE...";

/// Command line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub files: Vec<PathBuf>,
    /// Joined with path-only targets when checking requests.
    pub base_url: Option<Url>,
    pub pretty: bool,
    /// Build every request through `http` to catch invalid URLs and headers.
    pub check: bool,
}

impl Config {
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config {
            files: Vec::new(),
            base_url: None,
            pretty: false,
            check: true,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--pretty" => config.pretty = true,
                "--no-check" => config.check = false,
                "--base-url" => {
                    let url = args.next().ok_or("--base-url expects a value")?;
                    config.base_url = Some(Url::parse(&url)?);
                }
                "-h" | "--help" => return Err(USAGE.into()),
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown option {flag}\n{USAGE}").into());
                }
                _ => {
                    let path = PathBuf::from(&arg);
                    check_extension(&path)?;
                    config.files.push(path);
                }
            }
        }

        if config.files.is_empty() {
            return Err(USAGE.into());
        }
        Ok(config)
    }
}

fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("http" | "rest") => Ok(()),
        _ => Err(format!("expected file ending to be http or rest: {}", path.display()).into()),
    }
}
