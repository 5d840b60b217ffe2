use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BUCKET: &str = "certificates-ignite-2022";
pub const DEFAULT_LOCAL_DEBUG_OUTPUT: &str = "./certificate.pdf";

/// Chromium flags used on the managed runtime, where the browser runs inside a
/// locked-down sandbox without a GPU or zygote process.
pub const MANAGED_CHROME_ARGS: &[&str] = &[
    "--allow-running-insecure-content",
    "--autoplay-policy=user-gesture-required",
    "--disable-component-update",
    "--disable-domain-reliability",
    "--disable-features=AudioServiceOutOfProcess,IsolateOrigins,site-per-process",
    "--disable-print-preview",
    "--disable-setuid-sandbox",
    "--disable-site-isolation-trials",
    "--disable-speech-api",
    "--disable-web-security",
    "--disk-cache-size=33554432",
    "--enable-features=SharedArrayBuffer",
    "--hide-scrollbars",
    "--ignore-gpu-blocklist",
    "--in-process-gpu",
    "--mute-audio",
    "--no-default-browser-check",
    "--no-pings",
    "--no-sandbox",
    "--no-zygote",
    "--use-gl=swiftshader",
    "--window-size=1920,1080",
    "--single-process",
];

/// 渲染引擎启动配置
///
/// 启动时根据环境一次性解析，注入到渲染组件中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchProfile {
    pub sandbox_args: Vec<String>,
    pub headless: bool,
    pub ignore_https_errors: bool,
    pub local_debug_output: Option<PathBuf>,
}

impl LaunchProfile {
    /// Local development: bare browser, forced headless, PDF copy written to disk.
    pub fn offline(debug_output: impl Into<PathBuf>) -> Self {
        Self {
            sandbox_args: Vec::new(),
            headless: true,
            ignore_https_errors: false,
            local_debug_output: Some(debug_output.into()),
        }
    }

    pub fn managed() -> Self {
        Self {
            sandbox_args: MANAGED_CHROME_ARGS.iter().map(|arg| arg.to_string()).collect(),
            headless: true,
            ignore_https_errors: true,
            local_debug_output: None,
        }
    }

    pub fn resolve(is_offline: bool, debug_output: impl Into<PathBuf>) -> Self {
        if is_offline {
            Self::offline(debug_output)
        } else {
            Self::managed()
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub bucket: String,
    pub public_base_url: String,
    pub artifact_extension: String,
    pub templates_dir: PathBuf,
    pub chrome_executable: Option<PathBuf>,
    pub is_offline: bool,
    pub lambda_runtime: bool,
    pub launch: LaunchProfile,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env early so process env reads pick it up.
        let _ = dotenvy::dotenv();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL is required"))?;
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let bucket = env::var("CERTIFICATE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| default_public_base_url(&bucket));
        let artifact_extension = parse_extension(
            env::var("ARTIFACT_EXTENSION").ok().as_deref(),
        )?;

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("templates"));
        let chrome_executable = env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from);

        let is_offline = env_bool("IS_OFFLINE", false);
        let debug_output = env::var("LOCAL_DEBUG_OUTPUT")
            .unwrap_or_else(|_| DEFAULT_LOCAL_DEBUG_OUTPUT.to_string());
        let launch = LaunchProfile::resolve(is_offline, debug_output);

        let lambda_runtime = env::var("AWS_LAMBDA_RUNTIME_API").is_ok();

        Ok(Self {
            database_url,
            listen_addr,
            bucket,
            public_base_url,
            artifact_extension,
            templates_dir,
            chrome_executable,
            is_offline,
            lambda_runtime,
            launch,
        })
    }
}

pub fn default_public_base_url(bucket: &str) -> String {
    format!("https://{}.s3.amazonaws.com", bucket)
}

fn env_bool(key: &str, default: bool) -> bool {
    parse_bool(env::var(key).ok().as_deref(), default)
}

/// Any non-empty value enables the flag unless it spells out a false value.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some(value) => {
            !value.is_empty()
                && !matches!(
                    value.to_ascii_lowercase().as_str(),
                    "0" | "false" | "no" | "n" | "off"
                )
        }
        None => default,
    }
}

fn parse_extension(raw: Option<&str>) -> Result<String> {
    let Some(raw) = raw else {
        return Ok("pdf".to_string());
    };
    let ext = raw.trim().trim_start_matches('.');
    if ext.is_empty() {
        return Err(anyhow!("ARTIFACT_EXTENSION must not be empty"));
    }
    Ok(ext.to_string())
}
