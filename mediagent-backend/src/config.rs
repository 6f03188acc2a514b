use std::env;
use std::path::{Path, PathBuf};

use crate::ai::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Name of the credential variable the model client needs
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    /// Directory users are told to put their .env file in
    pub env_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let env_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(|key| env::var(key).ok(), env_dir)
    }

    /// Build a config from an arbitrary variable source (the process env in
    /// production, a map in tests)
    pub fn from_lookup<F>(lookup: F, env_dir: PathBuf) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| format!("PORT must be a valid number, got '{}': {}", raw, e))?,
            None => 5000,
        };

        let google_api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let gemini_model = lookup("GEMINI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let gemini_endpoint = lookup("GEMINI_ENDPOINT")
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

        Ok(Self {
            port,
            google_api_key,
            gemini_model,
            gemini_endpoint,
            env_dir,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.google_api_key.is_some()
    }

    /// Remediation text returned to clients when the credential is missing
    pub fn api_key_help(&self) -> String {
        format!(
            "Please create a .env file in {} with: {}=\"YOUR_KEY\"",
            self.env_dir.display(),
            API_KEY_VAR
        )
    }

    /// Log the credential state without ever printing the full key
    pub fn log_credential_status(&self) {
        match &self.google_api_key {
            Some(key) => {
                log::info!("[CONFIG] {} loaded successfully: {}", API_KEY_VAR, mask_secret(key));
                if !looks_like_google_key(key) {
                    log::warn!(
                        "[CONFIG] {} doesn't start with 'AIza'; make sure it is a Google API key",
                        API_KEY_VAR
                    );
                }
            }
            None => {
                log::warn!("[CONFIG] {} not found in environment variables", API_KEY_VAR);
                log::warn!("[CONFIG] {}", self.api_key_help());
            }
        }
    }
}

/// Places a .env file is looked for, in priority order
pub fn env_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(".env")];

    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        candidates.push(exe_dir.join(".env"));
    }

    candidates.push(PathBuf::from("../.env"));
    candidates
}

/// Load the first .env file found. Returns the path that was loaded and how
/// many variables it defined, or the list of paths tried when nothing was found.
///
/// Runs before the logger is initialised so that `RUST_LOG` can come from the
/// file; callers log the outcome.
pub fn load_env_file() -> Result<(PathBuf, usize), Vec<PathBuf>> {
    load_first_env_file(env_file_candidates())
}

fn load_first_env_file(candidates: Vec<PathBuf>) -> Result<(PathBuf, usize), Vec<PathBuf>> {
    for path in &candidates {
        if !path.is_file() {
            continue;
        }
        if let Ok(count) = load_env_from(path) {
            return Ok((path.clone(), count));
        }
    }

    Err(candidates)
}

/// Load a single .env file into the process environment and return the
/// number of entries it holds. Variables that are already set are left
/// untouched.
pub fn load_env_from(path: &Path) -> Result<usize, String> {
    let bytes = read_without_bom(path)?;
    let count = parse_env_entries(path, &bytes)?.len();
    dotenvy::from_read(bytes.as_slice())
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    Ok(count)
}

fn parse_env_entries(path: &Path, bytes: &[u8]) -> Result<Vec<(String, String)>, String> {
    dotenvy::from_read_iter(bytes)
        .map(|entry| entry.map_err(|e| format!("Failed to parse {}: {}", path.display(), e)))
        .collect()
}

/// Windows editors like to prefix UTF-8 files with a BOM, which would
/// otherwise end up glued to the first variable name.
fn read_without_bom(path: &Path) -> Result<Vec<u8>, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_vec(),
        None => bytes,
    })
}

/// Show the first 10 and last 4 characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

pub fn looks_like_google_key(key: &str) -> bool {
    key.starts_with("AIza")
}
