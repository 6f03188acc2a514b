//! Environment Check
//!
//! Verifies that a .env file can be found and that it provides a usable
//! GOOGLE_API_KEY, without starting the server.
//!
//! Usage:
//!   cargo run --bin check_env

use std::env;
use std::path::{Path, PathBuf};

const API_KEY_VAR: &str = "GOOGLE_API_KEY";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ============================================================================
// Helpers
// ============================================================================

fn find_env_file() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from(".env")];
    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        candidates.push(exe_dir.join(".env"));
    }
    candidates.push(PathBuf::from("../.env"));

    candidates.into_iter().find(|p| p.is_file())
}

/// Load a .env file, ignoring a leading UTF-8 BOM. Variables already set
/// in the environment win.
fn load_env(path: &Path) -> Result<usize, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}", e))?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    let count = dotenvy::from_read_iter(bytes)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("{}", e))?
        .len();
    dotenvy::from_read(bytes).map_err(|e| format!("{}", e))?;
    Ok(count)
}

fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

fn print_remediation(dir: &Path) {
    println!("\n🔧 To fix:");
    println!("   1. Create a file named .env in {}", dir.display());
    println!("   2. Add the line: {}=\"YOUR_KEY\"", API_KEY_VAR);
    println!("   3. Get a key at https://aistudio.google.com/app/apikey");
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    println!("🩺 Environment Check");
    println!("====================\n");

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    println!("📂 Working directory: {}", cwd.display());

    match find_env_file() {
        Some(path) => match load_env(&path) {
            Ok(count) => println!("✅ Loaded {} variables from {}", count, path.display()),
            Err(e) => eprintln!("❌ Failed to parse {}: {}", path.display(), e),
        },
        None => eprintln!("⚠️  No .env file found next to the working directory"),
    }

    let key = env::var(API_KEY_VAR)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    match key {
        Some(key) => {
            println!("\n🔑 {} is set", API_KEY_VAR);
            println!("   Value:  {}", mask(&key));
            println!("   Length: {}", key.chars().count());
            if !key.starts_with("AIza") {
                eprintln!("\n⚠️  The key doesn't start with 'AIza'. Make sure it is a Google API key.");
            }
        }
        None => {
            eprintln!("\n❌ {} is not set!", API_KEY_VAR);
            print_remediation(&cwd);
            std::process::exit(1);
        }
    }
}
