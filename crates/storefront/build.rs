//! Fingerprints the stylesheet.
//!
//! `main.css` is copied to `static/css/derived/main.<hash>.css` and the hash is
//! exported as `CSS_HASH` so `base.html` can link the fingerprinted file and
//! `/static` can be cached aggressively.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hex characters of the digest kept in the file name.
const HASH_LEN: usize = 8;

fn main() {
    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo"),
    );
    let css_dir = manifest_dir.join("static/css");
    let source = css_dir.join("main.css");

    println!("cargo:rerun-if-changed={}", source.display());

    let Ok(content) = fs::read(&source) else {
        println!("cargo:warning=static/css/main.css missing, stylesheet link will 404");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..HASH_LEN).unwrap_or(&digest);
    println!("cargo:rustc-env=CSS_HASH={hash}");

    write_derived(&css_dir.join("derived"), hash, &content);
}

/// Replace any previous fingerprinted copies with the current one.
fn write_derived(dir: &Path, hash: &str, content: &[u8]) {
    fs::create_dir_all(dir).expect("Failed to create static/css/derived");

    let target = format!("main.{hash}.css");
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with("main.") && name != target.as_str() {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fs::write(dir.join(&target), content).expect("Failed to write fingerprinted stylesheet");
}
