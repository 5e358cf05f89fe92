use std::env;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

const DEFAULT_PAYLOAD: &str = "payload/legacy-cli";
const DEFAULT_VERSION_FILE: &str = "payload/VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed=LBR_LEGACY_PAYLOAD");
    println!("cargo:rerun-if-env-changed=LBR_LEGACY_VERSION");
    println!("cargo:rerun-if-changed=config/default.toml");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));

    let payload_path = env::var("LBR_LEGACY_PAYLOAD")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join(DEFAULT_PAYLOAD));
    println!("cargo:rerun-if-changed={}", payload_path.display());

    let payload = fs::read(&payload_path)
        .unwrap_or_else(|e| panic!("cannot read payload {}: {}", payload_path.display(), e));
    let hash = hex::encode(Sha256::digest(&payload));

    fs::write(out_dir.join("legacy-payload"), &payload).expect("write payload copy");
    println!("cargo:rustc-env=LBR_PAYLOAD_SHA256={}", hash);

    let version = match env::var("LBR_LEGACY_VERSION") {
        Ok(v) => v,
        Err(_) => {
            let version_path = manifest_dir.join(DEFAULT_VERSION_FILE);
            println!("cargo:rerun-if-changed={}", version_path.display());
            fs::read_to_string(&version_path)
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| "0.0.0".to_string())
        }
    };
    println!("cargo:rustc-env=LBR_LEGACY_VERSION={}", version);
}
