use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use zstd::bulk::compress as zstd_compress;

#[path = "src/data.rs"]
#[allow(dead_code)]
mod data_model;
use data_model::{ContentStore, SEARCH_CONFIG_VERSION, SearchConfig};

const DATA_COMPRESSION_LEVEL: i32 = 9;

fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    build_content_store(&manifest_dir, &out_dir)?;
    build_search_config(&manifest_dir, &out_dir)?;

    Ok(())
}

fn build_content_store(manifest_dir: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let data_path = manifest_dir.join("data/zorgdata.json");
    println!("cargo:rerun-if-changed={}", data_path.display());
    if !data_path.exists() {
        panic!("Missing {}.", data_path.display());
    }

    let raw = fs::read_to_string(&data_path)?;
    let (store, report) = ContentStore::parse_json(&raw)
        .map_err(|err| format!("Failed to parse {}: {err}", data_path.display()))?;
    for skipped in &report.skipped {
        println!(
            "cargo:warning=skipping {} record {:?}: {}",
            skipped.collection, skipped.key, skipped.reason
        );
    }
    if store.categories.is_empty() {
        panic!("{} defines no categories", data_path.display());
    }
    for category in &store.categories {
        for key in &category.related_definitions {
            if !store.definitions.contains_key(key) {
                println!(
                    "cargo:warning=category {:?} references unknown definition {key:?}",
                    category.id
                );
            }
        }
        for key in &category.related_contacts {
            if !store.contacts.contains_key(key) {
                println!(
                    "cargo:warning=category {:?} references unknown contact {key:?}",
                    category.id
                );
            }
        }
    }

    // Only records that survived validation end up in the embedded blob.
    let canonical = serde_json::to_vec(&store)?;
    let compressed = zstd_compress(&canonical, DATA_COMPRESSION_LEVEL)
        .map_err(|err| format!("Failed to compress dataset: {err}"))?;
    let blob_path = out_dir.join("zorgdata.json.zst");
    fs::write(&blob_path, compressed)?;
    println!("cargo:rustc-env=ZORGKOMPAS_EMBEDDED_DATA={}", blob_path.display());
    Ok(())
}

fn build_search_config(manifest_dir: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let config_path = manifest_dir.join("data/search.json");
    println!("cargo:rerun-if-changed={}", config_path.display());
    if !config_path.exists() {
        panic!("Missing {}.", config_path.display());
    }

    let raw = fs::read_to_string(&config_path)?;
    let config: SearchConfig = serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse {}: {err}", config_path.display()))?;
    if config.version != SEARCH_CONFIG_VERSION {
        panic!(
            "{} has version {}, expected {SEARCH_CONFIG_VERSION}",
            config_path.display(),
            config.version
        );
    }
    Regex::new(&config.citation_pattern)
        .map_err(|err| format!("Invalid citation_pattern in {}: {err}", config_path.display()))?;
    for rule in &config.aliases {
        if rule.alias.trim().is_empty() {
            panic!("{} contains an empty alias", config_path.display());
        }
    }

    let target = out_dir.join("search.json");
    fs::write(&target, serde_json::to_vec(&config)?)?;
    println!("cargo:rustc-env=ZORGKOMPAS_EMBEDDED_SEARCH_CONFIG={}", target.display());
    Ok(())
}
