use console::style;
use log::info;
use sandbox_idmap::{process_file, DefaultMapping, HostIdConfig};
use std::path::Path;

use crate::report::{render_json, render_table};

pub fn show_default_mapping(config: &HostIdConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Reading default allocation for '{}'", config.user);
    let mapping = DefaultMapping::detect(config)?;

    println!("Your current default allocation is:\n");
    for line in mapping.describe() {
        println!("{}", line);
    }
    Ok(())
}

pub fn show_file_mappings(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = process_file(path)
        .map_err(|e| format!("processing {}: {}", path.display(), e))?;

    if json {
        println!("{}", render_json(&records)?);
    } else {
        print!("{}", render_table(&records));
        println!(
            "{} sandboxes, host ranges are {}",
            style(records.len()).bold(),
            style("end-exclusive").dim()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn show_file_mappings_accepts_valid_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("boxes.txt");
        fs::write(&path, "c1 0:100000:65536\nc1/c2 0:1000:1000\n").unwrap();

        assert!(show_file_mappings(&path, false).is_ok());
        assert!(show_file_mappings(&path, true).is_ok());
    }

    #[test]
    fn show_file_mappings_reports_file_and_line() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("boxes.txt");
        fs::write(&path, "c1/c2 0:1000:1000\nc1 0:100000:65536\n").unwrap();

        let err = show_file_mappings(&path, false).unwrap_err().to_string();
        assert!(err.contains("boxes.txt"));
        assert!(err.contains("line 1"));
        assert!(err.contains("'c1' of sandbox 'c1/c2' is not defined"));
    }

    #[test]
    fn show_default_mapping_uses_fallback_without_files() {
        let tmp = tempdir().unwrap();
        let config = HostIdConfig {
            user: "root".to_string(),
            subuid_path: tmp.path().join("subuid"),
            subgid_path: tmp.path().join("subgid"),
        };
        assert!(show_default_mapping(&config).is_ok());
    }
}
