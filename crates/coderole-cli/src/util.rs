use std::path::{Path, PathBuf};

use anyhow::Result;

/// Check that `path` names an existing `.json` file.
pub fn validate_json_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb.extension().and_then(|s| s.to_str()).map(|s| s.to_lowercase());
    if ext.as_deref() != Some("json") {
        anyhow::bail!("File must have a .json extension: {}", path);
    }

    if !pb.is_file() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

pub fn validate_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Directory does not exist: {}", path.display());
    }
    Ok(())
}

/// Print `template` as pretty JSON on stdout, with a notice on stderr.
pub fn print_config_template<T: serde::Serialize>(command: &str, template: &T) -> Result<()> {
    eprintln!(
        "No config file provided. Printing a template configuration for `coderole {}`; \
         save it to a file, adjust it and pass its path as the first argument.",
        command
    );
    println!("{}", serde_json::to_string_pretty(template)?);
    Ok(())
}
