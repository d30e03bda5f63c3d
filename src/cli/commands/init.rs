use std::path::Path;

use crate::config::Config;

pub fn cmd_init(path: Option<&Path>) -> anyhow::Result<()> {
    let default_path = Config::default_config_path();
    let path = path.unwrap_or(&default_path);

    if Config::create_default_if_missing(path)? {
        println!("✓ Wrote {}", path.display());
        println!("  A random signing secret was generated for you.");
    } else {
        println!("{} already exists, leaving it untouched.", path.display());
    }

    Ok(())
}
