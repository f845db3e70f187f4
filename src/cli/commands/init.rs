use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    let created = Config::create_default_if_missing()?;
    println!("{}", init_message(created));
    Ok(())
}

fn init_message(created: bool) -> &'static str {
    if created {
        "✓ Config file created. Edit config.toml and run again."
    } else {
        "✓ config.toml already exists, leaving it untouched."
    }
}
