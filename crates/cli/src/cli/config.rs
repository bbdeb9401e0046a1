use wl_domain::config::{Config, ConfigIssue, ConfigSeverity};

/// Validate the config and print any issues.
///
/// Returns `false` when at least one error was found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    let (errors, warnings) = count(&issues);
    println!("\n{errors} error(s), {warnings} warning(s) in {config_path}");

    errors == 0
}

fn count(issues: &[ConfigIssue]) -> (usize, usize) {
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    (errors, issues.len() - errors)
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config)?;
    print!("{output}");
    Ok(())
}
