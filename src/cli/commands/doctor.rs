//! Doctor command - verify configuration and environment.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::Settings;
use crate::speech::validate_language;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks. Returns an error when any check fails.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Papercast Doctor");
    println!();
    println!("Checking configuration and environment...\n");

    let mut checks = Vec::new();

    println!("{}", style("Language Model").bold());
    let llm_checks = vec![
        check_api_key(&settings.llm.api_key_env),
        CheckResult::ok("Endpoint", &format!("{} ({})", settings.llm.api_base, settings.llm.model)),
    ];
    for check in &llm_checks {
        check.print();
    }
    checks.extend(llm_checks);

    println!();

    println!("{}", style("Speech").bold());
    let speech_check = check_language(&settings.speech.default_language);
    speech_check.print();
    checks.push(speech_check);

    println!();

    println!("{}", style("Directories").bold());
    let dir_checks = vec![
        check_directory("Upload directory", &settings.upload_dir()),
        check_directory("Audio directory", &settings.audio_dir()),
    ];
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before starting the server.",
            errors
        ));
        anyhow::bail!("{} doctor check(s) failed", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Papercast is ready to serve.");
    }

    Ok(())
}

/// Check that the language model API key is present.
fn check_api_key(var: &str) -> CheckResult {
    match std::env::var(var) {
        Ok(key) if key.trim().is_empty() => {
            CheckResult::error(var, "empty", &format!("Set with: export {}='...'", var))
        }
        Ok(key) => CheckResult::ok(var, &format!("configured ({})", mask_key(&key))),
        Err(_) => CheckResult::error(var, "not set", &format!("Set with: export {}='...'", var)),
    }
}

/// Show only the edges of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_language(code: &str) -> CheckResult {
    match validate_language(code) {
        Ok(()) => CheckResult::ok("Default language", code),
        Err(e) => CheckResult::error(
            "Default language",
            &e.to_string(),
            "Set speech.default_language to a supported code such as \"en\"",
        ),
    }
}

fn check_directory(name: &str, dir: &Path) -> CheckResult {
    if !dir.exists() {
        return CheckResult::warning(
            name,
            &format!("{} (will be created)", dir.display()),
            "Directory will be created when the server starts",
        );
    }

    let usage: u64 = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|e| e.metadata().ok())
                .filter(|m| m.is_file())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0);

    CheckResult::ok(name, &format!("{} ({})", dir.display(), format_size(usage)))
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: papercast config init",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("csk-1234567890abcdef"), "csk-...cdef");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_check_language() {
        assert_eq!(check_language("en").status, CheckStatus::Ok);
        assert_eq!(check_language("zz").status, CheckStatus::Error);
    }

    #[test]
    fn test_missing_directory_warns() {
        let result = check_directory("Uploads", Path::new("/no/such/papercast/dir"));
        assert_eq!(result.status, CheckStatus::Warning);
    }
}
