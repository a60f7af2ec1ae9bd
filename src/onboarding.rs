use crate::config::Config;
use colored::*;
use std::fs;
use std::io;
use std::path::Path;

/// Run startup checks so misconfiguration is reported before the TUI takes the screen
pub fn run_onboarding_checks(config: &Config) -> Result<(), OnboardingError> {
    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}", "  SignalForge Dashboard - Initialization".bright_cyan().bold());
    println!("{}", "=".repeat(60).bright_cyan());
    println!();

    check_api_url(&config.api_url)?;
    check_export_dir(&config.export_dir)?;

    println!("{}", "✓ All configuration checks passed!".green().bold());
    println!();

    Ok(())
}

fn check_api_url(api_url: &str) -> Result<(), OnboardingError> {
    let parsed = url::Url::parse(api_url)
        .map_err(|_| OnboardingError::InvalidApiUrl(api_url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(OnboardingError::InvalidApiUrl(api_url.to_string()));
    }
    println!("{} Backend: {}", "✓".green(), api_url);
    Ok(())
}

fn check_export_dir(dir: &Path) -> Result<(), OnboardingError> {
    let probe = dir.join(".signalforge-write-test");
    let result = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe);

    match result {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            println!("{} Export directory writable: {}", "✓".green(), dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(OnboardingError::ExportDirPermissionDenied(dir.display().to_string()))
        }
        Err(e) => Err(OnboardingError::ExportDirError(dir.display().to_string(), e.to_string())),
    }
}

#[derive(Debug)]
pub enum OnboardingError {
    InvalidApiUrl(String),
    ExportDirPermissionDenied(String),
    ExportDirError(String, String),
}

impl std::fmt::Display for OnboardingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnboardingError::InvalidApiUrl(raw) => {
                writeln!(f)?;
                writeln!(f, "{}", "[!] CONFIGURATION ERROR: Invalid Backend URL".red().bold())?;
                writeln!(f, "{}", "-".repeat(60).red())?;
                writeln!(f, "'{}' is not a usable http(s) URL.", raw.yellow())?;
                writeln!(f)?;
                writeln!(f, "{}", ">> ACTION REQUIRED:".yellow().bold())?;
                writeln!(f, "1. Open the {} file in the project root folder.", "'.env'".cyan())?;
                writeln!(f, "2. Point the dashboard at your SignalForge backend:")?;
                writeln!(f, "   {}", "SIGNALFORGE_API_URL=http://127.0.0.1:5000".cyan())?;
                writeln!(f)?;
                writeln!(f, "{}", "TIP: You can copy '.env.example' as a template!".yellow())?;
                writeln!(f, "{}", "-".repeat(60).red())?;
                Ok(())
            }
            OnboardingError::ExportDirPermissionDenied(dir) => {
                writeln!(f)?;
                writeln!(f, "{}", "[!] SYSTEM ERROR: Export Directory Not Writable".red().bold())?;
                writeln!(f, "{}", "-".repeat(60).red())?;
                writeln!(f, "History exports cannot be written to '{}'.", dir.yellow())?;
                writeln!(f)?;
                writeln!(f, "{}", ">> TRY:".yellow().bold())?;
                writeln!(f, "- On Linux/Mac: Run {}", format!("chmod +w {}", dir).cyan())?;
                writeln!(f, "- Set SIGNALFORGE_EXPORT_DIR in .env to a writable location")?;
                writeln!(f, "{}", "-".repeat(60).red())?;
                Ok(())
            }
            OnboardingError::ExportDirError(dir, err) => {
                writeln!(f)?;
                writeln!(f, "{}", "[!] EXPORT DIRECTORY ERROR".red().bold())?;
                writeln!(f, "{}", "-".repeat(60).red())?;
                writeln!(f, "Directory: {}", dir.yellow())?;
                writeln!(f, "Error: {}", err)?;
                writeln!(f, "{}", "-".repeat(60).red())?;
                Ok(())
            }
        }
    }
}

impl std::error::Error for OnboardingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_check() {
        assert!(check_api_url("http://127.0.0.1:5000").is_ok());
        assert!(check_api_url("https://bot.example.com/").is_ok());
        assert!(matches!(
            check_api_url("ftp://bot.example.com"),
            Err(OnboardingError::InvalidApiUrl(_))
        ));
        assert!(check_api_url("localhost:5000").is_err());
    }

    #[test]
    fn test_export_dir_check() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_export_dir(dir.path()).is_ok());
        assert!(!dir.path().join(".signalforge-write-test").exists());

        let missing = dir.path().join("missing");
        assert!(matches!(
            check_export_dir(&missing),
            Err(OnboardingError::ExportDirError(_, _))
        ));
    }
}
