use anyhow::{bail, Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub langs: LangConfig,
}

/// The configured language list the SEO mapper validates against.
///
/// Language codes never come from anywhere else: every per-language map in
/// a request is filtered through this list, and inheritance flags are only
/// meaningful for codes other than `default_code`.
#[derive(Debug, Clone)]
pub struct LangConfig {
    codes: Vec<String>,
    default_code: String,
}

impl LangConfig {
    /// Build a language configuration from a list of codes and the default.
    ///
    /// Fails when the list is empty or the default is not a member.
    pub fn new(codes: Vec<String>, default_code: String) -> Result<Self> {
        if codes.is_empty() {
            bail!("language list must not be empty");
        }
        if !codes.iter().any(|c| *c == default_code) {
            bail!(
                "default language `{}` is not in the configured list {:?}",
                default_code,
                codes
            );
        }
        Ok(Self {
            codes,
            default_code,
        })
    }

    /// Ordered list of configured language codes.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    pub fn is_configured(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default_code == code
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "SEO page metadata store API")]
pub struct Args {
    /// Host to bind to (overrides PAGE_SEO_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PAGE_SEO_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PAGE_SEO_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Comma-separated language codes (overrides PAGE_SEO_LANGS)
    #[arg(long)]
    pub langs: Option<String>,

    /// Default language code (overrides PAGE_SEO_DEFAULT_LANG)
    #[arg(long)]
    pub default_lang: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        Self::from_parts(args)
    }

    fn from_parts(args: Args) -> Result<(Self, bool)> {
        // --- Environment fallback ---
        let env_host = env::var("PAGE_SEO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PAGE_SEO_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PAGE_SEO_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PAGE_SEO_PORT"),
        };
        let env_db = env::var("PAGE_SEO_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/page_seo.db".into());
        let env_langs = env::var("PAGE_SEO_LANGS").unwrap_or_else(|_| "en".into());
        let env_default_lang = env::var("PAGE_SEO_DEFAULT_LANG").unwrap_or_else(|_| "en".into());

        // --- Merge ---
        let langs_raw = args.langs.unwrap_or(env_langs);
        let default_code = args.default_lang.unwrap_or(env_default_lang);
        let codes = parse_lang_list(&langs_raw);
        let langs = LangConfig::new(codes, default_code)
            .with_context(|| format!("invalid language configuration `{}`", langs_raw))?;

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            langs,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated language list, dropping empty segments.
fn parse_lang_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_list_splits_and_trims() {
        let codes = parse_lang_list(" en, it ,,fr ");
        assert_eq!(codes, vec!["en", "it", "fr"]);
    }

    #[test]
    fn default_must_be_configured() {
        let result = LangConfig::new(vec!["en".into(), "it".into()], "fr".into());
        assert!(result.is_err());
    }

    #[test]
    fn empty_list_rejected() {
        assert!(LangConfig::new(vec![], "en".into()).is_err());
    }

    #[test]
    fn lookups() {
        let langs = LangConfig::new(vec!["en".into(), "it".into()], "en".into()).unwrap();
        assert!(langs.is_configured("it"));
        assert!(!langs.is_configured("xx"));
        assert!(langs.is_default("en"));
        assert!(!langs.is_default("it"));
        assert_eq!(langs.codes(), &["en".to_string(), "it".to_string()]);
    }
}
