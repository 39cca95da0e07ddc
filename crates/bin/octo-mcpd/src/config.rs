use clap::{ArgAction, Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TOOLSETS: &str = "all";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4030";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "octo-mcpd", version, about = "GitHub MCP daemon.")]
#[allow(clippy::struct_excessive_bools)]
struct CliArgs {
    #[arg(long, env = "GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "GITHUB_HOST")]
    host: Option<String>,

    #[arg(
        long,
        env = "GITHUB_TOOLSETS",
        value_delimiter = ',',
        default_value = DEFAULT_TOOLSETS
    )]
    toolsets: Vec<String>,

    #[arg(
        long,
        env = "GITHUB_DYNAMIC_TOOLSETS",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    dynamic_toolsets: bool,

    #[arg(
        long,
        env = "GITHUB_READ_ONLY",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    read_only: bool,

    #[arg(
        long = "stdio",
        env = "OCTO_ENABLE_STDIO",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long = "http",
        env = "OCTO_HTTP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    http_serve: bool,

    #[arg(long, env = "OCTO_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(
        long,
        env = "OCTO_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(long, env = "OCTO_TRANSLATIONS_FILE")]
    translations_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    export_translations: bool,

    #[arg(long, env = "OCTO_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct OctoConfig {
    pub token: String,
    pub host: Option<String>,
    pub toolsets: Vec<String>,
    pub dynamic_toolsets: bool,
    pub read_only: bool,
    pub enable_stdio: bool,
    pub http_serve: bool,
    pub http_addr: SocketAddr,
    pub request_timeout: Option<Duration>,
    pub translations_file: Option<PathBuf>,
    pub export_translations: bool,
    pub log_level: String,
}

impl fmt::Debug for OctoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctoConfig")
            .field("host", &self.host)
            .field("toolsets", &self.toolsets)
            .field("dynamic_toolsets", &self.dynamic_toolsets)
            .field("read_only", &self.read_only)
            .field("enable_stdio", &self.enable_stdio)
            .field("http_serve", &self.http_serve)
            .field("http_addr", &self.http_addr)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl OctoConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for OctoConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let token = args
            .token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        let host = args.host.filter(|value| !value.trim().is_empty());
        let translations_file = args
            .translations_file
            .filter(|path| !path.as_os_str().is_empty());

        if args.export_translations {
            if translations_file.is_none() {
                return Err(ConfigError::MissingSetting("OCTO_TRANSLATIONS_FILE"));
            }
        } else if !args.enable_stdio && !args.http_serve {
            return Err(ConfigError::InvalidSetting {
                name: "OCTO_ENABLE_STDIO",
                value: "false (no transport enabled; set OCTO_HTTP_SERVE=true or OCTO_ENABLE_STDIO=true)"
                    .to_string(),
            });
        }

        let token = match token {
            Some(token) => token,
            None if args.export_translations => String::new(),
            None => return Err(ConfigError::MissingSetting("GITHUB_PERSONAL_ACCESS_TOKEN")),
        };

        let toolsets: Vec<String> = args
            .toolsets
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        if args.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "OCTO_LOG",
                value: args.log_level,
            });
        }

        let request_timeout = if args.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.request_timeout_secs))
        };

        Ok(Self {
            token,
            host,
            toolsets,
            dynamic_toolsets: args.dynamic_toolsets,
            read_only: args.read_only,
            enable_stdio: args.enable_stdio,
            http_serve: args.http_serve,
            http_addr: args.http_addr,
            request_timeout,
            translations_file,
            export_translations: args.export_translations,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            token: Some("ghp_test".to_string()),
            host: None,
            toolsets: vec![DEFAULT_TOOLSETS.to_string()],
            dynamic_toolsets: false,
            read_only: false,
            enable_stdio: true,
            http_serve: false,
            http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            translations_file: None,
            export_translations: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    fn defaults_parse() {
        let config = OctoConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.toolsets, vec!["all"]);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(60)));
        assert!(config.enable_stdio);
        assert!(!config.http_serve);
    }

    #[test]
    fn blank_token_is_missing() {
        let mut args = base_args();
        args.token = Some("   ".to_string());

        let err = OctoConfig::try_from(args).expect_err("blank token must fail");

        assert!(matches!(
            err,
            ConfigError::MissingSetting("GITHUB_PERSONAL_ACCESS_TOKEN")
        ));
    }

    #[test]
    fn a_transport_is_required() {
        let mut args = base_args();
        args.enable_stdio = false;

        let err = OctoConfig::try_from(args).expect_err("no transport must fail");

        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "OCTO_ENABLE_STDIO",
                ..
            }
        ));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let mut args = base_args();
        args.request_timeout_secs = 0;

        let config = OctoConfig::try_from(args).expect("config should parse");

        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn toolset_names_are_trimmed() {
        let mut args = base_args();
        args.toolsets = vec![" repos".to_string(), "issues ".to_string(), String::new()];

        let config = OctoConfig::try_from(args).expect("config should parse");

        assert_eq!(config.toolsets, vec!["repos", "issues"]);
    }

    #[test]
    fn export_needs_a_file_but_no_token() {
        let mut args = base_args();
        args.export_translations = true;
        args.token = None;

        let err = OctoConfig::try_from(args).expect_err("export without a file must fail");
        assert!(matches!(
            err,
            ConfigError::MissingSetting("OCTO_TRANSLATIONS_FILE")
        ));

        let mut args = base_args();
        args.export_translations = true;
        args.token = None;
        args.translations_file = Some(PathBuf::from("octo-mcp-config.json"));

        let config = OctoConfig::try_from(args).expect("export config should parse");
        assert!(config.token.is_empty());
    }

    #[test]
    fn cli_flags_parse() {
        let args = CliArgs::try_parse_from([
            "octo-mcpd",
            "--token",
            "ghp_flag",
            "--toolsets",
            "repos,issues",
            "--read-only",
            "--http",
            "--stdio",
            "no",
        ])
        .expect("flags should parse");

        let config = OctoConfig::try_from(args).expect("config should parse");
        assert_eq!(config.token, "ghp_flag");
        assert_eq!(config.toolsets, vec!["repos", "issues"]);
        assert!(config.read_only);
        assert!(config.http_serve);
        assert!(!config.enable_stdio);
    }
}
