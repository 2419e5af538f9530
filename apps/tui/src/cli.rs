use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ipgeo_tui", version, about = "IP geolocation dashboard")]
pub struct CliArgs {
    /// Print the current record and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Base URL of the lookup server
    #[arg(long = "api-base", value_name = "URL")]
    pub api_base: Option<String>,

    /// JSON file holding the record to show at startup (`-` for stdin)
    #[arg(long, value_name = "PATH")]
    pub record: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout-secs", value_name = "N")]
    pub timeout_secs: Option<u64>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(base) = &self.api_base {
            std::env::set_var("IPGEO_API_BASE", base);
        }
        if let Some(record) = &self.record {
            std::env::set_var("IPGEO_RECORD", record);
        }
        if let Some(secs) = self.timeout_secs {
            std::env::set_var("IPGEO_HTTP_TIMEOUT", secs.to_string());
        }
        if self.debug {
            std::env::set_var("RUST_LOG", "debug");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::parse_from([
            "ipgeo_tui",
            "--headless",
            "--json",
            "--api-base",
            "http://lookup.local:8080",
            "--record",
            "-",
            "--timeout-secs",
            "3",
        ]);

        assert!(args.headless);
        assert!(args.json);
        assert!(!args.debug);
        assert_eq!(args.api_base.as_deref(), Some("http://lookup.local:8080"));
        assert_eq!(args.record.as_deref(), Some("-"));
        assert_eq!(args.timeout_secs, Some(3));
    }

    #[test]
    fn flags_are_optional() {
        let args = CliArgs::parse_from(["ipgeo_tui"]);

        assert!(!args.headless);
        assert_eq!(args.api_base, None);
        assert_eq!(args.record, None);
        assert_eq!(args.timeout_secs, None);
    }
}
