use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8001/planning/pdf";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Which request body the scheduling service is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RequestContract {
    /// Per-unit attribute lists and active days.
    #[default]
    Grid,
    /// Unit counts with min/max ranges, no day selection.
    Statistics,
}

#[derive(Parser, Debug)]
#[command(name = "eduflex", about = "Weekly timetable client for the EduFlex scheduling service")]
pub struct Cli {
    /// Default log filter; RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the timetable form over HTTP.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Submit a saved form once and write the result to disk.
    Submit {
        /// JSON file with the time window, days, teachers, classes and rooms.
        #[arg(long)]
        form: PathBuf,

        /// Where to write the document or the rendered timetable.
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Endpoint of the scheduling service.
    #[arg(long, env = "EDUFLEX_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Give up on a submission after this many seconds.
    #[arg(long, env = "EDUFLEX_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = RequestContract::Grid)]
    pub contract: RequestContract,
}

/// Resolved settings for talking to the scheduling service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub url: String,
    pub timeout: Duration,
    pub contract: RequestContract,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            timeout: Duration::from_secs(120),
            contract: RequestContract::Grid,
        }
    }
}

impl From<ServiceArgs> for ServiceConfig {
    fn from(args: ServiceArgs) -> Self {
        Self {
            url: args.service_url,
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
            contract: args.contract,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_uses_defaults() {
        let cli = Cli::try_parse_from(["eduflex", "serve"]).unwrap();
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Serve { bind, service } => {
                assert_eq!(bind.to_string(), DEFAULT_BIND);
                assert_eq!(service.contract, RequestContract::Grid);
                assert_eq!(service.timeout_secs, 120);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn submit_takes_service_overrides() {
        let cli = Cli::try_parse_from([
            "eduflex",
            "submit",
            "--form",
            "form.json",
            "--service-url",
            "http://scheduler.local/planning",
            "--timeout-secs",
            "0",
            "--contract",
            "statistics",
        ])
        .unwrap();
        let Command::Submit { form, output, service } = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(form, PathBuf::from("form.json"));
        assert!(output.is_none());

        let config = ServiceConfig::from(service);
        assert_eq!(config.url, "http://scheduler.local/planning");
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.contract, RequestContract::Statistics);
    }
}
