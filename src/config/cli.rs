//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ServerConfig;

const ABOUT: &str = "Serve a directory of executables over HTTP using CGI";

const LONG_ABOUT: &str = "\
cgiserve is a basic dynamic webserver that hands HTTP requests to executables
on disk using the Common Gateway Interface (CGI).

An executable with the basename qux handles requests for the /qux resource.
An executable with the special basename _ handles requests for / (the
homepage).

An executable answers a request by writing headers (Status, Content-Type,
...) and a blank line, followed by the content, to standard output, and then
exiting. Request details arrive in environment variables with the standard
CGI names (REQUEST_METHOD, QUERY_STRING, ...) and the request body on
standard input.";

#[derive(Debug, Parser)]
#[command(name = "cgiserve", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Directory holding the executables
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// TCP port on which to listen for connections
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// Child processes get a copy of the server's environment variables
    #[arg(long)]
    pub copyenv: bool,

    /// Child processes get exactly these environment variables, given as k0=v0,k1=v1,...
    #[arg(long, value_name = "LIST", default_value = "")]
    pub withenv: String,

    /// Have _ do double duty and also handle any resource that isn't otherwise handled
    #[arg(long)]
    pub wildcard: bool,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            executables_dir: cli.dir,
            port: cli.port,
            copy_env: cli.copyenv,
            with_env: cli.withenv,
            wildcard: cli.wildcard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["cgiserve", "/srv/cgi"]).unwrap();
        let config = ServerConfig::from(cli);

        assert_eq!(config.executables_dir, PathBuf::from("/srv/cgi"));
        assert_eq!(config.port, 80);
        assert!(!config.copy_env);
        assert!(config.with_env.is_empty());
        assert!(!config.wildcard);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "cgiserve",
            "--port",
            "8080",
            "--copyenv",
            "--withenv",
            "A=1,B=2",
            "--wildcard",
            "bin",
        ])
        .unwrap();
        let config = ServerConfig::from(cli);

        assert_eq!(config.port, 8080);
        assert!(config.copy_env);
        assert_eq!(config.with_env, "A=1,B=2");
        assert!(config.wildcard);
    }

    #[test]
    fn test_requires_exactly_one_dir() {
        assert!(Cli::try_parse_from(["cgiserve"]).is_err());
        assert!(Cli::try_parse_from(["cgiserve", "a", "b"]).is_err());
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["cgiserve", "--port", "70000", "bin"]).is_err());
    }
}
