use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Token Registry — metadata and image hosting for NFT-style tokens
#[derive(Parser)]
#[command(name = "token-registry", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the registry server
    Serve {
        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for uploaded images (overrides TOKEN_STORAGE_ROOT)
        #[arg(long)]
        storage_root: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_serves_with_config() {
        let cli = Cli::try_parse_from(["token-registry"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "token-registry",
            "serve",
            "--port",
            "9090",
            "--storage-root",
            "/srv/tokens",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Serve { port, storage_root }) => {
                assert_eq!(port, Some(9090));
                assert_eq!(storage_root, Some(PathBuf::from("/srv/tokens")));
            }
            None => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_serve_rejects_bad_port() {
        assert!(Cli::try_parse_from(["token-registry", "serve", "--port", "http"]).is_err());
    }
}
