mod config;
mod generate_cmd;
mod pages;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};

use config::{CliOverrides, ServerConfig};

#[derive(Parser)]
#[command(name = "itinera", about = "Personalised travel itinerary generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an itinera config file with a fresh secret key
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Start the web server
    Serve {
        /// Address to bind (overrides ITINERA_BIND and the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides ITINERA_PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Build an itinerary offline and write it as PDF or JSON
    Generate(generate_cmd::GenerateArgs),
}

/// Execute the `itinera init` command: write config file with a random secret.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let secret_key = config::generate_secret();
    let cfg = config::ConfigFile {
        server: config::ServerSection::default(),
        auth: Some(config::AuthSection {
            secret_key: secret_key.clone(),
        }),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  server.bind = {}", cfg.server.bind);
    println!("  server.port = {}", cfg.server.port);
    println!(
        "  auth.secret_key = {}...{}",
        &secret_key[..8],
        &secret_key[56..]
    );
    println!();
    println!("Next: run `itinera serve` to start the web server.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(force)?;
        }
        Commands::Serve { bind, port } => {
            let resolved = ServerConfig::resolve(&CliOverrides {
                bind: bind.as_deref(),
                port,
            })?;
            serve_cmd::run_serve(&resolved).await?;
        }
        Commands::Generate(args) => {
            generate_cmd::run_generate(&args)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_accepts_repeated_attachments() {
        let cli = Cli::try_parse_from([
            "itinera",
            "generate",
            "--start-date",
            "2024-03-01",
            "--end-date",
            "2024-03-03",
            "--attachment",
            "a.txt",
            "--attachment",
            "b.pdf",
            "--json",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate command");
        };
        assert_eq!(args.attachments.len(), 2);
        assert_eq!(args.client_name, "Cliente");
        assert!(args.json);
    }

    #[test]
    fn serve_flags_are_optional() {
        let cli = Cli::try_parse_from(["itinera", "serve", "--port", "8080"]).unwrap();
        let Commands::Serve { bind, port } = cli.command else {
            panic!("expected serve command");
        };
        assert!(bind.is_none());
        assert_eq!(port, Some(8080));
    }

    #[test]
    fn init_writes_config_with_secret() {
        let _lock = test_util::lock_env();
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", dir.path()) };

        cmd_init(false).unwrap();
        let loaded = config::load_config().unwrap();
        let second = cmd_init(false);
        cmd_init(true).unwrap();
        let replaced = config::load_config().unwrap();

        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        let secret = loaded.auth.unwrap().secret_key;
        assert_eq!(secret.len(), 64);
        assert!(second.unwrap_err().to_string().contains("already exists"));
        assert_ne!(replaced.auth.unwrap().secret_key, secret);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dir.path().join("itinera/config.toml"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
