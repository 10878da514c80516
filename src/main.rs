use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fence-collapse",
    version,
    about = "Remove empty fenced code blocks from a Markdown file",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(
        help = "Markdown file to rewrite (defaults to the configured target)",
        long_help = "Markdown file to rewrite (defaults to the configured target).\n\
                     A file literally named `config` must follow `--`: fence-collapse -- config"
    )]
    path: Option<PathBuf>,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Print the cleaned document instead of rewriting the file")]
    dry_run: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Verbose logging")]
    verbose: u8,
}

impl Cli {
    fn check_conflicts(&self) -> Result<(), clap::Error> {
        if self.command.is_some() && (self.path.is_some() || self.dry_run) {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "[PATH] and --dry-run cannot be combined with a subcommand",
            ));
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Command {
    Config(ConfigCommand),
}

#[derive(Parser)]
struct ConfigCommand {
    #[command(subcommand)]
    subcommand: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    Init {
        #[arg(long)]
        global: bool,
    },
    Show,
    Path {
        #[arg(long)]
        global: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = cli.check_conflicts() {
        err.exit();
    }

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Command::Config(cmd)) => handle_config(cmd, cli.config.as_ref()),
        None => {
            let config = fence_collapse::Config::load(cli.config.as_ref(), cli.path)?;
            run(&config, cli.dry_run)
        }
    }
}

fn run(config: &fence_collapse::Config, dry_run: bool) -> Result<()> {
    if dry_run {
        let (content, _) = fence_collapse::preview_empty_code_blocks(&config.target)?;
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }

    fence_collapse::remove_empty_code_blocks(&config.target)?;
    println!("Empty code blocks removed successfully!");
    Ok(())
}

fn handle_config(cmd: ConfigCommand, config_path: Option<&PathBuf>) -> Result<()> {
    match cmd.subcommand {
        ConfigSubcommand::Init { global } => {
            let path = fence_collapse::Config::init_config(global)?;
            println!("Created config file: {:?}", path);
            Ok(())
        }
        ConfigSubcommand::Show => {
            let config = fence_collapse::Config::load(config_path, None)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigSubcommand::Path { global } => {
            let path = if global {
                fence_collapse::Config::global_config_path()
            } else {
                // Try project config first, fall back to global
                fence_collapse::Config::project_config_path()
                    .or_else(fence_collapse::Config::global_config_path)
            };

            if let Some(p) = path {
                println!("{}", p.display());
            } else {
                anyhow::bail!("Config file not found");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_default_run() {
        let cli = Cli::try_parse_from(["fence-collapse"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.path.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_parse_path_and_flags() {
        let cli = Cli::try_parse_from(["fence-collapse", "notes.md", "--dry-run", "-vv"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("notes.md")));
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli =
            Cli::try_parse_from(["fence-collapse", "--config", "c.toml", "config", "init", "--global"])
                .unwrap();
        assert!(cli.check_conflicts().is_ok());
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand {
                subcommand: ConfigSubcommand::Init { global: true }
            }))
        ));
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["fence-collapse", "config", "show", "--config", "c.toml", "-v"])
                .unwrap();
        assert!(cli.check_conflicts().is_ok());
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand {
                subcommand: ConfigSubcommand::Show
            }))
        ));
    }

    #[test]
    fn test_dry_run_with_subcommand_rejected() {
        let cli = Cli::try_parse_from(["fence-collapse", "--dry-run", "config", "path"]).unwrap();
        let err = cli.check_conflicts().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_file_named_config_after_separator() {
        let cli = Cli::try_parse_from(["fence-collapse", "--", "config"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.path, Some(PathBuf::from("config")));
        assert!(cli.check_conflicts().is_ok());
    }
}
