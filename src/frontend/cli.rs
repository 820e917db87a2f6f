use crate::component::PartitionViewer;
use crate::frontend::config::Config;
use crate::infrastructure::logging::{init_logging, LogFormat};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliConfig {
    pub command: Command,
    pub config_path: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Command {
    /// Print the short identifier for each partition name
    Short { names: Vec<String> },
    /// Print the default configuration file
    #[default]
    DefaultConfig,
}

pub struct Cli {
    config: CliConfig,
}

impl Cli {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<i32, String> {
        let config = match &self.config.config_path {
            Some(path) => Config::load(path).map_err(|e| e.to_string())?,
            None => Config::discover(),
        };

        let mut log_config = config.logging.to_log_config().map_err(|e| e.to_string())?;
        if let Some(format) = self.config.log_format {
            log_config = log_config.with_format(format);
        }
        let _guard = init_logging(log_config);

        match &self.config.command {
            Command::DefaultConfig => {
                print!("{}", Config::generate_default());
                Ok(0)
            }
            Command::Short { names } => {
                let mut viewer = PartitionViewer::with_config(&config.partitions);
                let stdout = io::stdout();
                let mut out = stdout.lock();

                if names.is_empty() {
                    for line in io::stdin().lock().lines() {
                        let line = line.map_err(|e| format!("Failed to read stdin: {}", e))?;
                        let name = line.trim();
                        if !name.is_empty() {
                            write_mapping(&mut out, &mut viewer, name)?;
                        }
                    }
                } else {
                    for name in names {
                        write_mapping(&mut out, &mut viewer, name)?;
                    }
                }
                Ok(0)
            }
        }
    }
}

fn write_mapping(out: &mut impl Write, viewer: &mut PartitionViewer, name: &str) -> Result<(), String> {
    writeln!(out, "{}\t{}", viewer.short(name), name)
        .map_err(|e| format!("Failed to write output: {}", e))
}

fn usage(prog: &str) -> String {
    format!(
        "plugwire - call specs and partition identifiers\n\n\
        USAGE:\n    {} [OPTIONS] <COMMAND>\n\n\
        COMMANDS:\n    \
        short [NAMES...]    Print short identifiers (reads stdin without names)\n    \
        default-config      Print the default plugwire.toml\n\n\
        OPTIONS:\n    \
        --config <FILE>     Load configuration from FILE\n    \
        --log-format <FMT>  pretty, compact or json\n    \
        -h, --help          Print help information",
        prog
    )
}

pub fn parse_args<I>(args: I) -> Result<CliConfig, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let prog = args.first().map(String::as_str).unwrap_or("plugwire");

    let mut config = CliConfig::default();
    let mut command: Option<Command> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Err(usage(prog)),
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires an argument")?;
                config.config_path = Some(PathBuf::from(path));
            }
            "--log-format" => {
                i += 1;
                let format = args.get(i).ok_or("--log-format requires an argument")?;
                config.log_format = Some(match format.as_str() {
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    "json" => LogFormat::Json,
                    other => return Err(format!("Invalid value for --log-format: {}", other)),
                });
            }
            arg if arg.starts_with("--") => {
                return Err(format!("Unknown option: {}\n\n{}", arg, usage(prog)));
            }
            arg => match &mut command {
                None if arg == "short" => command = Some(Command::Short { names: Vec::new() }),
                None if arg == "default-config" => command = Some(Command::DefaultConfig),
                Some(Command::Short { names }) => names.push(arg.to_string()),
                _ => return Err(format!("Unexpected argument: {}\n\n{}", arg, usage(prog))),
            },
        }
        i += 1;
    }

    config.command = command.ok_or_else(|| usage(prog))?;
    Ok(config)
}

/// Entry point for CLI binary
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(std::env::args())?;
    let cli = Cli::new(config);
    let exit_code = cli.run()?;
    std::process::exit(exit_code);
}
