//! `roi-zones`: inspect and replace the stored zones from the command line.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::run()
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::error::Error;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use roi_geom::ZoneCoords;
    use roizone::config::EditorConfig;
    use roizone::grid::{GridOptions, generate_grid};
    use roizone::model::{Zone, ZoneIdGenerator};
    use roizone::store::HttpClient;
    use roizone::store::wire::ZonesPayload;

    const USAGE: &str = "usage: roi-zones show\n       roi-zones push <file.json>\n       roi-zones grid <rows> <cols> [prefix]";

    /// Overrides the config file location.
    const ENV_CONFIG_PATH: &str = "ROI_CONFIG";

    #[derive(Debug, PartialEq)]
    pub(crate) enum Command {
        /// Print the stored zones
        Show,
        /// Replace the stored zones with the contents of a file
        Push(PathBuf),
        /// Replace the stored zones with a grid over the whole frame
        Grid {
            rows: u32,
            cols: u32,
            prefix: String,
        },
    }

    pub(crate) fn parse_args(args: &[String]) -> Result<Command, String> {
        let parse_count = |value: &str, what: &str| {
            value
                .parse::<u32>()
                .map_err(|_| format!("{} must be a positive integer, got '{}'", what, value))
        };
        match args {
            [cmd] if cmd == "show" => Ok(Command::Show),
            [cmd, file] if cmd == "push" => Ok(Command::Push(PathBuf::from(file))),
            [cmd, rows, cols, rest @ ..] if cmd == "grid" && rest.len() <= 1 => Ok(Command::Grid {
                rows: parse_count(rows, "rows")?,
                cols: parse_count(cols, "cols")?,
                prefix: rest.first().cloned().unwrap_or_default(),
            }),
            [] => Err("missing command".to_string()),
            _ => Err(format!("unrecognized arguments: {}", args.join(" "))),
        }
    }

    fn load_config() -> EditorConfig {
        let path = std::env::var_os(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .or_else(EditorConfig::default_path);
        let config = match path {
            Some(path) => EditorConfig::load_or_default(&path),
            None => EditorConfig::default(),
        };
        config.with_env_overrides()
    }

    /// Accept either a bare zone array or a `{ "roi_zones": [...] }` object.
    pub(crate) fn parse_zones(json: &str) -> Result<Vec<Zone>, serde_json::Error> {
        match serde_json::from_str::<Vec<Zone>>(json) {
            Ok(zones) => Ok(zones),
            Err(_) => serde_json::from_str::<ZonesPayload>(json).map(|p| p.roi_zones),
        }
    }

    fn read_zones(path: &Path) -> Result<Vec<Zone>, Box<dyn Error>> {
        let json = std::fs::read_to_string(path)?;
        let zones = parse_zones(&json)?;
        for zone in &zones {
            if !zone.coords.is_well_formed(1e-9) {
                log::warn!("Zone '{}' lies outside the image: {:?}", zone.name, zone.coords);
            }
        }
        Ok(zones)
    }

    fn execute(config: &EditorConfig, command: Command) -> Result<(), Box<dyn Error>> {
        let client = HttpClient::new(config);
        match command {
            Command::Show => {
                let (zones, source) = client.load_zones();
                log::info!("{} zones from {}", zones.len(), source.name());
                println!("{}", serde_json::to_string_pretty(&zones)?);
            }
            Command::Push(path) => {
                let zones = read_zones(&path)?;
                let stored = client.save_zones(&zones)?;
                println!("Stored {} zones", stored.len());
            }
            Command::Grid { rows, cols, prefix } => {
                let options = GridOptions::new(rows, cols).with_prefix(prefix);
                let zones =
                    generate_grid(&ZoneCoords::FULL, &options, 0, &mut ZoneIdGenerator::new())?;
                let stored = client.save_zones(&zones)?;
                println!("Stored {}x{} grid ({} zones)", rows, cols, stored.len());
            }
        }
        Ok(())
    }

    pub fn run() -> ExitCode {
        let config = load_config();
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let args: Vec<String> = std::env::args().skip(1).collect();
        let command = match parse_args(&args) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}\n{}", message, USAGE);
                return ExitCode::from(2);
            }
        };

        log::debug!("Backend: {}", config.backend_url);
        match execute(&config, command) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{}", e);
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        }
    }
}
