use clap::{ArgAction, Parser, Subcommand};
use simple_qr::config::{self, QrConfig};
use simple_qr::debounce::{self, Debouncer};
use simple_qr::encoding::Charset;
use simple_qr::generator::Generator;
use simple_qr::logging::{self, LogConfig};
use simple_qr::output;
use simple_qr::payload::{self, Contact, Wifi, WifiAuth};
use simple_qr::types::{ErrorCorrectionLevel, SizingMode};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "simple-qr")]
#[command(about = "Generate QR codes with predictable pixel sizes")]
#[command(long_about = "\
Generate QR codes with predictable pixel sizes

Sizing modes:

  fixed-size   Fit the requested size exactly; fail if even one pixel per
               module is too big.
  best-fit     Fit the requested size; fall back to one pixel per module
               (and overshoot) when the code is too dense.
  module-size  Draw every module a fixed number of pixels wide.

No code is ever rendered larger than generator.max_image_size.

Settings are read from ./simple-qr.toml (or --config) and overridden by flags.
Run 'simple-qr gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./simple-qr.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the code as PNG to this path
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Sizing mode: fixed-size, best-fit or module-size
    #[arg(long, global = true)]
    mode: Option<SizingMode>,

    /// Requested side in pixels (fixed-size, best-fit)
    #[arg(long, global = true)]
    size: Option<u32>,

    /// Pixels per module (module-size)
    #[arg(long, global = true)]
    module_size: Option<u32>,

    /// Error-correction level: L, M, Q or H
    #[arg(long = "ec", global = true)]
    error_correction: Option<ErrorCorrectionLevel>,

    /// Character set: US-ASCII, ISO-8859-1, UTF-8 or Shift_JIS
    #[arg(long, global = true)]
    charset: Option<Charset>,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode literal text
    Text { content: String },
    /// Encode a URL (https:// is added when no scheme is given)
    Url { url: String },
    /// Encode Wi-Fi credentials
    Wifi {
        #[arg(long)]
        ssid: String,
        #[arg(long)]
        password: Option<String>,
        /// WPA, WEP or nopass
        #[arg(long, default_value = "WPA")]
        auth: WifiAuth,
        #[arg(long)]
        hidden: bool,
    },
    /// Encode a geographic location
    Geo {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Encode a vCard contact
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "org")]
        organization: Option<String>,
    },
    /// Read content from stdin line by line, regenerating after each edit
    Live,
    /// Print a stock simple-qr.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&LogConfig::from_verbosity(cli.verbose))?;

    let content = match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Live => {
            let config = load_settings(&cli)?;
            return run_live(&cli, &config);
        }
        Command::Text { content } => content.clone(),
        Command::Url { url } => payload::url(url)?,
        Command::Wifi {
            ssid,
            password,
            auth,
            hidden,
        } => payload::wifi(&Wifi {
            ssid: ssid.clone(),
            password: password.clone(),
            auth: *auth,
            hidden: *hidden,
        })?,
        Command::Geo {
            latitude,
            longitude,
        } => payload::geo(*latitude, *longitude)?,
        Command::Contact {
            name,
            phone,
            email,
            organization,
        } => payload::contact(&Contact {
            name: name.clone(),
            phone: phone.clone(),
            email: email.clone(),
            organization: organization.clone(),
        })?,
    };

    let config = load_settings(&cli)?;
    let mut generator = Generator::from_config(&config.generator);
    generator.set_content(content);
    generator.generate_code()?;
    write_and_report(&generator, cli.output.as_deref(), cli.json)?;
    Ok(())
}

/// Config file, then command-line overrides, then validation.
fn load_settings(cli: &Cli) -> Result<QrConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    let generator = &mut config.generator;
    if let Some(mode) = cli.mode {
        generator.mode = mode;
    }
    if let Some(size) = cli.size {
        generator.size = size;
    }
    if let Some(module_size) = cli.module_size {
        generator.module_size = module_size;
    }
    if let Some(level) = cli.error_correction {
        generator.error_correction = level;
    }
    if let Some(charset) = cli.charset {
        generator.charset = Some(charset);
    }
    config.validate()?;
    debug!(?config, "settings resolved");
    Ok(config)
}

fn write_and_report(
    generator: &Generator,
    path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = path {
        generator
            .get_image()?
            .save_with_format(path, image::ImageFormat::Png)?;
        info!(path = %path.display(), "code written");
    }
    if let Some(summary) = output::summarize(generator, path) {
        if json {
            println!("{}", output::format_json(&summary)?);
        } else {
            output::print_summary(&summary);
        }
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Each stdin line replaces the content. Regeneration is debounced and runs
/// on this thread, which alternates between reading edits and draining the
/// UI channel.
fn run_live(cli: &Cli, config: &QrConfig) -> Result<(), Box<dyn std::error::Error>> {
    let generator = Arc::new(Mutex::new(Generator::from_config(&config.generator)));
    lock(&generator).subscribe(|event| debug!("{}", output::format_event(event)));

    let (dispatcher, receiver) = debounce::ui_channel();
    let debouncer = Debouncer::new(dispatcher, config.debounce.bounds())?;

    let (lines_tx, lines) = mpsc::channel::<String>();
    let reader = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        match lines.recv_timeout(Duration::from_millis(5)) {
            Ok(line) => {
                let cost = {
                    let mut generator = lock(&generator);
                    generator.set_content(line);
                    generator.last_generation_cost()
                };
                let target = Arc::clone(&generator);
                let path = cli.output.clone();
                let json = cli.json;
                debouncer.schedule(cost, move || regenerate(&target, path.as_deref(), json));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        receiver.run_pending();
    }

    // The last edit may still be waiting on its timer.
    let settle = debouncer.bounds().max * 2;
    while debouncer.is_pending() {
        if !receiver.recv_timeout(settle) {
            break;
        }
    }
    drop(receiver);
    drop(debouncer);
    reader.join().map_err(|_| "stdin reader panicked")?;
    Ok(())
}

fn regenerate(generator: &Mutex<Generator>, path: Option<&Path>, json: bool) {
    let mut generator = lock(generator);
    if !generator.has_content() {
        return;
    }
    // Failures are logged by the generator; the previous PNG stays on disk.
    if let Err(err) = generator.generate_code() {
        eprintln!("error: {err}");
        return;
    }
    if let Err(err) = write_and_report(&generator, path, json) {
        eprintln!("error: {err}");
    }
}
