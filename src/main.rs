//! invoice-forge – command-line sales invoice renderer.
//!
//! Usage:
//!   invoice-forge <invoice.json> [--output-dir DIR] [--assets DIR] [--layout-json FILE]
//!   invoice-forge --sample [--output-dir DIR] [--assets DIR]
//!
//! Logo paths in the config are resolved against `--assets` (default: the
//! directory containing the config file).

use std::{env, fs, path::PathBuf, process};

use invoice_forge::image_fit::FsImageSource;
use invoice_forge::templates::sample_invoice;
use invoice_forge::{render_invoice, InvoiceConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut assets: Option<PathBuf> = None;
    let mut layout_json: Option<PathBuf> = None;
    let mut sample = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| match iter.next() {
            Some(v) => PathBuf::from(v),
            None => {
                eprintln!("Missing value for {flag}");
                print_usage(&args[0]);
                process::exit(1);
            }
        };
        match arg.as_str() {
            "--output-dir" | "-o" => output_dir = Some(value("--output-dir")),
            "--assets" | "-a" => assets = Some(value("--assets")),
            "--layout-json" => layout_json = Some(value("--layout-json")),
            "--sample" => sample = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path if config_path.is_none() => config_path = Some(PathBuf::from(path)),
            path => {
                eprintln!("Unexpected argument: {path}");
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let mut config = match (&config_path, sample) {
        (_, true) => sample_invoice(),
        (Some(path), false) => match InvoiceConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading '{}': {e}", path.display());
                process::exit(1);
            }
        },
        (None, false) => {
            eprintln!("Error: no invoice config specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let assets_root = assets.unwrap_or_else(|| {
        config_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let images = FsImageSource::new(assets_root);

    match render_invoice(&config, &images) {
        Ok((path, layout)) => {
            if let Some(json_path) = layout_json {
                let written = layout
                    .to_json()
                    .and_then(|json| Ok(fs::write(&json_path, json)?));
                if let Err(e) = written {
                    eprintln!("Error writing '{}': {e}", json_path.display());
                    process::exit(1);
                }
            }
            let pages = layout.pages.len();
            eprintln!(
                "Wrote '{}' ({} page{})",
                path.display(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("invoice-forge – sales invoice to PDF renderer");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <invoice.json> [--output-dir DIR] [--assets DIR] [--layout-json FILE]");
    eprintln!("  {prog} --sample [--output-dir DIR] [--assets DIR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <invoice.json>     Invoice config (file name, header text, details, ...)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --output-dir, -o   Directory for the PDF (overrides the config)");
    eprintln!("  --assets, -a       Directory logo paths are resolved against");
    eprintln!("  --layout-json      Also write the paginated layout as JSON");
    eprintln!("  --sample           Render the built-in sample invoice");
    eprintln!("  --help             Print this message");
}
