mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use veriframe_core::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging.
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "veriframe=trace,veriframe_media=trace,veriframe_av=trace,tower_http=debug".to_string()
        } else {
            "veriframe=debug,veriframe_media=info,veriframe_av=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = Config::from_env();
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(veriframe::server::serve(config))?;
            Ok(())
        }
        Commands::Detect {
            url_original,
            url_suspect,
        } => {
            let config = Config::from_env();
            let rt = tokio::runtime::Runtime::new()?;
            let detection = rt.block_on(async {
                let detector = veriframe::Detector::new(config);
                detector
                    .detect(Some(&url_original), Some(&url_suspect))
                    .await
            })?;
            println!("{}", serde_json::to_string_pretty(&detection)?);
            Ok(())
        }
        Commands::Diff {
            original,
            suspect,
            output,
        } => diff_images(&original, &suspect, &output),
        Commands::Inspect { file } => inspect_image(&file),
        Commands::CheckTools => check_tools(),
        Commands::Version => {
            println!("veriframe {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn diff_images(original: &Path, suspect: &Path, output: &Path) -> Result<()> {
    let a = image::open(original)?;
    let b = image::open(suspect)?;
    let diff = veriframe_media::difference_image(&a, &b)?;
    diff.save(output)?;
    println!("Wrote difference image to {}", output.display());
    Ok(())
}

fn inspect_image(file: &Path) -> Result<()> {
    let img = image::open(file)?;
    let props = veriframe_media::analyze_properties(&img)?;
    println!("{}", serde_json::to_string_pretty(&props)?);
    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = veriframe_av::Tools::check();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing; video comparison will be unavailable.");
    }

    Ok(())
}
