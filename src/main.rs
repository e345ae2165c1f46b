use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use warp_assets::layout::Platform;
use warp_assets::service::ShellService;
use warp_assets::{config, output, pipeline};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "warp")]
#[command(about = "Incremental mobile asset pipeline")]
#[command(long_about = "\
Incremental mobile asset pipeline

Drop raw assets (authored at the densest target: xxxhdpi for Android, 3x for
iOS) into the raw directory and every run produces the scaled, compressed
variants your platform expects — re-processing only what changed.

Output layout:

  Android (--platform android):        iOS (--platform ios):
    assets/                              assets/
    ├── drawable-hdpi/icon.png           ├── icon.png
    ├── drawable-xhdpi/icon.png          ├── icon@2x.png
    ├── drawable-xxhdpi/icon.png         └── icon@3x.png
    └── drawable-xxxhdpi/icon.png

Change detection is content-based: a snapshot of per-file digests lives in
<raw>/.warp-snapshot.json. New and modified sources are (re)generated,
sources removed from raw/ get their variants deleted, everything else is
skipped. Requires ffmpeg and pngquant on PATH.

An optional <raw>/warp.toml configures recognized extensions and a thread
cap.")]
#[command(version = version_string())]
struct Cli {
    /// Target platform layout
    #[arg(long, value_enum, default_value = "android")]
    platform: Platform,

    /// Raw input directory
    #[arg(long, default_value = "raw")]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "assets")]
    output: PathBuf,

    /// Discard the snapshot and output tree first, forcing a full rebuild
    #[arg(long)]
    clean: bool,

    /// Suppress the banner and completion lines
    #[arg(long)]
    silent: bool,

    /// Cap the number of parallel workers (overrides warp.toml)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.silent {
        println!("{}", output::format_banner(version_string()));
    }

    // Bootstrapping: the raw root must exist before config load and scan.
    if let Err(e) = std::fs::create_dir_all(&cli.source) {
        eprintln!("error: cannot create raw directory {}: {e}", cli.source.display());
        return ExitCode::FAILURE;
    }

    let mut warp_config = match config::WarpConfig::load(&cli.source) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if cli.threads.is_some() {
        warp_config.processing.max_threads = cli.threads;
    }
    init_thread_pool(&warp_config.processing);

    if cli.clean {
        if let Err(e) = pipeline::clean(&cli.source, &cli.output) {
            eprintln!("error: clean failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    let options = pipeline::RunOptions {
        raw_root: cli.source.clone(),
        out_root: cli.output.clone(),
        platform: cli.platform,
        extensions: warp_config.extensions.clone(),
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_event(&event);
        }
    });

    let result = pipeline::run(&ShellService::new(), &options, Some(&tx));
    drop(tx);
    if printer.join().is_err() {
        eprintln!("error: output printer thread panicked");
    }

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    output::print_summary(&report);
    if !cli.silent {
        println!("WARP complete: {}", cli.output.display());
    }

    if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
