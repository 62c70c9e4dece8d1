//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Starting Vector Studio");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = vectorstudio_app::parse_args(&args)
        .and_then(|(script, out_dir)| vectorstudio_app::run_script(&script, &out_dir));

    match result {
        Ok(report) => {
            log::info!(
                "{} shapes, {} files written",
                report.shapes,
                report.exported.len()
            );
            for path in &report.exported {
                println!("{}", path.display());
            }
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
