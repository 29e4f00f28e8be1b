//! Headless entry point: scan a directory and report detected annotations.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use autolabel::Session;
use autolabel::geometry::Size;
use autolabel::model::ClassCatalog;

fn main() -> ExitCode {
    env_logger::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match run(&dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ClassCatalog::load_or_default(&dir.join("classes.txt"))?;
    let mut session = Session::new(catalog, Size::new(800.0, 600.0));

    let count = session.open_dir(dir)?;
    if count == 0 {
        println!("No images found in {}", dir.display());
        return Ok(());
    }

    for index in 0..count {
        session.switch_image(index)?;
        if let Some(record) = session.current_image() {
            let boxes = session.annotations().boxes().count();
            println!("{}: {} boxes", record.path.display(), boxes);
        }
    }
    Ok(())
}
