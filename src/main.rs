use clap::Parser;
use kaleido_painter::{AppArgs, PainterApp};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = match AppArgs::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid configuration: {err}");
            eprintln!("kaleido-painter: {err}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Kaleido Painter",
        options,
        Box::new(|cc| {
            let app = PainterApp::new(cc, config)?;
            Ok(Box::new(app))
        }),
    )
}
