use clap::Parser;

mod ui;

use ui::WorkbenchApp;

#[derive(Parser, Debug)]
#[command(
    name = "desktop_gui",
    about = "Compose, dispatch, and inspect ad-hoc HTTP requests"
)]
pub struct Args {
    /// Prefill the URL field on startup
    #[arg(long)]
    pub url: Option<String>,
    /// Per-request transport timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Request Workbench")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Request Workbench",
        options,
        Box::new(move |_cc| Ok(Box::new(WorkbenchApp::new(&args)))),
    )
}
