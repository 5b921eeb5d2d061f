//! nebulous - a demo application built on Mundane.

mod nebulous;

use mundane::{App, AppOptions, Config, Module, Result};
use tracing::error;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let config = Config::load_from_file(&Config::default_path("nebulous"))?;

    let options = AppOptions::new()
        .use_log_mgr(true)
        .description_from_doc(nebulous::DOC)
        .apply_config(&config);
    let mut app = App::new(options)?;

    // Usually a list of separate modules; the demo only has one.
    let modules: [&dyn Module; 1] = [&nebulous::Nebulous];
    app.register_global_flags(&modules)?;
    app.register_shared_flags(&modules)?;
    app.register_commands(&modules)?;

    app.run(std::env::args_os().skip(1))
}
