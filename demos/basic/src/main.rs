use std::{thread, time::Duration};

use log::{info, LevelFilter};

mod app;

use app::App;

const FRAME: Duration = Duration::from_millis(16);
const FRAME_COUNT: u32 = 120;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    info!("Basic Netsync Demo started");

    let mut app = match App::new() {
        Ok(app) => app,
        Err(err) => {
            log::error!("demo failed to start: {}", err);
            return;
        }
    };

    for _ in 0..FRAME_COUNT {
        app.update(FRAME);
        thread::sleep(FRAME);
    }

    app.finish();
}
