use gl_listings::{constants::DEFAULT_LISTING, listing};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match std::env::args().nth(1).as_deref() {
        Some("--list") => {
            for (name, usage) in listing::LISTINGS {
                println!("{name:<16} {usage}");
            }
            Ok(())
        }
        name => {
            let name = name.unwrap_or(DEFAULT_LISTING);
            log::info!("starting {name}");
            listing::run(name)
        }
    }
}
