use anyhow::Result;
use log::info;

use fleet_backend::Backend;

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting fleet records");

    let backend = Backend::open_default()?;
    let overview = backend.car_service.fleet_overview()?;

    info!(
        "Fleet loaded from {}: {} active cars, {} archived",
        backend.data_directory.display(),
        overview.active_cars.len(),
        overview.archived_count
    );
    for card in &overview.active_cars {
        info!(
            "  {} [{}] {}, {}, driver: {}",
            card.title, card.plate, card.mileage, card.status, card.driver_name
        );
    }

    Ok(())
}
