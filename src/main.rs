use anyhow::Context;
use bookly_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Bookly settings")?;
    bookly_telemetry::init(&settings.telemetry)?;

    bookly_app::bootstrap::serve(settings).await
}
