use spotinst::SpotinstProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let provider = SpotinstProvider::new();
    let document = provider.schema_document().await;
    tracing::info!(
        "Printing schema for {} resources",
        document["resource_schemas"]
            .as_object()
            .map_or(0, |resources| resources.len())
    );

    println!("{}", serde_json::to_string_pretty(&document)?);

    Ok(())
}
