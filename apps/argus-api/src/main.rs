use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = argus_api::Args::parse();

	argus_api::run(args).await
}
