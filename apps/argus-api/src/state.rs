use std::sync::Arc;

use argus_service::ArgusService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ArgusService>,
}
impl AppState {
	pub fn new(config: argus_config::Config) -> Self {
		Self { service: Arc::new(ArgusService::new(config)) }
	}
}
