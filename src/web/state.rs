use std::sync::Arc;
use tokio::sync::Mutex;

use crate::analytics::Analytics;
use crate::collector::Collector;

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analytics: Analytics,
    pub collector: Arc<Mutex<Collector>>,
}
