use crate::calendar::DateWindow;
use crate::models::AppData;
use crate::prizes::PrizeCatalogue;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub prizes: Arc<PrizeCatalogue>,
    pub window: DateWindow,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, prizes: PrizeCatalogue, window: DateWindow) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            prizes: Arc::new(prizes),
            window,
        }
    }
}
