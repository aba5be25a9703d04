use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::FormulaAgent;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn FormulaAgent>,
    /// Destination for formulas requested with `save_file`
    pub save_path: PathBuf,
}
