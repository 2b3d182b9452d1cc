pub mod config_ui;
pub mod scope_ui;

pub use config_ui::ConfigPanel;
pub use scope_ui::ScopePanel;
