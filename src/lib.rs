pub mod algo;
pub mod ops;

#[cfg(feature = "plugin")]
pub mod commands;

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct SegmentsPlugin;

#[cfg(feature = "plugin")]
impl Plugin for SegmentsPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Enrich),
            Box::new(commands::Aggregate),
            Box::new(commands::Sales),
            Box::new(commands::Positioning),
        ]
    }
}
