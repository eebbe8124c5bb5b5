mod aggregate;
mod enrich;
mod positioning;
mod sales;
mod util;

pub use aggregate::Aggregate;
pub use enrich::Enrich;
pub use positioning::Positioning;
pub use sales::Sales;
