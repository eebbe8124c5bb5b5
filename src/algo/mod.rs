pub mod enrich;
pub mod positioning;
pub mod product;
pub mod sales;
pub mod segments;
pub mod taxonomy;
