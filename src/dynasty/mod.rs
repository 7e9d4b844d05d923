//! Scrapers for the two page types of the site: chapter readers and series listings.

pub mod chapter;
pub mod series;

pub use chapter::image_refs;
pub use series::Series;
