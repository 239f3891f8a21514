pub mod aggregation;
pub mod listing;

pub use listing::ListingService;
