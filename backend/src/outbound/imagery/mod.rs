//! Outbound adapter for the external satellite imagery provider.

mod http_source;

pub use http_source::ThumbnailHttpSource;
