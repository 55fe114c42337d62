pub mod bucket;
pub mod loader;
pub mod record;

pub use bucket::{partition, BucketedPoints, TimeBucket};
pub use loader::{load_points, parse_timestamp};
pub use record::{BoundingBox, PointRecord};
