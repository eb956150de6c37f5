// Stack selection below accounts/<account>/<environment>/<stack>.
pub mod listing;
pub mod resolver;
pub mod wrapper;

pub use listing::{DirectoryListing, FsListing};
pub use resolver::{AbortReason, Resolution, StackPath, StackResolver};
pub use wrapper::{StackLayout, WrapperDetector};
