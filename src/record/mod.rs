//! Record Module
//!
//! Device records as they live inside the collection file.
//!
//! ## Responsibilities
//! - Wrap a JSON object as a `DeviceRecord` without constraining its fields
//! - Typed access to the handful of fields the store relies on
//! - Normalize the nested `drives` structure
//! - Hand out surrogate ids and RFC 3339 timestamps
//!
//! ## Record Shape
//! ```text
//! {
//!   "id": 1718000000000,            surrogate, immutable after creation
//!   "assetNumber": "A-1001",        natural key, unique in the collection
//!   "hostname": "ws-017",
//!   "drives": {
//!     "localDrives":   [ ... ],
//!     "otherDrives":   [ ... ],
//!     "networkDrives": [ ... ]
//!   },
//!   "timestamp": "...",             creation time
//!   "lastModified": "...",          last accepted write
//!   "modifiedBy": "script",
//!   ...                             opaque pass-through attributes
//! }
//! ```

mod device;
mod clock;

pub use device::{DeviceRecord, Drives};
pub(crate) use device::json_kind;
pub use clock::{now_rfc3339, IdGenerator};

/// JSON field names the store reads or writes
pub mod fields {
    pub const ID: &str = "id";
    pub const ASSET_NUMBER: &str = "assetNumber";
    pub const HOSTNAME: &str = "hostname";
    pub const DRIVES: &str = "drives";
    pub const LOCAL_DRIVES: &str = "localDrives";
    pub const OTHER_DRIVES: &str = "otherDrives";
    pub const NETWORK_DRIVES: &str = "networkDrives";
    pub const TIMESTAMP: &str = "timestamp";
    pub const LAST_MODIFIED: &str = "lastModified";
    pub const MODIFIED_BY: &str = "modifiedBy";
}
