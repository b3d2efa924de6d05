//! Capability queries and report encoding/decoding for HID report buffers.
//!
//! This is the main codec crate that ties together bitstream and schema to
//! answer two questions about a report buffer described by a
//! [`CapabilityTable`](schema::CapabilityTable): which values and usages does
//! it encode, and how are values and usages written into it.
//!
//! # Features
//!
//! - Button and value capability queries, filtered by page, collection and usage
//! - Raw, scaled and array value access
//! - Bitmap and array usage lists
//! - Generic active data extraction keyed by data index
//! - Linked collection hierarchy
//!
//! # Design Principles
//!
//! - **Stateless** - Every query is a pure function of the table and buffers.
//! - **No allocations** - Results go into caller-provided slices; a short slice
//!   yields [`HidpError::BufferTooSmall`] with the count that would fit.
//! - **Neighbour preserving** - Writes touch only the bits a field declares.
//!
//! # Example
//!
//! ```
//! use codec::{get_usages, set_usages};
//! use schema::{CapabilityTable, FieldCapability, ReportType};
//!
//! let table = CapabilityTable::builder()
//!     .report_length(ReportType::Input, 3)
//!     .field(ReportType::Input, FieldCapability::buttons(0x09, 1, 10).at(8).report_id(1))
//!     .build()
//!     .unwrap();
//!
//! let mut report = [1, 0, 0];
//! set_usages(&table, ReportType::Input, 0x09, 0, &[4, 8], &mut report).unwrap();
//!
//! let mut usages = [0; 10];
//! let count = get_usages(&table, ReportType::Input, 0x09, 0, &report, &mut usages).unwrap();
//! assert_eq!(&usages[..count], &[4, 8]);
//! ```

mod caps;
mod collection;
mod data;
mod enumerate;
mod error;
mod report;
mod usages;
mod value;

pub use caps::{
    get_button_caps, get_caps, get_specific_button_caps, get_specific_value_caps, get_value_caps,
    ButtonCaps, CapsRange, DeviceCaps, IndexRange, ReportCaps, ValueCaps,
};
pub use collection::{get_link_collection_nodes, CollectionNode};
pub use data::{get_data, max_data_list_length, DataItem, DataValue};
pub use enumerate::{enumerate_caps, CapsFilter, CapsVisitor, Visit};
pub use error::{HidpError, HidpResult, Status};
pub use report::initialize_report_for_id;
pub use usages::{get_usages, get_usages_ex, max_usage_list_length, set_usages, UsageAndPage};
pub use value::{
    get_scaled_usage_value, get_usage_value, get_usage_value_array, scale, scale_to,
    set_scaled_usage_value, set_usage_value, set_usage_value_array, sign_extend_field, unscale,
};
