//! Record payload model: service periods, section data, and records.

mod payload;
mod record;
mod service_period;

pub use payload::{PerSection, Projection, SeaServicePayload, SectionData, section_data};
pub use record::{RecordStatus, SeaServiceRecord, seal};
pub use service_period::{ServicePeriod, ServicePeriodPatch, parse_date};
