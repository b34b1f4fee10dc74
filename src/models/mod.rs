pub mod detection;
pub mod downtime;
pub mod reference;
pub mod widget;

pub use detection::{Detection, EnrichedDetection};
pub use downtime::{DowntimeEvent, DowntimeEventRow, DowntimeSource};
pub use reference::{
    Area, AreaType, DashboardTemplate, Failure, FilterRow, Incident, LineGroup, Product,
    ProductionLine, Shift, WidgetCatalogEntry,
};
pub use widget::WidgetResult;
