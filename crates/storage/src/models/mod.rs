mod athlete;
mod history;
mod parkrun_id;
mod result;

pub use athlete::AthleteConfig;
pub use history::ResultHistory;
pub use parkrun_id::ParkrunId;
pub use result::{RawResultRow, ResultKey, ResultRow};
