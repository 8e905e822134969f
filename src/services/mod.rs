// Dashboard aggregations over the shared dataset
pub mod disruptions;
pub mod forecasting;
pub mod overview;
pub mod waste;
