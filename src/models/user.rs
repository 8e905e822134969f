use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Profile of the authenticated caller as shown in the dashboard header.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    #[schema(example = "Supply Chain Manager")]
    pub role: String,
    #[schema(example = "Bentonville, AR")]
    pub location: String,
}
