//! Serializable document snapshot: the unit of load and export.

use crate::page::Page;
use crate::page_state::{PageState, Settings};
use serde::{Deserialize, Serialize};

/// A full editor snapshot. `page_state` and `settings` are optional so a
/// bare `{ page }` document loads with default view state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub page: Page,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_state: Option<PageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}
