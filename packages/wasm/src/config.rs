//! Chart configuration.
//!
//! Every field has a default, so hosts can pass a partial object and only
//! override what they need.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::ActionHistory;
use crate::interaction::InteractionConfig;
use crate::layout::LayoutConfig;
use crate::viewport::ViewportConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrgChartConfig {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub interaction: InteractionConfig,
    /// Number of undoable mutations kept.
    pub history_capacity: usize,
}

impl Default for OrgChartConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            interaction: InteractionConfig::default(),
            history_capacity: ActionHistory::DEFAULT_CAPACITY,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl OrgChartConfig {
    /// Reject values the layout or viewport cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.layout;
        positive("cardWidth", l.card_width)?;
        positive("cardHeight", l.card_height)?;
        positive("levelHeight", l.level_height)?;
        if l.sibling_gap < 0.0 {
            return Err(ConfigError::Negative {
                field: "siblingGap",
                value: l.sibling_gap,
            });
        }

        let v = &self.viewport;
        positive("minZoom", v.min_zoom)?;
        positive("fitMaxZoom", v.fit_max_zoom)?;
        positive("wheelPixelDivisor", v.wheel_pixel_divisor)?;
        positive("wheelLineDivisor", v.wheel_line_divisor)?;
        if v.min_zoom > v.max_zoom {
            return Err(ConfigError::ZoomRange {
                min: v.min_zoom,
                max: v.max_zoom,
            });
        }

        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        Ok(())
    }
}
