//! Runtime Configuration
//!
//! Marker attribute names and runtime tunables, loadable from JSON.

use brisk_net::DEFAULT_MAX_IN_FLIGHT;
use serde::{Deserialize, Serialize};

/// Attribute name of every built-in marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkerNames {
    pub id: String,
    pub debug: String,
    pub call: String,
    pub view: String,
    pub refresh: String,
    pub ajax: String,
    pub rest_get: String,
    pub rest_put: String,
    pub rest_post: String,
    pub rest_patch: String,
    pub rest_delete: String,
    pub no_select: String,
    pub no_drag: String,
    pub load: String,
    pub click: String,
    pub phone_mask: String,
    pub no_paste: String,
    pub limit_text: String,
    pub only_allow_chars: String,
}

impl Default for MarkerNames {
    fn default() -> Self {
        Self {
            id: "br-id".into(),
            debug: "br-debug".into(),
            call: "br-call".into(),
            view: "br-view".into(),
            refresh: "br-refresh".into(),
            ajax: "br-ajax".into(),
            rest_get: "br-restget".into(),
            rest_put: "br-restput".into(),
            rest_post: "br-restpost".into(),
            rest_patch: "br-restpatch".into(),
            rest_delete: "br-restdelete".into(),
            no_select: "br-noselect".into(),
            no_drag: "br-nodrag".into(),
            load: "br-load".into(),
            click: "br-click".into(),
            phone_mask: "br-phonemask".into(),
            no_paste: "br-nopaste".into(),
            limit_text: "br-limittext".into(),
            only_allow_chars: "br-onlyallowchars".into(),
        }
    }
}

impl MarkerNames {
    /// Lowercase every name; attribute lookup is case-insensitive
    pub(crate) fn normalized(mut self) -> Self {
        for name in [
            &mut self.id,
            &mut self.debug,
            &mut self.call,
            &mut self.view,
            &mut self.refresh,
            &mut self.ajax,
            &mut self.rest_get,
            &mut self.rest_put,
            &mut self.rest_post,
            &mut self.rest_patch,
            &mut self.rest_delete,
            &mut self.no_select,
            &mut self.no_drag,
            &mut self.load,
            &mut self.click,
            &mut self.phone_mask,
            &mut self.no_paste,
            &mut self.limit_text,
            &mut self.only_allow_chars,
        ] {
            *name = name.trim().to_ascii_lowercase();
        }
        self
    }
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub markers: MarkerNames,
    /// Network operations allowed in flight at once
    pub max_in_flight: usize,
    /// Quiet period before a mutation triggers a re-scan
    pub mutation_debounce_ms: u64,
    /// Delay between rendering a view and binding its content
    pub render_delay_ms: u64,
    /// Base for relative request URLs
    pub base_url: Option<String>,
    /// Verbose handler failure reporting
    pub debug: bool,
    /// Install the debug, phone-mask and text-input markers
    pub cogs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            markers: MarkerNames::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            mutation_debounce_ms: 100,
            render_delay_ms: 1,
            base_url: None,
            debug: false,
            cogs: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
