//! Service-order domain types.
//!
//! A service order is a generated document plus a ledger record describing
//! physical work performed at one or more sites. Numbers are sequential per
//! (category, year) scope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::ORDER_NUMBER_PAD;

/// The two template/folder classifications an order can belong to.
/// The category scopes the sequential numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderCategory {
    #[serde(rename = "URBMIDIA")]
    UrbMidia,
    #[serde(rename = "PROXIMA_PARADA")]
    ProximaParada,
}

impl OrderCategory {
    /// Label persisted on ledger rows and used for the destination folder
    pub fn label(&self) -> &'static str {
        match self {
            OrderCategory::UrbMidia => "URBMIDIA",
            OrderCategory::ProximaParada => "PROXIMA PARADA",
        }
    }

    /// File name of this category's `.docx` template
    pub fn template_file(&self) -> &'static str {
        match self {
            OrderCategory::UrbMidia => "urbmidia.docx",
            OrderCategory::ProximaParada => "proxima_parada.docx",
        }
    }
}

impl std::fmt::Display for OrderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One accumulated line item: a site identifier plus its free-text
/// work description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    /// Site identifier referenced by this item
    #[schema(example = "P1042")]
    pub site_id: String,
    /// Free-text description of the work
    #[schema(example = "IMPLANTACAO DE ABRIGO NA AV BRASIL, 120 BAIRRO CENTRO - PROX. AO TERMINAL")]
    pub description: String,
}

/// A fully assembled ledger row awaiting insertion; the store assigns
/// the surrogate id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRecord {
    pub number: i32,
    pub category: String,
    pub year: i32,
    pub issued_on: NaiveDate,
    pub site_id: String,
    pub site_ids: String,
    pub action_type: String,
    pub action_type_norm: String,
    pub item_type: String,
    pub item_type_norm: String,
    pub street: String,
    pub neighborhood: String,
    pub neighborhood_norm: String,
    pub complement: String,
    pub description: String,
    pub created_by: String,
}

/// Compact ledger row for the per-site history popup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSummary {
    pub number: i32,
    pub category: String,
    pub issued_on: NaiveDate,
    pub action_type: String,
    pub item_type: String,
    pub street: String,
    pub neighborhood: String,
    pub created_by: String,
}

/// Result of a successful order-creation workflow.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedOrder {
    /// Allocated order number
    pub number: i32,
    pub category: String,
    pub year: i32,
    /// File name of the generated document
    #[schema(example = "OS-003-2026-IDP1042.docx")]
    pub document: String,
}

/// Zero-padded display form of an order number
pub fn format_order_number(number: i32) -> String {
    format!("{:0width$}", number, width = ORDER_NUMBER_PAD)
}
