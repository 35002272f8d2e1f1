//! Service-order workflow.
//!
//! Orchestrates the creation of one service order: address registry
//! upserts, sequential number allocation, document rendering and the
//! ledger append. The database steps run inside a single transaction;
//! a generated folder left on disk by a rolled-back run is logged,
//! never compensated.

use async_trait::async_trait;
use chrono::{Datelike, Local};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, NO_SITE_PLACEHOLDER};
use crate::domain::order::format_order_number;
use crate::domain::{
    heuristics, normalize, AddressEntry, AddressInput, CreatedOrder, LineItem, NewOrderRecord,
    OrderCategory, OrderSummary,
};
use crate::errors::{AppError, AppResult};
use crate::infra::docgen::{self, OrderDocument};
use crate::infra::UnitOfWork;

/// Order form contents as accumulated on the client.
#[derive(Debug, Clone)]
pub struct OrderForm {
    pub category: OrderCategory,
    /// Kind of work performed (e.g. "Implantação")
    pub action_type: String,
    /// Kind of item worked on (e.g. "Abrigo")
    pub item_type: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub complement: String,
    /// Accumulated line items; at least one is required
    pub items: Vec<LineItem>,
}

/// Order workflow trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Look up an address registry entry by site identifier
    async fn find_address(&self, site_id: &str) -> AppResult<Option<AddressEntry>>;

    /// Most recent orders referencing a site, newest first
    async fn history(&self, site_id: &str) -> Vec<OrderSummary>;

    /// Run the full order-creation workflow as `actor`
    async fn create_order(&self, form: OrderForm, actor: &str) -> AppResult<CreatedOrder>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderCompiler<U: UnitOfWork> {
    uow: Arc<U>,
    orders_root: PathBuf,
    template_dir: PathBuf,
}

impl<U: UnitOfWork> OrderCompiler<U> {
    pub fn new(uow: Arc<U>, config: &Config) -> Self {
        Self {
            uow,
            orders_root: config.orders_root.clone(),
            template_dir: config.template_dir.clone(),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderCompiler<U> {
    async fn find_address(&self, site_id: &str) -> AppResult<Option<AddressEntry>> {
        self.uow.addresses().find(site_id).await
    }

    async fn history(&self, site_id: &str) -> Vec<OrderSummary> {
        self.uow.orders().history(site_id).await
    }

    async fn create_order(&self, form: OrderForm, actor: &str) -> AppResult<CreatedOrder> {
        let OrderForm {
            category,
            action_type,
            item_type,
            street: form_street,
            number: form_number,
            neighborhood: form_neighborhood,
            complement: form_complement,
            items,
        } = form;

        if items.is_empty() {
            return Err(AppError::validation(
                "Add at least one line item before generating the order",
            ));
        }

        // Destination folders live on a network share; an unreachable
        // share is reported with the path inline, before any write.
        let base = self.orders_root.join(category.label());
        if !base.is_dir() {
            return Err(AppError::document(format!(
                "the destination folder is not reachable: {}",
                base.display()
            )));
        }
        let template = self.template_dir.join(category.template_file());

        // Distinct non-blank site ids, first occurrence first
        let mut site_ids: Vec<String> = Vec::new();
        for item in &items {
            let id = item.site_id.trim();
            if !id.is_empty() && !site_ids.iter().any(|s| s == id) {
                site_ids.push(id.to_string());
            }
        }
        let joined_ids = if site_ids.is_empty() {
            NO_SITE_PLACEHOLDER.to_string()
        } else {
            site_ids.join("-")
        };
        let primary_id = items[0].site_id.trim().to_string();

        let input = AddressInput {
            street: form_street,
            number: form_number,
            neighborhood: form_neighborhood.clone(),
            complement: (!form_complement.trim().is_empty())
                .then(|| form_complement.clone()),
        };

        let first_description = &items[0].description;
        let street = heuristics::display_address(first_description);
        let (neighborhood, complement) = heuristics::neighborhood_and_complement(
            first_description,
            &form_neighborhood,
            &form_complement,
        );
        let description = items
            .iter()
            .map(|item| item.description.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let today = Local::now().date_naive();
        let year = today.year();
        let actor = actor.to_string();
        let record_site_ids = site_ids.join("-");

        let result = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    for site_id in &site_ids {
                        let existing = ctx.addresses().find(site_id).await?;
                        match existing {
                            None => ctx.addresses().create(site_id, &input, &actor).await?,
                            Some(entry) => {
                                ctx.addresses()
                                    .update(site_id, &input, &actor, entry.status.is_inactive())
                                    .await?
                            }
                        }
                    }

                    let number = ctx.orders().next_number(category, year).await;

                    let folder = base.join(format!(
                        "{}-{:02}-{}-ID{}",
                        format_order_number(number),
                        today.month(),
                        year,
                        joined_ids
                    ));
                    fs::create_dir_all(&folder).map_err(|e| {
                        AppError::document(format!("{}: {}", folder.display(), e))
                    })?;

                    let file_name = format!(
                        "OS-{}-{}-ID{}.docx",
                        format_order_number(number),
                        year,
                        joined_ids
                    );
                    let destination = folder.join(&file_name);
                    let document = OrderDocument {
                        number,
                        issued_on: today,
                        primary_site_id: &primary_id,
                        items: &items,
                    };
                    docgen::render(&template, &destination, &document)?;

                    ctx.orders()
                        .append(NewOrderRecord {
                            number,
                            category: category.label().to_string(),
                            year,
                            issued_on: today,
                            site_id: primary_id.clone(),
                            site_ids: record_site_ids,
                            action_type_norm: normalize(&action_type),
                            action_type,
                            item_type_norm: normalize(&item_type),
                            item_type,
                            street,
                            neighborhood_norm: normalize(&neighborhood),
                            neighborhood,
                            complement,
                            description,
                            created_by: actor,
                        })
                        .await?;

                    Ok(CreatedOrder {
                        number,
                        category: category.label().to_string(),
                        year,
                        document: file_name,
                    })
                })
            })
            .await;

        if let Err(e) = &result {
            // The rendered folder is not removed on rollback
            tracing::warn!(
                "Order creation failed, a generated document folder may remain on disk: {}",
                e
            );
        }

        result
    }
}
