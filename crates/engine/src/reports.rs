//! Sales reporting over persisted transactions.
//!
//! Everything here is pure: the engine loads the rows for a window and hands
//! them over, so the aggregation rules can be tested without a database.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

/// Maximum number of entries in [`DailySalesReport::top_selling_items`].
pub const TOP_SELLERS_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSellingItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySalesReport {
    pub date: NaiveDate,
    pub total_sales: Money,
    pub total_transactions: u64,
    /// `total_sales / total_transactions`, or zero on a day without sales.
    pub average_transaction: Money,
    pub top_selling_items: Vec<TopSellingItem>,
}

impl DailySalesReport {
    pub fn new(
        date: NaiveDate,
        total_sales: Money,
        total_transactions: u64,
        top_selling_items: Vec<TopSellingItem>,
    ) -> Self {
        Self {
            date,
            total_sales,
            total_transactions,
            average_transaction: total_sales.average_over(total_transactions),
            top_selling_items,
        }
    }
}

/// One sold line inside the report window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoldLine {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub total_price: Money,
}

/// Groups sold lines per menu item, then ranks by quantity.
///
/// Groups keep the order in which their item was first seen, and the sort is
/// stable, so equal quantities stay in that order.
pub fn top_selling_items<I>(lines: I) -> Vec<TopSellingItem>
where
    I: IntoIterator<Item = SoldLine>,
{
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut grouped: Vec<TopSellingItem> = Vec::new();

    for line in lines {
        match index.get(&line.menu_item_id) {
            Some(&at) => {
                let entry = &mut grouped[at];
                entry.quantity_sold = entry.quantity_sold.saturating_add(line.quantity);
                entry.revenue = entry
                    .revenue
                    .checked_add(line.total_price)
                    .unwrap_or(Money::new(i64::MAX));
            }
            None => {
                index.insert(line.menu_item_id, grouped.len());
                grouped.push(TopSellingItem {
                    menu_item_id: line.menu_item_id,
                    name: line.name,
                    quantity_sold: line.quantity,
                    revenue: line.total_price,
                });
            }
        }
    }

    grouped.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    grouped.truncate(TOP_SELLERS_LIMIT);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: Uuid, name: &str, quantity: i64, unit_minor: i64) -> SoldLine {
        SoldLine {
            menu_item_id: id,
            name: name.to_string(),
            quantity,
            total_price: Money::new(unit_minor * quantity),
        }
    }

    #[test]
    fn sums_quantity_and_revenue_per_item() {
        let latte = Uuid::now_v7();
        let croissant = Uuid::now_v7();
        let top = top_selling_items(vec![
            line(latte, "Latte", 2, 15_50),
            line(croissant, "Croissant", 1, 25_00),
            line(latte, "Latte", 1, 15_50),
        ]);

        assert_eq!(
            top,
            vec![
                TopSellingItem {
                    menu_item_id: latte,
                    name: "Latte".to_string(),
                    quantity_sold: 3,
                    revenue: Money::new(46_50),
                },
                TopSellingItem {
                    menu_item_id: croissant,
                    name: "Croissant".to_string(),
                    quantity_sold: 1,
                    revenue: Money::new(25_00),
                },
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        let top = top_selling_items(vec![
            line(b, "Tea", 2, 10_00),
            line(a, "Espresso", 2, 12_00),
            line(c, "Mocha", 5, 20_00),
        ]);
        let order: Vec<_> = top.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(order, vec!["Mocha", "Tea", "Espresso"]);
    }

    #[test]
    fn keeps_at_most_ten() {
        let lines = (1..=12).map(|qty| line(Uuid::now_v7(), &format!("item {qty}"), qty, 1_00));
        let top = top_selling_items(lines);
        assert_eq!(top.len(), TOP_SELLERS_LIMIT);
        assert_eq!(top[0].quantity_sold, 12);
        assert_eq!(top[9].quantity_sold, 3);
    }

    #[test]
    fn empty_day_reports_zero_average() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let report = DailySalesReport::new(date, Money::ZERO, 0, Vec::new());
        assert_eq!(report.average_transaction, Money::ZERO);
        assert!(report.top_selling_items.is_empty());
    }

    #[test]
    fn average_divides_total_by_count() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let report = DailySalesReport::new(date, Money::new(71_50), 2, Vec::new());
        assert_eq!(report.average_transaction, Money::new(35_75));
    }
}
