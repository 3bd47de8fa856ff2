//! Request DTOs accepted by the orchestrator, with the checks applied before any
//! dependency is called.

use super::OrderError;
use crate::model::{OrderStatus, ProductId, UserId};
use actor_framework::Page;
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub shipping_cost: f64,
    pub shipping_duration_days: u32,
    pub discount: f64,
    pub items: Vec<ItemRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOrdersRequest {
    pub user_id: Option<UserId>,
    /// Zero means the first page.
    pub page: u32,
    /// Zero means the default page size.
    pub per_page: u32,
}

fn check_item(product_id: ProductId, quantity: u32) -> Result<(), OrderError> {
    if product_id.0 == 0 {
        return Err(OrderError::InvalidRequest("product_id is required".into()));
    }
    if quantity == 0 {
        return Err(OrderError::InvalidRequest(format!(
            "quantity for {product_id} must be positive"
        )));
    }
    Ok(())
}

fn check_amount(name: &str, value: f64) -> Result<(), OrderError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OrderError::InvalidRequest(format!("{name} must be a number")))
    }
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.user_id.0 == 0 {
            return Err(OrderError::InvalidRequest("user_id is required".into()));
        }
        if self.items.is_empty() {
            return Err(OrderError::InvalidRequest(
                "an order needs at least one item".into(),
            ));
        }
        check_amount("shipping_cost", self.shipping_cost)?;
        check_amount("discount", self.discount)?;
        self.items
            .iter()
            .try_for_each(|item| check_item(item.product_id, item.quantity))
    }
}

impl AddOrderItemRequest {
    pub fn validate(&self) -> Result<(), OrderError> {
        check_item(self.product_id, self.quantity)
    }
}

impl ListOrdersRequest {
    pub fn page(&self) -> Page {
        let number = if self.page == 0 { DEFAULT_PAGE } else { self.page };
        let per_page = if self.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            self.per_page
        };
        Page::new(number, per_page)
    }
}

/// Parses an administrative status value.
pub fn parse_status(status: &str) -> Result<OrderStatus, OrderError> {
    status
        .parse()
        .map_err(|e: crate::model::ParseStatusError| OrderError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: Vec<ItemRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: UserId(1),
            shipping_cost: 10.0,
            shipping_duration_days: 2,
            discount: 0.0,
            items,
        }
    }

    #[test]
    fn create_requires_user_and_items() {
        let item = ItemRequest {
            product_id: ProductId(7),
            quantity: 2,
        };
        assert!(request(vec![item.clone()]).validate().is_ok());
        assert!(request(vec![]).validate().is_err());

        let mut no_user = request(vec![item]);
        no_user.user_id = UserId(0);
        assert!(matches!(
            no_user.validate(),
            Err(OrderError::InvalidRequest(_))
        ));
    }

    #[test]
    fn create_rejects_zero_quantity_and_missing_product() {
        let zero_quantity = request(vec![ItemRequest {
            product_id: ProductId(7),
            quantity: 0,
        }]);
        assert!(zero_quantity.validate().is_err());

        let no_product = request(vec![ItemRequest {
            product_id: ProductId(0),
            quantity: 1,
        }]);
        assert!(no_product.validate().is_err());
    }

    #[test]
    fn negative_amounts_are_accepted_and_nan_is_not() {
        let mut req = request(vec![ItemRequest {
            product_id: ProductId(7),
            quantity: 1,
        }]);
        req.discount = -3.0;
        assert!(req.validate().is_ok());
        req.shipping_cost = f64::NAN;
        assert!(req.validate().is_err());
    }

    #[test]
    fn list_defaults_apply_to_zero() {
        assert_eq!(ListOrdersRequest::default().page(), Page::new(1, 10));
        let explicit = ListOrdersRequest {
            user_id: None,
            page: 3,
            per_page: 25,
        };
        assert_eq!(explicit.page(), Page::new(3, 25));
    }

    #[test]
    fn status_values_are_validated() {
        assert_eq!(parse_status("paid"), Ok(OrderStatus::Paid));
        assert!(matches!(
            parse_status("refunded"),
            Err(OrderError::InvalidRequest(_))
        ));
    }
}
