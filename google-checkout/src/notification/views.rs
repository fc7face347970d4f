//! Typed accessors for well-known notification kinds.
//!
//! Each view borrows a [`Notification`] of the matching kind and reads named fields
//! through the same deep lookup as [`Notification::field`].

use super::Notification;
use crate::{
    error::{CheckoutError, Result},
    money::Money,
};

/// View of a `new-order-notification`.
#[derive(Debug, Clone, Copy)]
pub struct NewOrder<'a> {
    notification: &'a Notification,
}

impl<'a> NewOrder<'a> {
    pub(super) const fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }

    /// Order total.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] if `order-total` is absent,
    /// [`CheckoutError::MalformedDocument`] if it is not a decimal.
    pub fn order_total(&self) -> Result<Money> {
        self.notification.require_element("order-total")?.to_money()
    }

    /// Total tax added to the order.
    ///
    /// # Errors
    ///
    /// Same as [`order_total`](Self::order_total), for `total-tax`.
    pub fn total_tax(&self) -> Result<Money> {
        self.notification.require_element("total-tax")?.to_money()
    }

    /// Whether the buyer agreed to receive marketing email.
    ///
    /// Reads `email-allowed` inside `buyer-marketing-preferences`.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] if either element is missing.
    pub fn email_allowed(&self) -> Result<bool> {
        self.notification
            .require_element("buyer-marketing-preferences")?
            .find("email-allowed")
            .map(|element| element.to_boolean())
            .ok_or_else(|| CheckoutError::UnknownField("email-allowed".to_owned()))
    }

    /// Current fulfillment state, e.g. `NEW`.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] if `fulfillment-order-state` is absent.
    pub fn fulfillment_order_state(&self) -> Result<String> {
        self.notification.require_field("fulfillment-order-state")
    }

    /// Value stored under `key` in the merchant private data sent with the cart.
    #[must_use]
    pub fn merchant_private_data(&self, key: &str) -> Option<String> {
        self.notification
            .document()
            .find("merchant-private-data")
            .and_then(|data| data.find(key))
            .map(|element| element.text())
    }
}

/// View of a `charge-amount-notification`.
#[derive(Debug, Clone, Copy)]
pub struct ChargeAmount<'a> {
    notification: &'a Notification,
}

impl<'a> ChargeAmount<'a> {
    pub(super) const fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }

    /// Amount of the most recent charge.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] or [`CheckoutError::MalformedDocument`].
    pub fn latest_charge_amount(&self) -> Result<Money> {
        self.notification.require_element("latest-charge-amount")?.to_money()
    }

    /// Amount charged so far across all charges.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] or [`CheckoutError::MalformedDocument`].
    pub fn total_charge_amount(&self) -> Result<Money> {
        self.notification.require_element("total-charge-amount")?.to_money()
    }
}

/// View of a `chargeback-amount-notification`.
#[derive(Debug, Clone, Copy)]
pub struct ChargebackAmount<'a> {
    notification: &'a Notification,
}

impl<'a> ChargebackAmount<'a> {
    pub(super) const fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }

    /// Amount of the most recent chargeback.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] or [`CheckoutError::MalformedDocument`].
    pub fn latest_chargeback_amount(&self) -> Result<Money> {
        self.notification.require_element("latest-chargeback-amount")?.to_money()
    }

    /// Total charged back so far.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] or [`CheckoutError::MalformedDocument`].
    pub fn total_chargeback_amount(&self) -> Result<Money> {
        self.notification.require_element("total-chargeback-amount")?.to_money()
    }
}

/// View of a `checkout-redirect` response to a cart submission.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRedirect<'a> {
    notification: &'a Notification,
}

impl<'a> CheckoutRedirect<'a> {
    pub(super) const fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }

    /// URL the buyer should be sent to.
    ///
    /// The processor double-encodes ampersands in this field, so any `&amp;` left after
    /// XML unescaping is replaced by `&`.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::UnknownField`] if `redirect-url` is absent.
    pub fn redirect_url(&self) -> Result<String> {
        Ok(self.notification.require_field("redirect-url")?.replace("&amp;", "&"))
    }
}

/// View of an `error` response.
#[derive(Debug, Clone, Copy)]
pub struct ApiErrorView<'a> {
    notification: &'a Notification,
}

impl<'a> ApiErrorView<'a> {
    pub(super) const fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }

    /// Text of `error-message`, empty if the processor sent none.
    #[must_use]
    pub fn message(&self) -> String {
        self.notification.field("error-message").unwrap_or_default()
    }
}
