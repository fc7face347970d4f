//! Shopping cart submission.
//!
//! A [`Cart`] serializes to a `checkout-shopping-cart` document. The bytes are
//! cached after the first build so that the signature and the posted body are
//! computed over the same bytes; every mutation drops the cache.

use std::sync::OnceLock;

use base64::{Engine, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use tracing::instrument;

use super::{
    Command,
    button::{self, ButtonOptions},
};
use crate::{
    config::Environment,
    credentials::MerchantCredentials,
    endpoint::{DefaultEndpointResolver, EndpointKind, EndpointResolver},
    error::{CheckoutError, Result},
    money::DEFAULT_CURRENCY,
    signer::{HmacSigner, SIGNATURE_LEN},
    xml::writer::{SCHEMA_NAMESPACE, XmlBuilder},
};

/// One product line in a cart.
///
/// # Examples
///
/// ```
/// use google_checkout::command::LineItem;
/// use rust_decimal::Decimal;
///
/// let item = LineItem::new("Pancakes", "Flapjacks by mail.", Decimal::new(50, 2))
///     .with_quantity(10)
///     .with_item_id("2938292839");
/// assert_eq!(item.quantity(), 10);
/// assert_eq!(item.currency(), "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    name: String,
    description: String,
    unit_price: Decimal,
    quantity: u32,
    currency: String,
    item_id: Option<String>,
    weight: Option<Decimal>,
}

impl LineItem {
    /// Quantity one of a USD-priced product.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit_price,
            quantity: 1,
            currency: DEFAULT_CURRENCY.to_owned(),
            item_id: None,
            weight: None,
        }
    }

    /// Sets the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the price currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the merchant's own item id, returned in notifications.
    #[must_use]
    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    /// Sets the shipping weight in pounds.
    #[must_use]
    pub const fn with_weight(mut self, pounds: Decimal) -> Self {
        self.weight = Some(pounds);
        self
    }

    /// Product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description as shown on the buyer's bill.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Price of one unit.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Number of units.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Currency of the unit price.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Merchant item id, if set.
    #[must_use]
    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    /// Weight in pounds, if set.
    #[must_use]
    pub const fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingRequiredField("item-name".to_owned()));
        }
        if self.description.trim().is_empty() {
            return Err(CheckoutError::MissingRequiredField("item-description".to_owned()));
        }
        if self.currency.trim().is_empty() {
            return Err(CheckoutError::MissingRequiredField("currency".to_owned()));
        }
        if self.quantity == 0 {
            return Err(CheckoutError::InvalidInput(format!(
                "quantity of '{}' must be at least 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// Conversion of an application's product type into a cart line.
pub trait ToLineItem {
    /// Builds the line item for this product.
    fn to_line_item(&self) -> LineItem;
}

impl ToLineItem for LineItem {
    fn to_line_item(&self) -> LineItem {
        self.clone()
    }
}

/// Warehouse a carrier-calculated shipment leaves from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipFrom {
    /// City.
    pub city: String,
    /// State or region.
    pub region: String,
    /// Postal code.
    pub postal_code: String,
    /// Two-letter country code.
    pub country_code: String,
}

/// Carrier-calculated shipping option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingSpec {
    /// Carrier, e.g. `UPS`.
    pub shipping_company: String,
    /// Service, e.g. `Ground`.
    pub shipping_type: String,
    /// Fallback price if the carrier cannot be reached.
    pub price: Decimal,
    /// Fixed surcharge added to the carrier rate.
    pub additional_fixed_charge: Option<Decimal>,
    /// Percentage surcharge added to the carrier rate.
    pub additional_variable_charge_percent: Option<Decimal>,
    /// Origin of the package.
    pub ship_from: ShipFrom,
}

impl ShippingSpec {
    fn validate(&self) -> Result<()> {
        let required = [
            ("shipping-company", &self.shipping_company),
            ("shipping-type", &self.shipping_type),
            ("city", &self.ship_from.city),
            ("region", &self.ship_from.region),
            ("postal-code", &self.ship_from.postal_code),
            ("country-code", &self.ship_from.country_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingRequiredField(field.to_owned()));
            }
        }
        Ok(())
    }
}

/// Everything needed to render a browser checkout form for a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Form action, the merchant `checkout` endpoint.
    pub action: String,
    /// Base64 of the cart XML, posted as `cart`.
    pub cart: String,
    /// Base64 of the HMAC-SHA1 cart signature, posted as `signature`.
    pub signature: String,
}

/// Shopping cart for a `checkout-shopping-cart` submission.
///
/// # Examples
///
/// ```
/// use google_checkout::{
///     command::{Cart, Command, LineItem},
///     credentials::MerchantCredentials,
/// };
/// use rust_decimal::Decimal;
///
/// let mut cart = Cart::new(MerchantCredentials::new("1234567890", "secret"));
/// cart.add_item(LineItem::new("A Quarter", "One shiny quarter.", Decimal::new(25, 2)))
///     .unwrap();
///
/// let xml = cart.to_xml().unwrap();
/// let signature = cart.signature().unwrap();
/// assert_eq!(signature.len(), 20);
/// assert!(String::from_utf8(xml).unwrap().contains("<item-name>A Quarter</item-name>"));
/// ```
#[derive(Debug, Clone)]
pub struct Cart {
    credentials: MerchantCredentials,
    items: Vec<LineItem>,
    merchant_private_data: Vec<(String, String)>,
    shipping: Option<ShippingSpec>,
    edit_cart_url: Option<String>,
    continue_shopping_url: Option<String>,
    xml: OnceLock<Vec<u8>>,
}

impl Cart {
    /// Empty cart for a merchant.
    #[must_use]
    pub fn new(credentials: MerchantCredentials) -> Self {
        Self {
            credentials,
            items: Vec::new(),
            merchant_private_data: Vec::new(),
            shipping: None,
            edit_cart_url: None,
            continue_shopping_url: None,
            xml: OnceLock::new(),
        }
    }

    fn invalidate(&mut self) {
        self.xml.take();
    }

    /// Appends a line item.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingRequiredField`] for an empty name, description or currency,
    /// [`CheckoutError::InvalidInput`] for a zero quantity.
    pub fn add_item(&mut self, item: LineItem) -> Result<()> {
        item.validate()?;
        self.invalidate();
        self.items.push(item);
        Ok(())
    }

    /// Appends the line item produced by `product`.
    ///
    /// # Errors
    ///
    /// Same as [`add_item`](Self::add_item).
    pub fn add_product<P: ToLineItem + ?Sized>(&mut self, product: &P) -> Result<()> {
        self.add_item(product.to_line_item())
    }

    /// Removes and returns the item at `index`, or `None` if out of range.
    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }
        self.invalidate();
        Some(self.items.remove(index))
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stores a value that is echoed back in the new order notification.
    ///
    /// `key` becomes an element name, so it must be a valid XML name. Setting an existing
    /// key replaces its value in place.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidInput`] if `key` is not a valid XML element name.
    pub fn set_merchant_private_data(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let key = key.into();
        if !is_xml_name(&key) {
            return Err(CheckoutError::InvalidInput(format!(
                "merchant private data key is not a valid element name: '{key}'"
            )));
        }
        let value = value.into();
        self.invalidate();
        match self.merchant_private_data.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.merchant_private_data.push((key, value)),
        }
        Ok(())
    }

    /// Merchant private data in insertion order.
    #[must_use]
    pub fn merchant_private_data(&self) -> &[(String, String)] {
        &self.merchant_private_data
    }

    /// Sets or clears carrier-calculated shipping. Without it the cart offers free pickup.
    pub fn set_shipping(&mut self, shipping: Option<ShippingSpec>) {
        self.invalidate();
        self.shipping = shipping;
    }

    /// Shipping option, if set.
    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingSpec> {
        self.shipping.as_ref()
    }

    /// Link back to the merchant's cart page.
    pub fn set_edit_cart_url(&mut self, url: impl Into<String>) {
        self.invalidate();
        self.edit_cart_url = Some(url.into());
    }

    /// Link back to the merchant's store after checkout.
    pub fn set_continue_shopping_url(&mut self, url: impl Into<String>) {
        self.invalidate();
        self.continue_shopping_url = Some(url.into());
    }

    /// Currency shared by all items, `USD` for an empty cart.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MixedCurrency`] if two items disagree.
    pub fn currency(&self) -> Result<&str> {
        let Some(first) = self.items.first() else {
            return Ok(DEFAULT_CURRENCY);
        };
        if let Some(other) = self.items.iter().find(|item| item.currency != first.currency) {
            return Err(CheckoutError::MixedCurrency {
                first: first.currency.clone(),
                second: other.currency.clone(),
            });
        }
        Ok(&first.currency)
    }

    /// Serialized cart, built on first use and cached until the next mutation.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`], [`CheckoutError::MixedCurrency`] or
    /// [`CheckoutError::MissingRequiredField`] for an incomplete shipping option.
    pub fn xml(&self) -> Result<&[u8]> {
        if let Some(xml) = self.xml.get() {
            return Ok(xml);
        }
        let built = self.build_xml()?;
        Ok(self.xml.get_or_init(|| built))
    }

    /// HMAC-SHA1 of [`xml`](Self::xml) keyed by the merchant key.
    ///
    /// # Errors
    ///
    /// Same as [`xml`](Self::xml).
    pub fn signature(&self) -> Result<[u8; SIGNATURE_LEN]> {
        let xml = self.xml()?;
        HmacSigner::new(self.credentials.merchant_key().expose_secret().as_bytes()).sign(xml)
    }

    /// Form action, encoded cart and encoded signature for a browser checkout form.
    ///
    /// # Errors
    ///
    /// Same as [`xml`](Self::xml), plus [`CheckoutError::InvalidInput`] for a merchant id
    /// that cannot form a URL.
    #[instrument(skip(self), fields(items = self.items.len()))]
    pub fn checkout_form(&self, environment: Environment) -> Result<CheckoutForm> {
        let action = DefaultEndpointResolver::new(environment)
            .resolve(EndpointKind::Checkout, self.credentials.merchant_id())?;
        let xml = self.xml()?;
        Ok(CheckoutForm {
            action: action.into(),
            cart: STANDARD.encode(xml),
            signature: STANDARD.encode(self.signature()?),
        })
    }

    /// URL of the checkout button image for this cart.
    #[must_use]
    pub fn button_url(&self, environment: Environment, options: &ButtonOptions) -> String {
        button::button_url(environment, self.credentials.merchant_id(), self.items.len(), options)
    }

    fn build_xml(&self) -> Result<Vec<u8>> {
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let currency = self.currency()?;
        if let Some(shipping) = &self.shipping {
            shipping.validate()?;
        }

        let mut b = XmlBuilder::new()?;
        b.element("checkout-shopping-cart", &[("xmlns", SCHEMA_NAMESPACE)], |b| {
            b.element("shopping-cart", &[], |b| {
                b.element("items", &[], |b| {
                    for item in &self.items {
                        write_item(b, item)?;
                    }
                    Ok(())
                })?;
                if !self.merchant_private_data.is_empty() {
                    b.element("merchant-private-data", &[], |b| {
                        for (key, value) in &self.merchant_private_data {
                            b.leaf(key, &[], value)?;
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            })?;
            b.element("checkout-flow-support", &[], |b| {
                b.element("merchant-checkout-flow-support", &[], |b| {
                    if let Some(url) = &self.edit_cart_url {
                        b.leaf("edit-cart-url", &[], url)?;
                    }
                    if let Some(url) = &self.continue_shopping_url {
                        b.leaf("continue-shopping-url", &[], url)?;
                    }
                    b.leaf("request-buyer-phone-number", &[], "false")?;
                    write_tax_tables(b)?;
                    b.element("shipping-methods", &[], |b| match &self.shipping {
                        Some(shipping) => write_carrier_shipping(b, shipping, currency),
                        None => b.element("pickup", &[("name", "Digital Download")], |b| {
                            b.leaf("price", &[("currency", currency)], "0.00")
                        }),
                    })
                })
            })
        })?;
        Ok(b.finish())
    }
}

impl Command for Cart {
    fn command_name(&self) -> &'static str {
        "checkout-shopping-cart"
    }

    fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    /// Copy of the cached bytes; see [`Cart::xml`].
    fn to_xml(&self) -> Result<Vec<u8>> {
        self.xml().map(<[u8]>::to_vec)
    }
}

fn write_item(b: &mut XmlBuilder, item: &LineItem) -> Result<()> {
    b.element("item", &[], |b| {
        if let Some(id) = &item.item_id {
            b.leaf("merchant-item-id", &[], id)?;
        }
        if let Some(weight) = item.weight {
            let weight = weight.to_string();
            b.empty("item-weight", &[("unit", "LB"), ("value", weight.as_str())])?;
        }
        b.leaf("item-name", &[], &item.name)?;
        b.leaf("item-description", &[], &item.description)?;
        b.leaf("unit-price", &[("currency", item.currency.as_str())], &item.unit_price.to_string())?;
        b.leaf("quantity", &[], &item.quantity.to_string())
    })
}

fn write_tax_tables(b: &mut XmlBuilder) -> Result<()> {
    b.element("tax-tables", &[], |b| {
        b.element("default-tax-table", &[], |b| {
            b.element("tax-rules", &[], |b| {
                b.element("default-tax-rule", &[], |b| {
                    b.leaf("shipping-taxed", &[], "false")?;
                    b.leaf("rate", &[], "0.00")?;
                    b.element("tax-area", &[], |b| b.empty("world-area", &[]))
                })
            })
        })
    })
}

fn write_carrier_shipping(b: &mut XmlBuilder, shipping: &ShippingSpec, currency: &str) -> Result<()> {
    b.element("carrier-calculated-shipping", &[], |b| {
        b.element("carrier-calculated-shipping-options", &[], |b| {
            b.element("carrier-calculated-shipping-option", &[], |b| {
                b.leaf("shipping-company", &[], &shipping.shipping_company)?;
                b.leaf("shipping-type", &[], &shipping.shipping_type)?;
                b.leaf("price", &[("currency", currency)], &shipping.price.to_string())?;
                if let Some(charge) = shipping.additional_fixed_charge {
                    b.leaf("additional-fixed-charge", &[("currency", currency)], &charge.to_string())?;
                }
                if let Some(percent) = shipping.additional_variable_charge_percent {
                    b.leaf("additional-variable-charge-percent", &[], &percent.to_string())?;
                }
                Ok(())
            })
        })?;
        b.element("shipping-packages", &[], |b| {
            b.element("shipping-package", &[], |b| {
                let from = &shipping.ship_from;
                b.element("ship-from", &[("id", "id")], |b| {
                    b.leaf("city", &[], &from.city)?;
                    b.leaf("region", &[], &from.region)?;
                    b.leaf("postal-code", &[], &from.postal_code)?;
                    b.leaf("country-code", &[], &from.country_code)
                })
            })
        })
    })
}

/// Letters, digits, `-`, `_` and `.`, not starting with a digit, `-` or `.`, and not
/// starting with `xml` in any case.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !name.to_ascii_lowercase().starts_with("xml")
}
