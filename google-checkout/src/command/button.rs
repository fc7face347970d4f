//! Checkout button image URLs.

use crate::config::Environment;

/// Button artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// "Buy Now" button, `buy.gif`.
    BuyNow,
    /// "Checkout" button, `checkout.gif`.
    Checkout,
}

impl ButtonKind {
    const fn image(self) -> &'static str {
        match self {
            Self::BuyNow => "buy.gif",
            Self::Checkout => "checkout.gif",
        }
    }
}

/// Button size. Only these dimensions are served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    /// Small.
    Small,
    /// Medium.
    #[default]
    Medium,
    /// Large.
    Large,
}

impl ButtonSize {
    /// Width and height in pixels for `kind`.
    #[must_use]
    pub const fn dimensions(self, kind: ButtonKind) -> (u32, u32) {
        match (kind, self) {
            (ButtonKind::Checkout, Self::Small) => (160, 43),
            (ButtonKind::Checkout, Self::Medium) => (168, 44),
            (ButtonKind::Checkout, Self::Large) => (180, 46),
            (ButtonKind::BuyNow, Self::Small) => (117, 48),
            (ButtonKind::BuyNow, Self::Medium | Self::Large) => (121, 44),
        }
    }
}

/// Options for [`Cart::button_url`](super::Cart::button_url).
///
/// `kind: None` picks [`ButtonKind::BuyNow`] for carts with at most one item and
/// [`ButtonKind::Checkout`] otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonOptions {
    /// Button size.
    pub size: ButtonSize,
    /// Background style, e.g. `white` or `trans`.
    pub style: String,
    /// `text` for an enabled button, `disabled` for a greyed one.
    pub variant: String,
    /// Locale, e.g. `en_US`.
    pub locale: String,
    /// Artwork; derived from the cart when `None`.
    pub kind: Option<ButtonKind>,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            size: ButtonSize::default(),
            style: "white".to_owned(),
            variant: "text".to_owned(),
            locale: "en_US".to_owned(),
            kind: None,
        }
    }
}

pub(super) fn button_url(
    environment: Environment,
    merchant_id: &str,
    item_count: usize,
    options: &ButtonOptions,
) -> String {
    let kind = options.kind.unwrap_or(if item_count > 1 {
        ButtonKind::Checkout
    } else {
        ButtonKind::BuyNow
    });
    let (width, height) = options.size.dimensions(kind);
    // Sandbox serves the checkout artwork from a subdirectory.
    let subdir =
        if environment.is_sandbox() && kind == ButtonKind::Checkout { "checkout/" } else { "" };

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("style", &options.style)
        .append_pair("variant", &options.variant)
        .append_pair("loc", &options.locale)
        .append_pair("w", &width.to_string())
        .append_pair("h", &height.to_string())
        .append_pair("merchant_id", merchant_id)
        .finish();

    format!("http://{}/{subdir}buttons/{}?{query}", environment.host(), kind.image())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_table() {
        assert_eq!(ButtonSize::Small.dimensions(ButtonKind::Checkout), (160, 43));
        assert_eq!(ButtonSize::Medium.dimensions(ButtonKind::Checkout), (168, 44));
        assert_eq!(ButtonSize::Large.dimensions(ButtonKind::Checkout), (180, 46));
        assert_eq!(ButtonSize::Small.dimensions(ButtonKind::BuyNow), (117, 48));
        assert_eq!(ButtonSize::Medium.dimensions(ButtonKind::BuyNow), (121, 44));
        assert_eq!(ButtonSize::Large.dimensions(ButtonKind::BuyNow), (121, 44));
    }

    #[test]
    fn test_defaults_single_item_production() {
        let url = button_url(Environment::Production, "1234567890", 1, &ButtonOptions::default());
        assert_eq!(
            url,
            "http://checkout.google.com/buttons/buy.gif?style=white&variant=text&loc=en_US&w=121&h=44&merchant_id=1234567890"
        );
    }

    #[test]
    fn test_multiple_items_use_checkout_button() {
        let url = button_url(Environment::Production, "42", 2, &ButtonOptions::default());
        assert!(url.starts_with("http://checkout.google.com/buttons/checkout.gif?"));
        assert!(url.contains("w=168&h=44"));
    }

    #[test]
    fn test_sandbox_checkout_subdirectory() {
        let options = ButtonOptions { kind: Some(ButtonKind::Checkout), ..Default::default() };
        let url = button_url(Environment::Sandbox, "42", 0, &options);
        assert!(url.starts_with("http://sandbox.google.com/checkout/buttons/checkout.gif?"));

        let options = ButtonOptions { kind: Some(ButtonKind::BuyNow), ..Default::default() };
        let url = button_url(Environment::Sandbox, "42", 0, &options);
        assert!(url.starts_with("http://sandbox.google.com/buttons/buy.gif?"));
    }

    #[test]
    fn test_explicit_options() {
        let options = ButtonOptions {
            size: ButtonSize::Large,
            style: "trans".to_owned(),
            variant: "disabled".to_owned(),
            locale: "en_GB".to_owned(),
            kind: Some(ButtonKind::Checkout),
        };
        let url = button_url(Environment::Production, "42", 1, &options);
        assert!(url.ends_with("?style=trans&variant=disabled&loc=en_GB&w=180&h=46&merchant_id=42"));
    }
}
