//! Order input validation.
//!
//! Raw inputs arrive with every field optional and loosely typed. Validation
//! walks all of them and collects every problem before failing.

use rust_decimal::Decimal;

use cleanpro_core::{Email, OrderCode, OrderStatus, PaymentMethod, PaymentStatus, PhoneNumber};

use super::OrderError;
use crate::models::limits::{
    AMOUNT_SCALE, AmountProblem, ITEM_TYPE_MAX_CHARS, NAME_MAX_CHARS, check_amount, fits_chars,
};
use crate::models::{NewOrder, NewOrderItem, OrderPatch};

const PHONE_MESSAGE: &str = "Valid phone number is required (format: 078XXXXXXX)";
const EMAIL_MESSAGE: &str = "Valid email address is required";
const CLIENT_NAME_MESSAGE: &str = "Client name is required";
const TOTAL_TOO_LARGE_MESSAGE: &str = "Total amount is too large";
const STATUS_MESSAGE: &str = "Valid status is required";
const PAYMENT_METHOD_MESSAGE: &str = "Valid payment method is required";
const PAYMENT_STATUS_MESSAGE: &str = "Valid payment status is required";

/// A new order as submitted.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub items: Vec<ItemDraft>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub status: Option<String>,
    pub total_amount: Option<Decimal>,
}

/// One garment line as submitted.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub item_type: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
}

/// Editable order fields as submitted. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    /// An empty string clears the stored email.
    pub client_email: Option<String>,
}

/// A draft that passed validation and only lacks its order code.
#[derive(Debug, Clone)]
pub struct ValidOrder {
    client_name: String,
    client_phone: PhoneNumber,
    client_email: Option<Email>,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    total_amount: Decimal,
    items: Vec<NewOrderItem>,
}

impl ValidOrder {
    /// Attach the generated code.
    #[must_use]
    pub fn with_code(self, order_code: OrderCode) -> NewOrder {
        NewOrder {
            order_code,
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email: self.client_email,
            status: self.status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            total_amount: self.total_amount,
            items: self.items,
        }
    }

    /// The amount that will be stored.
    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.total_amount
    }
}

/// Validate a new order.
///
/// A missing `status` defaults to `Pending`; a missing `total_amount` defaults to
/// the sum of the item lines. Text and amounts must fit their columns.
///
/// # Errors
///
/// Returns every problem found, in field order, then item problems by position.
pub fn validate_draft(draft: &OrderDraft) -> Result<ValidOrder, Vec<String>> {
    let mut errors = Vec::new();

    let client_name = client_name(draft.client_name.as_deref(), &mut errors);
    let client_phone = phone(draft.client_phone.as_deref(), &mut errors);
    let client_email = match draft.client_email.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = Email::parse(raw).ok();
            if parsed.is_none() {
                errors.push(EMAIL_MESSAGE.to_owned());
            }
            parsed
        }
    };

    if draft.items.is_empty() {
        errors.push("At least one item is required".to_owned());
    }

    let payment_method = label(
        draft.payment_method.as_deref(),
        PAYMENT_METHOD_MESSAGE,
        &mut errors,
    );
    let payment_status = label(
        draft.payment_status.as_deref(),
        PAYMENT_STATUS_MESSAGE,
        &mut errors,
    );
    let status = match draft.status.as_deref().map(str::trim) {
        None | Some("") => Some(OrderStatus::default()),
        Some(raw) => label(Some(raw), STATUS_MESSAGE, &mut errors),
    };

    let items: Vec<NewOrderItem> = draft
        .items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| validate_item(index + 1, item, &mut errors))
        .collect();

    let total_amount = match draft.total_amount {
        Some(total) => amount(total, "Total amount", &mut errors),
        None => items_total(&items, &mut errors),
    };

    match (
        client_name,
        client_phone,
        payment_method,
        payment_status,
        status,
        total_amount,
    ) {
        (Some(name), Some(phone), Some(method), Some(paid), Some(status), Some(total_amount))
            if errors.is_empty() =>
        {
            Ok(ValidOrder {
                client_name: name,
                client_phone: phone,
                client_email,
                status,
                payment_method: method,
                payment_status: paid,
                total_amount,
                items,
            })
        }
        _ => Err(errors),
    }
}

/// Validate a partial update against the same rules as creation.
///
/// Blank values are dropped as if absent, except `client_email` where an
/// empty string clears the stored address.
///
/// # Errors
///
/// Returns `OrderError::NoValidFields` if no editable field is present, or
/// `OrderError::Validation` with every problem found.
pub fn validate_changes(changes: &OrderChanges) -> Result<OrderPatch, OrderError> {
    let mut errors = Vec::new();

    let patch = OrderPatch {
        status: given(changes.status.as_deref())
            .and_then(|raw| label(Some(raw), STATUS_MESSAGE, &mut errors)),
        payment_method: given(changes.payment_method.as_deref())
            .and_then(|raw| label(Some(raw), PAYMENT_METHOD_MESSAGE, &mut errors)),
        payment_status: given(changes.payment_status.as_deref())
            .and_then(|raw| label(Some(raw), PAYMENT_STATUS_MESSAGE, &mut errors)),
        client_name: given(changes.client_name.as_deref())
            .and_then(|raw| client_name(Some(raw), &mut errors)),
        client_phone: given(changes.client_phone.as_deref())
            .and_then(|raw| phone(Some(raw), &mut errors)),
        client_email: match changes.client_email.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(Some(email)),
                Err(_) => {
                    errors.push(EMAIL_MESSAGE.to_owned());
                    None
                }
            },
        },
    };

    if !errors.is_empty() {
        return Err(OrderError::Validation(errors));
    }
    if patch.is_empty() {
        return Err(OrderError::NoValidFields);
    }
    Ok(patch)
}

fn validate_item(
    position: usize,
    item: &ItemDraft,
    errors: &mut Vec<String>,
) -> Option<NewOrderItem> {
    let item_type = item
        .item_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    match item_type {
        None => errors.push(format!("Item {position}: type is required")),
        Some(t) if !fits_chars(t, ITEM_TYPE_MAX_CHARS) => errors.push(format!(
            "Item {position}: type must be at most {ITEM_TYPE_MAX_CHARS} characters"
        )),
        Some(_) => {}
    }

    let quantity = match item.quantity {
        Some(q) if q >= 1 => {
            let fitted = i32::try_from(q).ok();
            if fitted.is_none() {
                errors.push(format!("Item {position}: quantity is too large"));
            }
            fitted
        }
        _ => {
            errors.push(format!("Item {position}: quantity must be at least 1"));
            None
        }
    };

    let price = match item.price {
        Some(p) => amount(p, &format!("Item {position}: price"), errors),
        None => {
            errors.push(format!("Item {position}: price is required"));
            None
        }
    };

    Some(NewOrderItem {
        item_type: item_type
            .filter(|t| fits_chars(t, ITEM_TYPE_MAX_CHARS))?
            .to_owned(),
        quantity: quantity?,
        price: price?,
    })
}

fn client_name(raw: Option<&str>, errors: &mut Vec<String>) -> Option<String> {
    match raw.map(str::trim).filter(|n| !n.is_empty()) {
        None => {
            errors.push(CLIENT_NAME_MESSAGE.to_owned());
            None
        }
        Some(name) if !fits_chars(name, NAME_MAX_CHARS) => {
            errors.push(format!(
                "Client name must be at most {NAME_MAX_CHARS} characters"
            ));
            None
        }
        Some(name) => Some(name.to_owned()),
    }
}

/// A trimmed, non-blank value.
fn given(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

/// Check `value` against the money column, reporting under `subject`.
fn amount(value: Decimal, subject: &str, errors: &mut Vec<String>) -> Option<Decimal> {
    check_amount(value)
        .map_err(|problem| {
            let reason = match problem {
                AmountProblem::Negative => "cannot be negative".to_owned(),
                AmountProblem::TooPrecise => {
                    format!("can have at most {AMOUNT_SCALE} decimal places")
                }
                AmountProblem::TooLarge => "is too large".to_owned(),
            };
            errors.push(format!("{subject} {reason}"));
        })
        .ok()
}

/// Sum of the item lines, or an error if it overflows or does not fit.
fn items_total(items: &[NewOrderItem], errors: &mut Vec<String>) -> Option<Decimal> {
    let total = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
        .filter(|total| check_amount(*total).is_ok());
    if total.is_none() {
        errors.push(TOTAL_TOO_LARGE_MESSAGE.to_owned());
    }
    total
}

fn phone(raw: Option<&str>, errors: &mut Vec<String>) -> Option<PhoneNumber> {
    let parsed = raw.and_then(|p| PhoneNumber::parse(p.trim()).ok());
    if parsed.is_none() {
        errors.push(PHONE_MESSAGE.to_owned());
    }
    parsed
}

fn label<T: std::str::FromStr>(
    raw: Option<&str>,
    message: &str,
    errors: &mut Vec<String>,
) -> Option<T> {
    let parsed = raw.and_then(|v| v.trim().parse().ok());
    if parsed.is_none() {
        errors.push(message.to_owned());
    }
    parsed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(item_type: &str, quantity: i64, price: i64) -> ItemDraft {
        ItemDraft {
            item_type: Some(item_type.to_string()),
            quantity: Some(quantity),
            price: Some(Decimal::from(price)),
        }
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            client_name: Some("Jean Marie Nkurunziza".to_string()),
            client_phone: Some("0788123456".to_string()),
            client_email: None,
            items: vec![item("Shirt", 3, 1500), item("Trousers", 2, 2000)],
            payment_method: Some("Mobile Money".to_string()),
            payment_status: Some("Paid".to_string()),
            status: None,
            total_amount: None,
        }
    }

    #[test]
    fn test_total_defaults_to_item_sum() {
        let valid = validate_draft(&draft()).unwrap();
        assert_eq!(valid.total_amount(), Decimal::from(8500));

        let order = valid.with_code(OrderCode::from_stored("DC000000001".to_string()));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_explicit_total_wins() {
        let mut d = draft();
        d.total_amount = Some(Decimal::from(8000));
        assert_eq!(validate_draft(&d).unwrap().total_amount(), Decimal::from(8000));
    }

    #[test]
    fn test_errors_are_collected() {
        let d = OrderDraft {
            client_name: Some("   ".to_string()),
            client_phone: Some("0712345678".to_string()),
            client_email: Some("not-an-email".to_string()),
            items: vec![],
            payment_method: Some("Cheque".to_string()),
            payment_status: None,
            status: Some("Lost".to_string()),
            total_amount: Some(Decimal::from(-1)),
        };
        let errors = validate_draft(&d).unwrap_err();
        assert_eq!(
            errors,
            vec![
                CLIENT_NAME_MESSAGE,
                PHONE_MESSAGE,
                EMAIL_MESSAGE,
                "At least one item is required",
                PAYMENT_METHOD_MESSAGE,
                PAYMENT_STATUS_MESSAGE,
                STATUS_MESSAGE,
                "Total amount cannot be negative",
            ]
        );
    }

    #[test]
    fn test_item_errors_name_their_position() {
        let mut d = draft();
        d.items.push(ItemDraft {
            item_type: Some(String::new()),
            quantity: Some(0),
            price: Some(Decimal::from(-5)),
        });
        let errors = validate_draft(&d).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Item 3: type is required",
                "Item 3: quantity must be at least 1",
                "Item 3: price cannot be negative",
            ]
        );
    }

    #[test]
    fn test_free_items_are_allowed() {
        let mut d = draft();
        d.items = vec![item("Hanger", 1, 0)];
        assert_eq!(validate_draft(&d).unwrap().total_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_blank_email_is_no_email() {
        let mut d = draft();
        d.client_email = Some("  ".to_string());
        let order = validate_draft(&d)
            .unwrap()
            .with_code(OrderCode::from_stored("DC000000001".to_string()));
        assert!(order.client_email.is_none());
    }

    #[test]
    fn test_huge_price_is_rejected_not_multiplied() {
        let mut d = draft();
        d.items = vec![ItemDraft {
            item_type: Some("Duvet".to_string()),
            quantity: Some(2),
            price: Some(Decimal::MAX),
        }];
        assert_eq!(
            validate_draft(&d).unwrap_err(),
            vec!["Item 1: price is too large"]
        );
    }

    #[test]
    fn test_item_sum_must_fit_the_column() {
        let mut d = draft();
        d.items = vec![
            item("Wedding dress", 2, 40_000_000),
            item("Suit", 1, 30_000_000),
        ];
        assert_eq!(
            validate_draft(&d).unwrap_err(),
            vec![TOTAL_TOO_LARGE_MESSAGE]
        );
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        let line = NewOrderItem {
            item_type: "Duvet".to_string(),
            quantity: 2,
            price: Decimal::MAX,
        };
        assert_eq!(line.line_total(), None);
    }

    #[test]
    fn test_column_limits_are_validation_errors() {
        let mut d = draft();
        d.client_name = Some("x".repeat(101));
        d.items = vec![
            item(&"Shirt".repeat(11), 1, 1000),
            ItemDraft {
                item_type: Some("Tie".to_string()),
                quantity: Some(1),
                price: Some(Decimal::new(12_345, 3)),
            },
        ];
        d.total_amount = Some(Decimal::from(100_000_000));
        assert_eq!(
            validate_draft(&d).unwrap_err(),
            vec![
                "Client name must be at most 100 characters",
                "Item 1: type must be at most 50 characters",
                "Item 2: price can have at most 2 decimal places",
                TOTAL_TOO_LARGE_MESSAGE,
            ]
        );
    }

    #[test]
    fn test_limits_are_inclusive() {
        let mut d = draft();
        d.client_name = Some("x".repeat(100));
        d.items = vec![ItemDraft {
            item_type: Some("y".repeat(50)),
            quantity: Some(1),
            price: Some(Decimal::new(9_999_999_999, 2)),
        }];
        let valid = validate_draft(&d).unwrap();
        assert_eq!(valid.total_amount(), Decimal::new(9_999_999_999, 2));
    }

    #[test]
    fn test_changes_require_a_field() {
        assert!(matches!(
            validate_changes(&OrderChanges::default()),
            Err(OrderError::NoValidFields)
        ));
    }

    #[test]
    fn test_changes_validate_values() {
        let changes = OrderChanges {
            status: Some("Dry".to_string()),
            client_phone: Some("123".to_string()),
            ..OrderChanges::default()
        };
        match validate_changes(&changes) {
            Err(OrderError::Validation(errors)) => {
                assert_eq!(errors, vec![STATUS_MESSAGE, PHONE_MESSAGE]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_changes_are_dropped() {
        let changes = OrderChanges {
            status: Some(String::new()),
            payment_method: Some("  ".to_string()),
            client_name: Some(String::new()),
            ..OrderChanges::default()
        };
        assert!(matches!(
            validate_changes(&changes),
            Err(OrderError::NoValidFields)
        ));

        let changes = OrderChanges {
            status: Some(String::new()),
            payment_status: Some("Paid".to_string()),
            ..OrderChanges::default()
        };
        let patch = validate_changes(&changes).unwrap();
        assert_eq!(patch.status, None);
        assert_eq!(patch.payment_status, Some(PaymentStatus::Paid));
    }

    #[test]
    fn test_changes_check_name_length() {
        let changes = OrderChanges {
            client_name: Some("n".repeat(101)),
            ..OrderChanges::default()
        };
        match validate_changes(&changes) {
            Err(OrderError::Validation(errors)) => {
                assert_eq!(errors, vec!["Client name must be at most 100 characters"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_email_clears() {
        let changes = OrderChanges {
            client_email: Some(String::new()),
            ..OrderChanges::default()
        };
        let patch = validate_changes(&changes).unwrap();
        assert_eq!(patch.client_email, Some(None));
    }

    #[test]
    fn test_status_change() {
        let changes = OrderChanges {
            status: Some("Picked Up".to_string()),
            ..OrderChanges::default()
        };
        let patch = validate_changes(&changes).unwrap();
        assert_eq!(patch.status, Some(OrderStatus::PickedUp));
    }
}
