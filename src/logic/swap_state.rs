use super::types::Field;
use crate::utils::address::{is_ens_name, parse_address};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown currency id {0}")]
pub struct CurrencyIdError(String);

/// How the form refers to a currency: `ETH` or a token address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyId {
    Native,
    Token(Address),
}

impl FromStr for CurrencyId {
    type Err = CurrencyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ETH") {
            return Ok(CurrencyId::Native);
        }
        parse_address(s).map(CurrencyId::Token).ok_or_else(|| CurrencyIdError(s.to_string()))
    }
}

impl Display for CurrencyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyId::Native => write!(f, "ETH"),
            CurrencyId::Token(address) => write!(f, "{address}"),
        }
    }
}

/// The swap form as the user left it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapState {
    pub independent_field: Field,
    pub typed_value: String,
    pub input_currency_id: Option<CurrencyId>,
    pub output_currency_id: Option<CurrencyId>,
    /// `None` sends to the connected account
    pub recipient: Option<String>,
}

impl Default for SwapState {
    fn default() -> Self {
        Self {
            independent_field: Field::Input,
            typed_value: String::new(),
            input_currency_id: Some(CurrencyId::Native),
            output_currency_id: None,
            recipient: None,
        }
    }
}

impl SwapState {
    pub fn currency_id(&self, field: Field) -> Option<CurrencyId> {
        match field {
            Field::Input => self.input_currency_id,
            Field::Output => self.output_currency_id,
        }
    }

    fn set_currency_id(&mut self, field: Field, id: Option<CurrencyId>) {
        match field {
            Field::Input => self.input_currency_id = id,
            Field::Output => self.output_currency_id = id,
        }
    }

    /// Picking the currency already on the other side swaps the two sides.
    pub fn select_currency(&mut self, field: Field, id: CurrencyId) {
        let other = field.opposite();
        if self.currency_id(other) == Some(id) {
            let previous = self.currency_id(field);
            self.independent_field = self.independent_field.opposite();
            self.set_currency_id(field, Some(id));
            self.set_currency_id(other, previous);
        } else {
            self.set_currency_id(field, Some(id));
        }
    }

    pub fn switch_currencies(&mut self) {
        self.independent_field = self.independent_field.opposite();
        std::mem::swap(&mut self.input_currency_id, &mut self.output_currency_id);
    }

    pub fn type_input(&mut self, field: Field, typed_value: impl Into<String>) {
        self.independent_field = field;
        self.typed_value = typed_value.into();
    }

    pub fn set_recipient(&mut self, recipient: Option<String>) {
        self.recipient = recipient;
    }

    pub fn replace(
        &mut self,
        field: Field,
        typed_value: String,
        input_currency_id: Option<CurrencyId>,
        output_currency_id: Option<CurrencyId>,
        recipient: Option<String>,
    ) {
        *self = SwapState { independent_field: field, typed_value, input_currency_id, output_currency_id, recipient };
    }

    /// Initial state from a link's query parameters (`inputCurrency`, `outputCurrency`,
    /// `exactAmount`, `exactField`, `recipient`).
    pub fn from_query_params(params: &HashMap<String, String>) -> SwapState {
        let output_param = params.get("outputCurrency");
        let mut input_currency_id = Some(currency_from_param(params.get("inputCurrency")));
        let mut output_currency_id = Some(currency_from_param(output_param));
        if input_currency_id == output_currency_id {
            if output_param.is_some() {
                input_currency_id = None;
            } else {
                output_currency_id = None;
            }
        }

        let independent_field = match params.get("exactField") {
            Some(field) if field.eq_ignore_ascii_case("output") => Field::Output,
            _ => Field::Input,
        };

        SwapState {
            independent_field,
            typed_value: params.get("exactAmount").filter(|amount| is_numeric(amount)).cloned().unwrap_or_default(),
            input_currency_id,
            output_currency_id,
            recipient: params.get("recipient").and_then(|recipient| validated_recipient(recipient)),
        }
    }
}

fn currency_from_param(param: Option<&String>) -> CurrencyId {
    param.and_then(|value| CurrencyId::from_str(value).ok()).unwrap_or(CurrencyId::Native)
}

fn is_numeric(value: &str) -> bool {
    let mut parts = value.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next().unwrap_or_default();
    !(int_part.is_empty() && frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

fn validated_recipient(recipient: &str) -> Option<String> {
    if let Some(address) = parse_address(recipient) {
        return Some(address.to_string());
    }
    if is_ens_name(recipient) {
        return Some(recipient.to_string());
    }
    None
}
